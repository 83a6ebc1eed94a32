//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// ninjagen - Generate Ninja build scripts from a C/C++ project model
#[derive(Parser)]
#[command(name = "ninjagen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write build.ninja for the workspace
    #[command(visible_alias = "gen")]
    Generate(GenerateArgs),

    /// Show the link order of a project under every configuration
    Linkplan(LinkplanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by commands that load the project model.
#[derive(Args)]
pub struct ModelArgs {
    /// Path to ninjagen.toml, or the directory containing it
    #[arg(long, short = 'm', env = "NINJAGEN_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Toolchain for the native platform (gcc, clang, msvc, emcc)
    #[arg(long, short = 't')]
    pub toolchain: Option<String>,

    /// OS family of the native platform (windows, linux, macos, web)
    #[arg(long)]
    pub target_os: Option<String>,
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Directory to write build.ninja into (defaults to the workspace location)
    #[arg(long, short = 'o')]
    pub build_dir: Option<PathBuf>,

    /// Fail when a listed file cannot be compiled by the toolchain
    #[arg(long)]
    pub strict: bool,

    /// Also write compile_commands.json
    #[arg(long)]
    pub compile_commands: bool,
}

#[derive(Args)]
pub struct LinkplanArgs {
    /// Project to show the link plan for
    pub project: String,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
