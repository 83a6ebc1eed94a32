//! ninjagen CLI - Ninja build script generator for C/C++ projects

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ninjagen::util::diagnostic;
use ninjagen::GenerateError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli, color) {
        // Generation errors carry their own context and suggestions.
        match e.chain().find_map(|c| c.downcast_ref::<GenerateError>()) {
            Some(err) => diagnostic::emit(&err.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, color: bool) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("ninjagen=debug")
    } else {
        EnvFilter::new("ninjagen=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Generate(args) => commands::generate::execute(args, color),
        Commands::Linkplan(args) => commands::linkplan::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
