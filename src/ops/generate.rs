//! Implementation of `ninjagen generate`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::core::{Manifest, ModelOptions};
use crate::ninja::{self, GenerateWarning, SCRIPT_NAME};
use crate::util::diagnostic::suggestions;
use crate::util::fs::{ensure_dir, write_atomic, WriteOutcome};

/// File name of the compilation database.
pub const COMPILE_COMMANDS_NAME: &str = "compile_commands.json";

/// Options for the generate command.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Path to ninjagen.toml
    pub manifest_path: PathBuf,

    /// Toolchain, target OS and build directory choices
    pub model: ModelOptions,

    /// Fail instead of skipping files no toolchain can compile
    pub strict: bool,

    /// Also write compile_commands.json next to the script
    pub compile_commands: bool,
}

/// What a generation wrote.
#[derive(Debug)]
pub struct GenerateResult {
    pub script_path: PathBuf,
    pub script: WriteOutcome,
    pub compile_commands: Option<(PathBuf, WriteOutcome)>,
    pub warnings: Vec<GenerateWarning>,
    pub rules: usize,
    pub edges: usize,
    pub projects: usize,
}

/// Load the model, compile it and write the script.
///
/// The script is only written once generation succeeded; a failed run
/// leaves any previous script untouched.
pub fn generate(opts: &GenerateOptions) -> Result<GenerateResult> {
    let manifest = Manifest::load(&opts.manifest_path)?;
    let ws = manifest
        .to_workspace(&opts.model)
        .with_context(|| format!("invalid project model in {}", opts.manifest_path.display()))?;

    let generation = ninja::generate(&ws)?;

    if opts.strict && !generation.warnings.is_empty() {
        let listed: Vec<String> = generation
            .warnings
            .iter()
            .map(|w| format!("  {}", w))
            .collect();
        bail!(
            "{} unrecognized file(s) in strict mode\n{}\n{}",
            generation.warnings.len(),
            listed.join("\n"),
            suggestions::STRICT_MODE
        );
    }

    let build_dir = ws.build_dir();
    ensure_dir(&build_dir)?;

    let script_path = build_dir.join(SCRIPT_NAME);
    let script = write_atomic(&script_path, generation.script.as_bytes())?;
    match script {
        WriteOutcome::Written => tracing::info!("wrote {}", script_path.display()),
        WriteOutcome::Unchanged => tracing::debug!("{} is up to date", script_path.display()),
    }

    let compile_commands = if opts.compile_commands {
        let path = build_dir.join(COMPILE_COMMANDS_NAME);
        let json = generation
            .compile_commands(&ws)
            .context("failed to serialize compile commands")?;
        let outcome = write_atomic(&path, json.as_bytes())?;
        Some((path, outcome))
    } else {
        None
    };

    Ok(GenerateResult {
        script_path,
        script,
        compile_commands,
        rules: generation.graph.rules().len(),
        edges: generation.graph.edges().count(),
        projects: ws.projects().len(),
        warnings: generation.warnings,
    })
}
