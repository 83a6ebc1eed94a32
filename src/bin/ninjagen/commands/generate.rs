//! `ninjagen generate` command

use anyhow::Result;

use crate::cli::GenerateArgs;
use crate::commands::{locate, model_options};
use ninjagen::ops::{generate, GenerateOptions};
use ninjagen::util::diagnostic;
use ninjagen::util::fs::WriteOutcome;
use ninjagen::util::GlobalContext;

pub fn execute(args: GenerateArgs, color: bool) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let (manifest_path, config) = locate(&ctx, &args.model)?;

    let mut model = model_options(&args.model, &config)?;
    // --build-dir is relative to where the user stands; the config key is
    // relative to the manifest.
    model.build_dir = match &args.build_dir {
        Some(dir) => Some(ctx.absolutize(dir)),
        None => config.generate.build_dir.clone(),
    };

    let opts = GenerateOptions {
        manifest_path,
        model,
        strict: args.strict || config.generate.strict.unwrap_or(false),
        compile_commands: args.compile_commands
            || config.generate.compile_commands.unwrap_or(false),
    };

    let result = generate(&opts)?;

    for warning in &result.warnings {
        diagnostic::emit(
            &warning.to_diagnostic().with_location(&opts.manifest_path),
            color,
        );
    }

    let status = match result.script {
        WriteOutcome::Written => "Generated",
        WriteOutcome::Unchanged => "Unchanged",
    };
    eprintln!(
        "    {} {} ({} projects, {} rules, {} edges)",
        status,
        result.script_path.display(),
        result.projects,
        result.rules,
        result.edges
    );
    if let Some((path, _)) = &result.compile_commands {
        eprintln!("     Wrote {}", path.display());
    }
    if !result.warnings.is_empty() {
        eprintln!("    {} file(s) skipped", result.warnings.len());
    }

    Ok(())
}
