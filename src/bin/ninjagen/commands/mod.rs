//! Command implementations

pub mod completions;
pub mod generate;
pub mod linkplan;

use anyhow::{anyhow, Result};

use crate::cli::ModelArgs;
use ninjagen::core::{ModelOptions, TargetOs, ToolchainKind};
use ninjagen::util::{Config, GlobalContext};

/// Model options from the command line, falling back to the configuration
/// files for anything not given.
pub fn model_options(args: &ModelArgs, config: &Config) -> Result<ModelOptions> {
    let toolchain = match &args.toolchain {
        Some(name) => Some(name.parse::<ToolchainKind>().map_err(|e| anyhow!(e))?),
        None => config.toolchain(),
    };
    let target_os = match &args.target_os {
        Some(name) => Some(name.parse::<TargetOs>().map_err(|e| anyhow!(e))?),
        None => config.target_os(),
    };

    Ok(ModelOptions {
        toolchain,
        target_os,
        build_dir: None,
    })
}

/// Locate the manifest and load the layered configuration next to it.
pub fn locate(ctx: &GlobalContext, args: &ModelArgs) -> Result<(std::path::PathBuf, Config)> {
    let manifest_path = ctx.find_manifest(args.manifest.as_deref())?;
    let manifest_dir = manifest_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| ctx.cwd().to_path_buf());
    let config = ctx.load_config(&manifest_dir);
    Ok((manifest_path, config))
}
