//! `ninjagen linkplan` command

use anyhow::Result;

use crate::cli::LinkplanArgs;
use crate::commands::{locate, model_options};
use ninjagen::core::Manifest;
use ninjagen::ops::{format_plan, link_plan};
use ninjagen::util::GlobalContext;

pub fn execute(args: LinkplanArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let (manifest_path, config) = locate(&ctx, &args.model)?;

    let manifest = Manifest::load(&manifest_path)?;
    let ws = manifest.to_workspace(&model_options(&args.model, &config)?)?;

    let plan = link_plan(&ws, &args.project)?;
    print!("{}", format_plan(&plan));

    Ok(())
}
