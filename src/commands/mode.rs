//! # Mode Command Implementation
//!
//! Switches a global resource between container and project mode. Switching
//! is refused when the resource has no settings block for the target mode.

use anyhow::Result;
use clap::{Args, ValueEnum};

use shared_resources::model::ResourceMode;
use shared_resources::output::Marker;
use shared_resources::suggestions;

use super::Context;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Run as a container image
    Container,
    /// Use the in-source project
    Project,
}

impl From<ModeArg> for ResourceMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Container => ResourceMode::Container,
            ModeArg::Project => ResourceMode::Project,
        }
    }
}

/// Switch a resource between container and project mode
#[derive(Args, Debug)]
pub struct ModeArgs {
    /// Id of the resource
    #[arg(value_name = "ID")]
    pub id: String,

    /// Mode to switch to
    #[arg(value_enum)]
    pub mode: ModeArg,
}

/// Execute the `mode` command.
pub fn execute(args: ModeArgs, ctx: &Context) -> Result<()> {
    let mode: ResourceMode = args.mode.into();
    let global = ctx.store.load_global()?;

    let Some(resource) = global.get(&args.id) else {
        let known: Vec<String> = global.resources.keys().cloned().collect();
        return Err(suggestions::resource_not_found(&args.id, &known));
    };
    if !resource.supports(mode) {
        return Err(suggestions::mode_not_configured(&args.id, mode));
    }

    let updated = global.with_mode(&args.id, mode);
    if updated == global {
        println!("{} is already in {} mode", args.id, mode);
        return Ok(());
    }

    ctx.store.save_global(&updated)?;
    println!(
        "{} {} now uses {} mode",
        ctx.output.marker(Marker::Success),
        ctx.output.resource_id(&args.id),
        mode
    );
    Ok(())
}
