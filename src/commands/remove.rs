//! # Remove Command Implementation
//!
//! Removes a single resource from the global resources. Repository settings
//! files are left alone; the next import of that repository brings the
//! resource back.

use anyhow::Result;
use clap::Args;

use shared_resources::output::Marker;
use shared_resources::suggestions;

use super::Context;

/// Remove a resource from the global resources
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Id of the resource to remove
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Execute the `remove` command.
pub fn execute(args: RemoveArgs, ctx: &Context) -> Result<()> {
    let global = ctx.store.load_global()?;
    if !global.contains(&args.id) {
        let known: Vec<String> = global.resources.keys().cloned().collect();
        return Err(suggestions::resource_not_found(&args.id, &known));
    }

    ctx.store.save_global(&global.without(&args.id))?;
    println!(
        "{} Removed {}",
        ctx.output.marker(Marker::Success),
        ctx.output.resource_id(&args.id)
    );
    Ok(())
}
