//! # Clear Command Implementation
//!
//! Removes every resource from the global resources after confirmation.

use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};

use shared_resources::output::Marker;

use super::Context;

/// Remove every resource from the global resources
#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Execute the `clear` command.
pub fn execute(args: ClearArgs, ctx: &Context) -> Result<()> {
    let global = ctx.store.load_global()?;
    if global.is_empty() {
        println!("No shared resources to clear.");
        return Ok(());
    }

    if !args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Remove all {} shared resource(s) from {}?",
                global.len(),
                ctx.store.global_path().display()
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Clear cancelled.");
            return Ok(());
        }
    }

    ctx.store.save_global(&global.cleared())?;
    println!(
        "{} Removed {} shared resource(s)",
        ctx.output.marker(Marker::Success),
        global.len()
    );
    Ok(())
}
