//! # Add-External Command Implementation
//!
//! Adds a reference to another repository to this repository's settings.
//! The next `import` clones it next to this repository and imports its
//! resources as well.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use shared_resources::model::ExternalResource;
use shared_resources::output::Marker;
use shared_resources::path::repository_dir_name;

use super::Context;

/// Reference another repository whose resources should be imported
#[derive(Args, Debug)]
pub struct AddExternalArgs {
    /// Clone URL of the repository
    #[arg(value_name = "URL")]
    pub url: String,

    /// Branch to clone
    #[arg(short, long, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Repository whose settings are updated (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub path: Option<PathBuf>,
}

/// Execute the `add-external` command.
pub fn execute(args: AddExternalArgs, ctx: &Context) -> Result<()> {
    // reject URLs that could never be cloned as a sibling
    let name = repository_dir_name(&args.url)?;
    let repo_root = ctx.repository_root(args.path.as_deref())?;

    let existing = ctx.store.load_repository(&repo_root)?.unwrap_or_default();
    let updated = existing.with_external(ExternalResource {
        url: args.url.clone(),
        branch: args.branch,
    });
    if updated == existing {
        println!("{} is already referenced", args.url);
        return Ok(());
    }

    ctx.store.save_repository(&repo_root, &updated)?;
    println!(
        "{} Added {} (clones into ../{})",
        ctx.output.marker(Marker::Success),
        args.url,
        name
    );
    Ok(())
}
