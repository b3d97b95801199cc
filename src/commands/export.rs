//! # Export Command Implementation
//!
//! Writes global resources into a repository's settings file, converting
//! them to the repository form: paths become `./`-relative and the origin
//! repository is dropped. Other fields of the settings file and its external
//! references are kept.
//!
//! Without ids, every global resource with a path inside the repository is
//! exported.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use shared_resources::output::Marker;
use shared_resources::store::repository_settings_path;
use shared_resources::suggestions;

use super::Context;

/// Write global resources into the current repository's settings
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Resource ids to export (defaults to resources located in the repository)
    #[arg(value_name = "ID")]
    pub ids: Vec<String>,

    /// Repository to export into (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub path: Option<PathBuf>,
}

/// Execute the `export` command.
pub fn execute(args: ExportArgs, ctx: &Context) -> Result<()> {
    let repo_root = ctx.repository_root(args.path.as_deref())?;
    let global = ctx.store.load_global()?;

    let ids: Vec<String> = if args.ids.is_empty() {
        global
            .resources
            .iter()
            .filter(|(_, resource)| resource.lies_under(&repo_root))
            .map(|(id, _)| id.clone())
            .collect()
    } else {
        args.ids
    };
    if ids.is_empty() {
        println!(
            "No global resources are located in {}; name the ids to export explicitly.",
            repo_root.display()
        );
        return Ok(());
    }

    let existing = ctx.store.load_repository(&repo_root)?.unwrap_or_default();
    let mut updated = existing.clone();
    for id in &ids {
        let Some(resource) = global.get(id) else {
            let known: Vec<String> = global.resources.keys().cloned().collect();
            return Err(suggestions::resource_not_found(id, &known));
        };
        updated = updated.with_resource(id, resource.to_repository_tier(&repo_root));
    }

    if updated == existing {
        println!("No changes to {}", repository_settings_path(&repo_root).display());
        return Ok(());
    }

    ctx.store.save_repository(&repo_root, &updated)?;
    println!(
        "{} Exported {} resource(s) to {}",
        ctx.output.marker(Marker::Success),
        ids.len(),
        repository_settings_path(&repo_root).display()
    );
    Ok(())
}
