//! # List Command Implementation
//!
//! Shows the global shared resources. Image tags are the live commit tags of
//! each resource's working tree where it can be inspected, and the stored
//! tag otherwise. This command never writes.

use anyhow::Result;
use clap::Args;

use shared_resources::container::image_reference;
use shared_resources::model::{ResourceMode, SharedResource};

use super::Context;

/// List global shared resources
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print the resources as JSON
    #[arg(long)]
    pub json: bool,
}

/// One-line description of where a resource comes from.
fn describe(resource: &SharedResource) -> String {
    match resource.mode {
        ResourceMode::Container => match &resource.container_mode {
            Some(container) => {
                let name = container.image_name().unwrap_or("(no image name)");
                match container.image_tag.as_deref() {
                    Some(tag) => image_reference(container.image_registry.as_deref(), name, tag),
                    None => name.to_string(),
                }
            }
            None => "(no container settings)".to_string(),
        },
        ResourceMode::Project => resource
            .project_mode
            .as_ref()
            .and_then(|p| p.project_path.as_deref().or(p.project_directory.as_deref()))
            .unwrap_or("(no project path)")
            .to_string(),
    }
}

/// Execute the `list` command.
pub fn execute(args: ListArgs, ctx: &Context) -> Result<()> {
    let global = ctx.store.load_global_with_live_tags(&ctx.git)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&global)?);
        return Ok(());
    }

    if global.is_empty() {
        println!("No shared resources in {}", ctx.store.global_path().display());
        println!("Run 'shared-resources import' in a repository to add its resources.");
        return Ok(());
    }

    let width = global.resources.keys().map(String::len).max().unwrap_or(0);
    for (id, resource) in &global.resources {
        let padded = format!("{id:<width$}");
        println!(
            "{}  {:<9}  {}",
            ctx.output.resource_id(&padded),
            resource.mode.to_string(),
            describe(resource)
        );
    }
    Ok(())
}
