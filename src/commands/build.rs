//! # Build Command Implementation
//!
//! Builds container images for shared resources from the global resources.
//!
//! Which resources are built:
//! - the ids given on the command line, or
//! - with `--global`, every global resource that has container settings, or
//! - inside a repository, that repository's resources that are known globally.
//!
//! Outside a repository with no ids, the command explains how to pick
//! resources and exits successfully. Build output is streamed line by line,
//! prefixed with the resource id. After the run, the commit tag of every
//! resource that was built or already up to date is stored as its `imageTag`.

use anyhow::Result;
use clap::Args;

use shared_resources::build::{
    resolve_build_ids, BuildObserver, BuildOptions, BuildOrchestrator, BuildOutcome, BuildReport,
};
use shared_resources::container::ContainerRuntime;
use shared_resources::output::{Marker, OutputConfig};
use shared_resources::suggestions;

use super::Context;

/// Build container images for shared resources
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Resource ids to build
    #[arg(value_name = "ID")]
    pub ids: Vec<String>,

    /// Build every global resource that has container settings
    #[arg(short, long, conflicts_with = "ids")]
    pub global: bool,

    /// Rebuild even when the commit tag already exists
    #[arg(short, long)]
    pub force: bool,
}

struct TerminalBuild<'a> {
    output: &'a OutputConfig,
}

impl BuildObserver for TerminalBuild<'_> {
    fn started(&mut self, id: &str) {
        println!(
            "{} Building {}",
            self.output.marker(Marker::Working),
            self.output.resource_id(id)
        );
    }

    fn up_to_date(&mut self, id: &str, image: &str, rebuilding: bool) {
        if rebuilding {
            println!("   {image} exists, rebuilding {id} (--force)");
        }
    }

    fn stdout(&mut self, id: &str, line: &str) {
        println!("{}", self.output.build_line(id, line, false));
    }

    fn stderr(&mut self, id: &str, line: &str) {
        eprintln!("{}", self.output.build_line(id, line, true));
    }

    fn finished(&mut self, report: &BuildReport) {
        let out = self.output;
        let id = out.resource_id(&report.id);
        match &report.result {
            Ok(BuildOutcome::Built { image, tags }) => println!(
                "{} {id}: built {image} (tags: {})",
                out.marker(Marker::Success),
                tags.all().join(", ")
            ),
            Ok(BuildOutcome::Skipped { image, .. }) => println!(
                "{} {id}: {image} is up to date",
                out.marker(Marker::Skipped)
            ),
            Err(e) => eprintln!("{} {id}: {e}", out.marker(Marker::Failure)),
        }
    }
}

/// Execute the `build` command.
pub fn execute(args: BuildArgs, ctx: &Context) -> Result<()> {
    let global = ctx.store.load_global()?;

    let ids = if args.ids.is_empty() {
        let cwd = std::env::current_dir()?;
        let repository = match ctx.git.repository_root(&cwd) {
            Some(root) => Some(ctx.store.load_repository(&root)?.unwrap_or_default()),
            None => None,
        };
        match resolve_build_ids(&global, args.global, repository.as_ref()) {
            None => {
                println!("{}", suggestions::nothing_to_build());
                return Ok(());
            }
            Some(ids) if ids.is_empty() => {
                println!("No shared resources with container settings to build.");
                return Ok(());
            }
            Some(ids) => ids,
        }
    } else {
        args.ids
    };

    let runtime = ContainerRuntime::resolve(ctx.runner.clone(), ctx.cancel.clone());
    let options = BuildOptions { force: args.force };
    let orchestrator = BuildOrchestrator::new(&ctx.git, &runtime, options);
    let mut observer = TerminalBuild {
        output: &ctx.output,
    };
    let summary = orchestrator.run(&ids, &global, &mut observer);

    let updated = summary.record_tags(&global);
    if updated != global {
        ctx.store.save_global(&updated)?;
    }

    println!(
        "\n{} built, {} up to date, {} failed",
        summary.built_count(),
        summary.skipped_count(),
        summary.error_count()
    );
    if summary.error_count() > 0 {
        return Err(suggestions::build_failures(
            summary.error_count(),
            summary.reports.len(),
        ));
    }
    Ok(())
}
