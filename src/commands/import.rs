//! # Import Command Implementation
//!
//! Imports the shared resources declared by a repository, and by every
//! repository it references, into the global resources file.
//!
//! - Resources already present globally are skipped unless `--force` is given.
//! - Referenced repositories are cloned next to the starting repository. Each
//!   clone asks for confirmation unless `--yes` is given.
//! - A reference that cannot be imported is reported and the rest of the
//!   import still happens; the command then exits with status 1.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};
use indicatif::{ProgressBar, ProgressStyle};

use shared_resources::error::Error;
use shared_resources::import::{ImportObserver, ImportOptions, ImportResolver};
use shared_resources::model::ExternalResource;
use shared_resources::output::{Marker, OutputConfig};
use shared_resources::suggestions;

use super::Context;

/// Import shared resources from a repository
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Repository to import from (defaults to the current directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Overwrite resources that already exist in the global resources
    #[arg(short, long)]
    pub force: bool,

    /// Clone referenced repositories without asking
    #[arg(short, long)]
    pub yes: bool,
}

/// Prompts on the terminal and shows a spinner while cloning.
struct TerminalImport<'a> {
    output: &'a OutputConfig,
    spinner: Option<ProgressBar>,
}

impl ImportObserver for TerminalImport<'_> {
    fn confirm_clone(&mut self, external: &ExternalResource, destination: &Path) -> bool {
        let prompt = format!(
            "Clone {} into {}?",
            external.url,
            destination.display()
        );
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(true)
            .interact()
            .unwrap_or(false)
    }

    fn clone_started(&mut self, external: &ExternalResource, _destination: &Path) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(format!(
            "{} Cloning {}",
            self.output.marker(Marker::Clone),
            external.url
        ));
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn clone_finished(&mut self, _external: &ExternalResource, _destination: &Path) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

/// Execute the `import` command.
pub fn execute(args: ImportArgs, ctx: &Context) -> Result<()> {
    let start = match args.path {
        Some(path) => std::path::absolute(path)?,
        None => std::env::current_dir()?,
    };
    // a directory outside git can still carry a settings file
    let repo_root = ctx.git.repository_root(&start).unwrap_or(start);

    let resolver = ImportResolver::new(
        &ctx.store,
        &ctx.git,
        ImportOptions {
            force: args.force,
            assume_yes: args.yes,
        },
    );
    let mut observer = TerminalImport {
        output: &ctx.output,
        spinner: None,
    };

    let summary = match resolver.run(&repo_root, &mut observer) {
        Ok(summary) => summary,
        Err(Error::SettingsNotFound { path }) => {
            return Err(suggestions::settings_not_found(&path))
        }
        Err(e) => return Err(e.into()),
    };

    let out = &ctx.output;
    println!(
        "{} Imported {} resource(s), skipped {} already present, from {} repository(ies)",
        out.marker(Marker::Success),
        summary.imported,
        summary.skipped,
        summary.repositories.len()
    );
    if summary.skipped > 0 && !args.force {
        println!("   Use --force to overwrite resources that already exist.");
    }
    for url in &summary.declined {
        println!("{} Not cloned: {}", out.marker(Marker::Skipped), url);
    }
    for failure in &summary.failures {
        eprintln!("{} {}", out.marker(Marker::Failure), failure);
    }

    if summary.has_errors() {
        return Err(suggestions::import_failures(summary.failures.len()));
    }
    Ok(())
}
