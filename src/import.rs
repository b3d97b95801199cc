//! # Recursive Import
//!
//! Copies the resources a repository declares into the global tier, then
//! follows its external references into sibling repositories and does the
//! same there.
//!
//! ## Walk
//!
//! Repositories, not resources, are the unit of work. Each repository is
//! processed at most once per run: a visited set of normalized absolute paths
//! is threaded through the recursion, and meeting a path again is logged and
//! skipped. That is what breaks reference cycles.
//!
//! External repositories are cloned next to the starting repository (under
//! its parent directory), never nested inside each other. Every recursive
//! step reuses that same parent.
//!
//! ## Failure model
//!
//! A bad external reference (invalid URL, clone failure, unreadable settings)
//! is recorded in the [`ImportSummary`] and the walk continues. I/O errors
//! and cancellation abort the run. The global file is written once, after
//! the whole walk.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::git::GitInspector;
use crate::model::{
    ExternalResource, GitRepositorySettings, GlobalSharedResources, RepositorySharedResources,
};
use crate::path::{clone_destination, normalize};
use crate::store::{repository_settings_path, ConfigStore};

/// Import behaviour switches
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Overwrite resources that already exist in the global tier.
    pub force: bool,
    /// Clone missing external repositories without asking.
    pub assume_yes: bool,
}

/// Hooks the caller provides for interaction and progress.
pub trait ImportObserver {
    /// Ask whether `external` may be cloned into `destination`.
    fn confirm_clone(&mut self, external: &ExternalResource, destination: &Path) -> bool;

    fn clone_started(&mut self, _external: &ExternalResource, _destination: &Path) {}

    fn clone_finished(&mut self, _external: &ExternalResource, _destination: &Path) {}
}

/// Observer for unattended runs: never prompts, approves every clone.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unattended;

impl ImportObserver for Unattended {
    fn confirm_clone(&mut self, _external: &ExternalResource, _destination: &Path) -> bool {
        true
    }
}

/// A failure confined to one repository or external reference.
#[derive(Debug)]
pub struct ImportFailure {
    /// URL of the external reference, or the repository path.
    pub source: String,
    pub error: Error,
}

impl fmt::Display for ImportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.error)
    }
}

/// Aggregate result of an import run
#[derive(Debug, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    /// Repositories processed, in visit order.
    pub repositories: Vec<PathBuf>,
    /// External references the user chose not to clone.
    pub declined: Vec<String>,
    pub failures: Vec<ImportFailure>,
}

impl ImportSummary {
    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Walks a repository graph and merges its resources into the global tier.
pub struct ImportResolver<'a> {
    store: &'a ConfigStore,
    git: &'a GitInspector,
    options: ImportOptions,
}

struct Walk<'o> {
    parent: PathBuf,
    global: GlobalSharedResources,
    visited: HashSet<PathBuf>,
    summary: ImportSummary,
    observer: &'o mut dyn ImportObserver,
}

impl<'a> ImportResolver<'a> {
    pub fn new(store: &'a ConfigStore, git: &'a GitInspector, options: ImportOptions) -> Self {
        Self {
            store,
            git,
            options,
        }
    }

    /// Import from the repository at `repo_root` and everything it references.
    ///
    /// A relative `repo_root` is resolved against the current directory, so
    /// global paths and the clone parent are always absolute.
    ///
    /// Fails with [`Error::SettingsNotFound`] when the starting repository has
    /// no settings file.
    pub fn run(
        &self,
        repo_root: &Path,
        observer: &mut dyn ImportObserver,
    ) -> Result<ImportSummary> {
        let repo_root = normalize(&std::path::absolute(repo_root)?);
        let declared =
            self.store
                .load_repository(&repo_root)?
                .ok_or_else(|| Error::SettingsNotFound {
                    path: repository_settings_path(&repo_root),
                })?;

        let original = self.store.load_global()?;
        let mut walk = Walk {
            parent: repo_root
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| repo_root.clone()),
            global: original.clone(),
            visited: HashSet::new(),
            summary: ImportSummary::default(),
            observer,
        };

        self.visit(&repo_root, Some(declared), &mut walk)?;

        if walk.global != original {
            self.store.save_global(&walk.global)?;
        } else {
            debug!("global resources unchanged, not writing");
        }
        Ok(walk.summary)
    }

    fn visit(
        &self,
        repo_root: &Path,
        declared: Option<RepositorySharedResources>,
        walk: &mut Walk<'_>,
    ) -> Result<()> {
        let key = normalize(repo_root);
        if !walk.visited.insert(key.clone()) {
            info!("skipping {}: already visited in this import", key.display());
            return Ok(());
        }

        let declared = match declared {
            Some(declared) => declared,
            None => match self.store.load_repository(&key) {
                Ok(Some(declared)) => declared,
                Ok(None) => {
                    debug!("{} has no shared resources settings", key.display());
                    return Ok(());
                }
                Err(e) if is_fatal(&e) => return Err(e),
                Err(e) => {
                    warn!("could not read settings in {}: {}", key.display(), e);
                    walk.summary.failures.push(ImportFailure {
                        source: key.display().to_string(),
                        error: e,
                    });
                    return Ok(());
                }
            },
        };

        info!("importing from {}", key.display());
        walk.summary.repositories.push(key.clone());
        self.merge_resources(&key, &declared, walk);

        for external in &declared.external_resources {
            match self.prepare_external(external, walk) {
                Ok(Some(destination)) => self.visit(&destination, None, walk)?,
                Ok(None) => {}
                Err(e) if is_fatal(&e) => return Err(e),
                Err(e) => {
                    warn!("external repository {} failed: {}", external.url, e);
                    walk.summary.failures.push(ImportFailure {
                        source: external.url.clone(),
                        error: e,
                    });
                }
            }
        }
        Ok(())
    }

    fn merge_resources(
        &self,
        repo_root: &Path,
        declared: &RepositorySharedResources,
        walk: &mut Walk<'_>,
    ) {
        let mut provenance: Option<Option<GitRepositorySettings>> = None;

        for (id, resource) in &declared.resources {
            if walk.global.contains(id) && !self.options.force {
                debug!("'{}' already in global resources, skipping", id);
                walk.summary.skipped += 1;
                continue;
            }

            let mut absolute = resource.to_absolute(repo_root);
            if absolute.git_repository.is_none() {
                absolute.git_repository = provenance
                    .get_or_insert_with(|| self.git.provenance(repo_root))
                    .clone();
            }
            walk.global = walk.global.with_resource(id, absolute);
            walk.summary.imported += 1;
        }
    }

    /// Where `external` lives on disk, cloning it first if needed.
    ///
    /// `Ok(None)` when the user declines the clone.
    fn prepare_external(
        &self,
        external: &ExternalResource,
        walk: &mut Walk<'_>,
    ) -> Result<Option<PathBuf>> {
        let destination = clone_destination(&walk.parent, &external.url)?;
        if self.git.is_cloned(&destination) {
            debug!("{} already cloned at {}", external.url, destination.display());
            return Ok(Some(destination));
        }

        if !self.options.assume_yes && !walk.observer.confirm_clone(external, &destination) {
            info!("not cloning {}", external.url);
            walk.summary.declined.push(external.url.clone());
            return Ok(None);
        }

        walk.observer.clone_started(external, &destination);
        let cloned =
            self.git
                .clone_repository(&external.url, &destination, external.branch.as_deref());
        walk.observer.clone_finished(external, &destination);
        cloned?;
        Ok(Some(destination))
    }
}

fn is_fatal(error: &Error) -> bool {
    matches!(error, Error::Io(_) | Error::Cancelled)
}
