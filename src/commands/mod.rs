//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `shared-resources` command-line tool. Each subcommand is defined in its own
//! file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` plus the shared
//!   [`Context`] and performs the command's logic by calling into the
//!   `shared_resources` library.

pub mod add_external;
pub mod build;
pub mod clear;
pub mod completions;
pub mod export;
pub mod import;
pub mod list;
pub mod mode;
pub mod remove;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use shared_resources::cancel::CancellationToken;
use shared_resources::git::GitInspector;
use shared_resources::output::OutputConfig;
use shared_resources::process::{CommandRunner, SystemCommandRunner};
use shared_resources::store::ConfigStore;
use shared_resources::suggestions;

/// Collaborators shared by every command
pub struct Context {
    pub output: OutputConfig,
    pub cancel: CancellationToken,
    pub runner: Arc<dyn CommandRunner>,
    pub store: ConfigStore,
    pub git: GitInspector,
}

impl Context {
    pub fn new(output: OutputConfig, cancel: CancellationToken, global_config: PathBuf) -> Self {
        let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner);
        Self {
            store: ConfigStore::new(global_config, cancel.clone()),
            git: GitInspector::new(runner.clone(), cancel.clone()),
            output,
            cancel,
            runner,
        }
    }

    /// Root of the repository containing `path` (or the current directory).
    pub fn repository_root(&self, path: Option<&Path>) -> Result<PathBuf> {
        let start = match path {
            Some(path) => path.to_path_buf(),
            None => std::env::current_dir()?,
        };
        self.git
            .repository_root(&start)
            .ok_or_else(|| suggestions::not_in_repository(&start))
    }
}
