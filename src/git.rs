//! # Git Repository Inspection
//!
//! [`GitInspector`] is the single place that talks to `git`. Read-only queries
//! always use the baseline `git` binary and degrade to `None` when the tool
//! fails, so optional metadata (remote URL, default branch) never blocks the
//! caller. Clones prefer the hosting-service CLI when it is installed, since it
//! carries its own authentication, and fall back to `git clone`.
//!
//! Snapshots ([`GitRepository`]) are built fresh on every call and never
//! cached: git state changes between commands.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ini::Ini;
use log::{debug, warn};

use crate::cancel::CancellationToken;
use crate::defaults::{CLONE_CLI_PROGRAM, DEFAULT_BRANCH, GIT_PROGRAM};
use crate::error::{Error, Result};
use crate::model::GitRepositorySettings;
use crate::process::{CommandOutput, CommandRunner, CommandSpec};

/// Point-in-time view of a working tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRepository {
    pub root_path: PathBuf,
    pub current_branch: String,
    pub latest_commit_hash: String,
    pub is_dirty: bool,
    pub remote_url: Option<String>,
}

/// Queries working trees and clones repositories through external tools.
#[derive(Clone)]
pub struct GitInspector {
    runner: Arc<dyn CommandRunner>,
    cancel: CancellationToken,
}

impl GitInspector {
    pub fn new(runner: Arc<dyn CommandRunner>, cancel: CancellationToken) -> Self {
        Self { runner, cancel }
    }

    fn git(&self, cwd: &Path, args: &[&str]) -> Result<CommandOutput> {
        self.cancel.check()?;
        let spec = CommandSpec::new(GIT_PROGRAM)
            .args(args.iter().copied())
            .current_dir(cwd);
        self.runner.run(&spec)
    }

    /// Trimmed stdout of a successful query, `None` on any failure.
    fn query(&self, cwd: &Path, args: &[&str]) -> Option<String> {
        match self.git(cwd, args) {
            Ok(output) if output.success() => {
                let value = output.stdout.trim();
                (!value.is_empty()).then(|| value.to_string())
            }
            Ok(output) => {
                debug!(
                    "git {} in {} exited with {}: {}",
                    args.join(" "),
                    cwd.display(),
                    output.exit_code,
                    output.stderr.trim()
                );
                None
            }
            Err(e) => {
                debug!("git {} in {} failed: {}", args.join(" "), cwd.display(), e);
                None
            }
        }
    }

    /// Output of a query the caller cannot do without.
    fn required(&self, cwd: &Path, args: &[&str]) -> Result<String> {
        let output = self.git(cwd, args)?;
        if !output.success() {
            return Err(Error::GitCommand {
                command: args.join(" "),
                path: cwd.to_path_buf(),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout.trim().to_string())
    }

    /// The top-level directory of the working tree containing `path`.
    ///
    /// `None` means "not in a repository", which is not an error.
    pub fn repository_root(&self, path: &Path) -> Option<PathBuf> {
        self.query(path, &["rev-parse", "--show-toplevel"])
            .map(PathBuf::from)
    }

    /// Whether `path` already holds a clone (its own `.git` entry).
    pub fn is_cloned(&self, path: &Path) -> bool {
        path.join(".git").exists()
    }

    /// Snapshot the working tree containing `path`.
    pub fn inspect(&self, path: &Path) -> Result<GitRepository> {
        self.cancel.check()?;
        let root = self
            .repository_root(path)
            .ok_or_else(|| Error::NotARepository {
                path: path.to_path_buf(),
            })?;

        let current_branch = self.required(&root, &["rev-parse", "--abbrev-ref", "HEAD"])?;
        let latest_commit_hash = self.required(&root, &["rev-parse", "HEAD"])?;
        let status = self.required(&root, &["status", "--porcelain"])?;
        let remote_url = self.remote_url(&root, "origin");

        Ok(GitRepository {
            root_path: root,
            current_branch,
            latest_commit_hash,
            is_dirty: !status.is_empty(),
            remote_url,
        })
    }

    /// URL of the named remote, if configured.
    pub fn remote_url(&self, path: &Path, remote: &str) -> Option<String> {
        self.query(path, &["remote", "get-url", remote])
    }

    /// The remote's default branch, from `refs/remotes/origin/HEAD`.
    pub fn default_branch(&self, path: &Path) -> Option<String> {
        self.query(path, &["symbolic-ref", "refs/remotes/origin/HEAD", "--short"])
            .map(|branch| {
                branch
                    .strip_prefix("origin/")
                    .map(str::to_string)
                    .unwrap_or(branch)
            })
    }

    /// Best-effort origin metadata for a repository root.
    ///
    /// Reads the `origin` URL from `.git/config` first, falling back to
    /// `git remote get-url origin`. The default branch falls back to `main`.
    /// Returns `None` when no remote URL can be found.
    pub fn provenance(&self, repo_root: &Path) -> Option<GitRepositorySettings> {
        let url = origin_url_from_config(repo_root)
            .or_else(|| self.remote_url(repo_root, "origin"))?;
        let default_branch = self
            .default_branch(repo_root)
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        Some(GitRepositorySettings {
            url,
            default_branch: Some(default_branch),
        })
    }

    fn clone_cli_available(&self) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        let spec = CommandSpec::new(CLONE_CLI_PROGRAM).arg("--version");
        matches!(self.runner.run(&spec), Ok(output) if output.success())
    }

    /// Clone `url` into `destination` and return a snapshot of the result.
    ///
    /// The clone only counts as successful once the destination can be
    /// inspected.
    pub fn clone_repository(
        &self,
        url: &str,
        destination: &Path,
        branch: Option<&str>,
    ) -> Result<GitRepository> {
        self.cancel.check()?;
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }

        let destination_arg = destination.to_string_lossy().into_owned();
        let spec = if url.contains("github.com") && self.clone_cli_available() {
            let mut spec = CommandSpec::new(CLONE_CLI_PROGRAM).args([
                "repo",
                "clone",
                url,
                destination_arg.as_str(),
            ]);
            if let Some(branch) = branch {
                spec = spec.args(["--", "--branch", branch]);
            }
            spec
        } else {
            let mut spec = CommandSpec::new(GIT_PROGRAM).arg("clone");
            if let Some(branch) = branch {
                spec = spec.args(["--branch", branch]);
            }
            spec.args([url, destination_arg.as_str()])
        };

        self.cancel.check()?;
        let clone_error = |message: String| Error::GitClone {
            url: url.to_string(),
            branch: branch.map(str::to_string),
            message,
        };
        let output = self
            .runner
            .run(&spec)
            .map_err(|e| clone_error(e.to_string()))?;

        if !output.success() {
            return Err(clone_error(describe_clone_failure(&output.stderr)));
        }

        self.inspect(destination).map_err(|e| {
            warn!("clone of {} did not produce an inspectable repository", url);
            clone_error(format!("cloned repository could not be inspected: {}", e))
        })
    }
}

fn describe_clone_failure(stderr: &str) -> String {
    if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
    {
        format!(
            "Authentication failed. Make sure you have access to the repository.\n\
            For private repos, ensure you have:\n\
            - SSH key added to ssh-agent\n\
            - Git credentials configured (or `gh auth login`)\n\
            Error: {}",
            stderr.trim()
        )
    } else {
        stderr.trim().to_string()
    }
}

/// Read `remote "origin"`.url from `<root>/.git/config`.
fn origin_url_from_config(repo_root: &Path) -> Option<String> {
    let config_path = repo_root.join(".git").join("config");
    if !config_path.is_file() {
        return None;
    }
    match Ini::load_from_file_noescape(&config_path) {
        Ok(config) => config
            .section(Some("remote \"origin\""))
            .and_then(|section| section.get("url"))
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty()),
        Err(e) => {
            debug!("could not parse {}: {}", config_path.display(), e);
            None
        }
    }
}
