//! # Error Handling
//!
//! This module defines the centralized error type for the `shared-resources`
//! library. It uses `thiserror` to derive a single `Error` enum covering every
//! anticipated failure mode, each variant carrying the context needed to
//! produce a useful message.
//!
//! ## Categories
//!
//! - **Not found**: a resource id, repository, or settings file is missing.
//!   Reported per item; a batch keeps going.
//! - **Precondition violations**: blank build commands, missing container
//!   settings, external URLs that would escape the clone directory.
//! - **External tool failures**: non-zero exits from `git` or the container
//!   tool, with the tool's stderr attached.
//! - **I/O and parse failures**: unreadable or malformed config files. These
//!   are fatal for the whole command.
//! - **Cancellation**: the shared cancellation token fired between steps.
//!
//! The `Result` alias is used throughout the library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for shared-resources operations
#[derive(Error, Debug)]
pub enum Error {
    /// A build was requested for an id that the global tier does not know.
    #[error("Resource '{id}' not found in the global resource cache")]
    ResourceNotFound { id: String },

    /// The resource has no container settings block.
    #[error("Resource '{id}' has no container settings")]
    NoContainerMode { id: String },

    /// The resource's container settings have no image name.
    #[error("Resource '{id}' has no image name")]
    NoImageName { id: String },

    /// The resource's build command is missing or blank.
    #[error("Resource '{id}' has no build command")]
    NoBuildCommand { id: String },

    /// A blank command string reached the container runtime.
    #[error("Build command is empty")]
    EmptyBuildCommand,

    /// The build command string could not be tokenized.
    #[error("Invalid build command '{command}': {message}")]
    InvalidBuildCommand { command: String, message: String },

    /// Git state for a resource's build directory could not be determined.
    #[error("Git inspection failed for resource '{id}': {message}")]
    GitInspectionFailed { id: String, message: String },

    /// The path is not inside a git working tree.
    #[error("Not a git repository: {}", path.display())]
    NotARepository { path: PathBuf },

    /// The build command exited with a non-zero status.
    #[error("Build command failed with exit code {exit_code}")]
    BuildCommandFailed { exit_code: i32 },

    /// Applying an image tag failed. Tags after this one were not applied.
    #[error("Failed to apply tag {tag}: {stderr}")]
    TagFailed { tag: String, stderr: String },

    /// A git command returned a non-zero exit code.
    #[error("Git command failed in {}: git {command} - {stderr}", path.display())]
    GitCommand {
        command: String,
        path: PathBuf,
        stderr: String,
    },

    /// Cloning an external repository failed.
    #[error("Git clone error for {url}{}: {message}", branch.as_ref().map(|b| format!("@{}", b)).unwrap_or_default())]
    GitClone {
        url: String,
        branch: Option<String>,
        message: String,
    },

    /// An external resource URL does not yield a safe directory name.
    #[error("Invalid external resource URL '{url}': {message}")]
    InvalidExternalUrl { url: String, message: String },

    /// A computed clone destination escapes the shared parent directory.
    #[error("Path {} escapes parent directory {}", path.display(), parent.display())]
    PathTraversal { path: PathBuf, parent: PathBuf },

    /// The repository has no settings file.
    #[error("Settings file not found: {}", path.display())]
    SettingsNotFound { path: PathBuf },

    /// A configuration file exists but could not be parsed.
    #[error("Configuration parsing error in {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    /// An external program could not be started at all.
    #[error("Failed to run '{program}': {message}")]
    ToolSpawn { program: String, message: String },

    /// The operation was cancelled.
    #[error("Operation cancelled")]
    Cancelled,

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
