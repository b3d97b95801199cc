//! # Shared Resources Library
//!
//! This library keeps "shared resource" declarations (containerized services
//! and in-source projects) consistent between a per-user global cache and the
//! settings files of the repositories that own them, and builds container
//! images for those resources with tags derived from live git state. It is
//! designed to be used by the `shared-resources` command-line tool, which is a
//! thin wrapper over these modules.
//!
//! ## Quick Example
//!
//! ```
//! use std::path::Path;
//! use shared_resources::path::{to_absolute, to_relative};
//! use shared_resources::tags::sanitize_branch;
//!
//! let root = Path::new("/repo");
//! let absolute = to_absolute("./src/Api", root);
//! assert_eq!(absolute, Path::new("/repo/src/Api"));
//! assert_eq!(to_relative(&absolute, root), "./src/Api");
//!
//! assert_eq!(sanitize_branch("feature/Add_Auth"), "feature-add-auth");
//! ```
//!
//! ## Core Concepts
//!
//! - **Data model (`model`)**: `SharedResource` and the two tier collections,
//!   treated as immutable snapshots.
//! - **Storage (`store`, `jsonc`)**: Reads and writes the global file and
//!   repository settings files, preserving fields it does not own.
//! - **Git (`git`, `tags`)**: Inspects working trees, clones repositories and
//!   derives the commit, branch and latest image tags.
//! - **Containers (`container`)**: Resolves `docker`/`podman`, checks images,
//!   runs build commands and applies tags.
//! - **Import (`import`)**: Recursively merges repository declarations into
//!   the global tier, cloning referenced sibling repositories.
//! - **Build (`build`)**: The per-resource build state machine.
//!
//! ## Execution Model
//!
//! Everything runs sequentially on one thread of control. External tools are
//! invoked through the [`process::CommandRunner`] trait, and a single
//! [`cancel::CancellationToken`] is checked before each process invocation
//! and each file operation.

pub mod build;
pub mod cancel;
pub mod container;
pub mod defaults;
pub mod error;
pub mod git;
pub mod import;
pub mod jsonc;
pub mod model;
pub mod output;
pub mod path;
pub mod process;
pub mod store;
pub mod suggestions;
pub mod tags;

#[cfg(test)]
mod path_proptest;
