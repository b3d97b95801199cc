//! Path translation between the two storage tiers.
//!
//! The global tier stores absolute paths, the repository tier stores paths
//! relative to the repository root written as `./...` with forward slashes so
//! the JSON stays portable between hosts. The functions here are pure and do
//! not touch the filesystem: normalization is lexical.
//!
//! This module also derives clone directory names from external repository
//! URLs, rejecting anything that could point outside the shared parent
//! directory.

use std::path::{Component, Path, PathBuf};

use url::Url;

use crate::error::{Error, Result};

/// Lexically normalize a path, resolving `.` and `..` segments.
///
/// `..` never climbs above the root: `/../a` normalizes to `/a`. For relative
/// inputs, leading `..` segments that cannot be resolved are kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    out.pop();
                    depth -= 1;
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            Component::Normal(segment) => {
                out.push(segment);
                depth += 1;
            }
        }
    }

    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

/// Convert a tier path to an absolute path anchored at `repo_root`.
///
/// Rooted paths are returned unchanged. Otherwise a leading `./` is stripped,
/// the remainder is joined onto `repo_root`, and the result is normalized.
pub fn to_absolute(path: &str, repo_root: &Path) -> PathBuf {
    let candidate = Path::new(path);
    if candidate.has_root() {
        return candidate.to_path_buf();
    }

    let trimmed = path
        .strip_prefix("./")
        .or_else(|| path.strip_prefix(".\\"))
        .unwrap_or(path);
    normalize(&repo_root.join(trimmed))
}

/// Convert an absolute path to a repository-relative `./...` string.
///
/// Paths outside `repo_root` are returned unchanged; a resource living outside
/// its repository is allowed. Separators are always forward slashes.
pub fn to_relative(path: &Path, repo_root: &Path) -> String {
    let normalized_path = normalize(path);
    let normalized_root = normalize(repo_root);

    match normalized_path.strip_prefix(&normalized_root) {
        Ok(rest) => {
            let segments: Vec<String> = rest
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            if segments.is_empty() {
                ".".to_string()
            } else {
                format!("./{}", segments.join("/"))
            }
        }
        Err(_) => path.to_string_lossy().into_owned(),
    }
}

/// Derive the directory name an external repository is cloned into.
///
/// Takes the last path segment of the URL with any `.git` suffix removed.
/// Handles `https://`, `ssh://`, `file://`, scp-like `git@host:org/repo.git`
/// and plain local paths.
pub fn repository_dir_name(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches(['/', '\\']);
    let last_segment = match Url::parse(trimmed) {
        // Single-letter schemes are Windows drive letters, not URLs.
        Ok(parsed) if parsed.scheme().len() > 1 => parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
            .unwrap_or_default()
            .to_string(),
        _ => {
            let after_host = match trimmed.split_once(':') {
                Some((host, path)) if host.contains('@') => path,
                _ => trimmed,
            };
            after_host
                .rsplit(['/', '\\'])
                .next()
                .unwrap_or_default()
                .to_string()
        }
    };

    let name = last_segment
        .strip_suffix(".git")
        .unwrap_or(&last_segment)
        .to_string();
    validate_dir_name(url, &name)?;
    Ok(name)
}

fn validate_dir_name(url: &str, name: &str) -> Result<()> {
    let message = if name.trim().is_empty() {
        Some("repository name is empty")
    } else if name == "." || name == ".." {
        Some("repository name is a relative directory reference")
    } else if name.contains(['/', '\\']) {
        Some("repository name contains a path separator")
    } else {
        None
    };

    match message {
        Some(message) => Err(Error::InvalidExternalUrl {
            url: url.to_string(),
            message: message.to_string(),
        }),
        None => Ok(()),
    }
}

/// Compute where an external repository is cloned: a sibling under `parent`.
///
/// The resolved path must stay under `parent` after normalization. `parent`
/// is expected to be absolute; a relative parent that normalizes to `.` is
/// rejected.
pub fn clone_destination(parent: &Path, url: &str) -> Result<PathBuf> {
    let name = repository_dir_name(url)?;
    let parent = normalize(parent);
    let destination = normalize(&parent.join(&name));

    if destination == parent || !destination.starts_with(&parent) {
        return Err(Error::PathTraversal {
            path: destination,
            parent,
        });
    }
    Ok(destination)
}
