//! Image tag derivation from git state.
//!
//! Every build produces three tags from one repository snapshot:
//!
//! - **commit tag**: the 7-character short hash, identifying the exact source
//! - **branch tag**: the sanitized branch name
//! - **latest tag**: the literal `latest`
//!
//! The commit and branch tags both carry a `-dirty` suffix when the working
//! tree has uncommitted changes. `latest` is never suffixed.

use std::sync::LazyLock;

use regex::Regex;

use crate::git::GitRepository;

/// Length of the short commit hash used in commit tags.
pub const SHORT_HASH_LEN: usize = 7;

/// Suffix appended to commit and branch tags for dirty working trees.
pub const DIRTY_SUFFIX: &str = "-dirty";

/// The constant third tag.
pub const LATEST_TAG: &str = "latest";

static DASH_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new("-{2,}").expect("valid regex"));

/// The three tags derived for a single build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTags {
    pub commit_tag: String,
    pub branch_tag: String,
    pub latest_tag: String,
}

impl ImageTags {
    /// All three tags, commit tag first.
    pub fn all(&self) -> [&str; 3] {
        [&self.commit_tag, &self.branch_tag, &self.latest_tag]
    }
}

/// Normalize a branch name into a token usable as an image tag.
///
/// Lowercases, maps `/` and `_` to `-`, collapses runs of `-`, and trims
/// leading and trailing `-`. Total for every input; `""` maps to `""`.
pub fn sanitize_branch(branch: &str) -> String {
    let mapped: String = branch
        .to_lowercase()
        .chars()
        .map(|c| if c == '/' || c == '_' { '-' } else { c })
        .collect();
    DASH_RUNS
        .replace_all(&mapped, "-")
        .trim_matches('-')
        .to_string()
}

/// Derive the commit, branch and latest tags from a repository snapshot.
pub fn generate_tags(repository: &GitRepository) -> ImageTags {
    let suffix = if repository.is_dirty { DIRTY_SUFFIX } else { "" };
    let short_hash: String = repository
        .latest_commit_hash
        .chars()
        .take(SHORT_HASH_LEN)
        .collect();

    ImageTags {
        commit_tag: format!("{short_hash}{suffix}"),
        branch_tag: format!("{}{suffix}", sanitize_branch(&repository.current_branch)),
        latest_tag: LATEST_TAG.to_string(),
    }
}
