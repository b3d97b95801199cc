//! # Error Suggestions
//!
//! This module provides helper functions for generating helpful error
//! messages with hints and suggestions. Errors should tell users what went
//! wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shared_resources::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Settings file not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::settings_not_found(path));
//! ```

use std::path::Path;

use crate::defaults::{GLOBAL_CONFIG_ENV, REPOSITORY_SETTINGS_PATH};
use crate::model::ResourceMode;

/// Generate an error for a repository without a settings file.
pub fn settings_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Shared resources settings not found: {path}\n\n\
         hint: Declare resources under \"sharedResources\" in {REPOSITORY_SETTINGS_PATH}\n\
         hint: Run 'shared-resources export' from a repository to write one from the global resources\n\
         hint: Pass the repository path explicitly: 'shared-resources import <PATH>'",
        path = path.display()
    )
}

/// Generate an error for a command that needs a repository but ran outside one.
pub fn not_in_repository(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Not inside a git repository: {path}\n\n\
         hint: Run the command from within a repository\n\
         hint: Use --path <DIR> to point at a repository",
        path = path.display()
    )
}

/// Generate an error for an unknown resource id.
///
/// Suggests the closest known id when one is near enough.
pub fn resource_not_found(id: &str, known: &[String]) -> anyhow::Error {
    let candidates: Vec<&str> = known.iter().map(String::as_str).collect();
    let did_you_mean = find_similar(id, &candidates)
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();

    anyhow::anyhow!(
        "Resource not found: {id}{did_you_mean}\n\n\
         hint: Run 'shared-resources list' to see known resources\n\
         hint: Run 'shared-resources import' in the repository that declares it"
    )
}

/// Generate an error for switching to a mode the resource has no settings for.
pub fn mode_not_configured(id: &str, mode: ResourceMode) -> anyhow::Error {
    let block = match mode {
        ResourceMode::Container => "containerMode",
        ResourceMode::Project => "projectMode",
    };
    anyhow::anyhow!(
        "Resource '{id}' has no {block} settings, cannot switch to {mode} mode\n\n\
         hint: Add a \"{block}\" block to the resource in its repository settings\n\
         hint: Re-run 'shared-resources import --force' to refresh the global resources"
    )
}

/// Generate the final error for a build run with failed resources.
pub fn build_failures(failed: usize, total: usize) -> anyhow::Error {
    anyhow::anyhow!(
        "{failed} of {total} resource(s) failed to build\n\n\
         hint: Re-run with --log-level debug to see every command that was run\n\
         hint: Use --force to rebuild images whose commit tag already exists"
    )
}

/// Generate the final error for an import run with failed references.
pub fn import_failures(failed: usize) -> anyhow::Error {
    anyhow::anyhow!(
        "{failed} external reference(s) could not be imported\n\n\
         hint: Check that each external URL is reachable and that you are authenticated\n\
         hint: Clone the repository next to this one manually, then re-run the import"
    )
}

/// Guidance printed when `build` has nothing to select from.
pub fn nothing_to_build() -> String {
    format!(
        "Not inside a repository, so there are no resources to pick automatically.\n\n\
         hint: Name resources explicitly: 'shared-resources build <ID>...'\n\
         hint: Use --global to build every resource with container settings\n\
         hint: The global resources file can be moved with {GLOBAL_CONFIG_ENV}"
    )
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (a_len, b_len) = (a_chars.len(), b_chars.len());

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut previous: Vec<usize> = (0..=b_len).collect();
    let mut current = vec![0usize; b_len + 1];
    for i in 1..=a_len {
        current[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            current[j] = (previous[j] + 1)
                .min(current[j - 1] + 1)
                .min(previous[j - 1] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b_len]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_not_found_includes_hints() {
        let message = settings_not_found(Path::new("/repo/.aspire/settings.json")).to_string();

        assert!(message.contains("settings not found"));
        assert!(message.contains("/repo/.aspire/settings.json"));
        assert!(message.contains("hint:"));
        assert!(message.contains("sharedResources"));
    }

    #[test]
    fn test_resource_not_found_suggests_similar() {
        let known = vec!["api".to_string(), "worker".to_string()];
        let message = resource_not_found("wroker", &known).to_string();

        assert!(message.contains("Resource not found: wroker"));
        assert!(message.contains("Did you mean 'worker'?"));
    }

    #[test]
    fn test_resource_not_found_no_suggestion_for_very_different() {
        let known = vec!["api".to_string()];
        let message = resource_not_found("database", &known).to_string();

        assert!(!message.contains("Did you mean"));
        assert!(message.contains("shared-resources list"));
    }

    #[test]
    fn test_mode_not_configured_names_block() {
        let message = mode_not_configured("api", ResourceMode::Project).to_string();
        assert!(message.contains("projectMode"));
        assert!(message.contains("Project mode"));
    }

    #[test]
    fn test_build_failures_counts() {
        let message = build_failures(2, 5).to_string();
        assert!(message.starts_with("2 of 5 resource(s) failed to build"));
        assert!(message.contains("--force"));
    }

    #[test]
    fn test_nothing_to_build_mentions_global_flag() {
        assert!(nothing_to_build().contains("--global"));
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("worker", "worker"), 0);
        assert_eq!(edit_distance("worke", "worker"), 1);
        assert_eq!(edit_distance("wroker", "worker"), 2);
        assert_eq!(edit_distance("", "api"), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_find_similar() {
        let candidates = ["api", "worker", "gateway"];

        assert_eq!(find_similar("wroker", &candidates), Some("worker"));
        assert_eq!(find_similar("gatway", &candidates), Some("gateway"));
        assert_eq!(find_similar("xyz", &candidates), None);
    }
}
