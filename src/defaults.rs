//! Default values for shared-resources configuration.
//!
//! This module centralizes fixed file locations, environment variable names
//! and tool preferences, so commands and the library agree on them.

use std::path::PathBuf;

/// Location of the repository settings file, relative to the repository root.
pub const REPOSITORY_SETTINGS_PATH: &str = ".aspire/settings.json";

/// File name of the global resource cache inside the config directory.
pub const GLOBAL_CONFIG_FILENAME: &str = "resources.json";

/// Environment variable overriding the global resource cache location.
pub const GLOBAL_CONFIG_ENV: &str = "SHARED_RESOURCES_GLOBAL_CONFIG";

/// Environment variable forcing a specific container tool.
pub const CONTAINER_RUNTIME_ENV: &str = "SHARED_RESOURCES_CONTAINER_RUNTIME";

/// Container tools tried in order. The last entry is the unconditional fallback.
pub const CONTAINER_RUNTIME_PREFERENCE: &[&str] = &["docker", "podman"];

/// Baseline git binary used for every read-only query.
pub const GIT_PROGRAM: &str = "git";

/// Hosting-service CLI preferred for clones when it is installed.
pub const CLONE_CLI_PROGRAM: &str = "gh";

/// Default branch assumed when the remote HEAD cannot be resolved.
pub const DEFAULT_BRANCH: &str = "main";

/// Returns the default location of the global resource cache.
///
/// Uses the platform-appropriate config directory:
/// - Linux: `~/.config/shared-resources/resources.json`
/// - macOS: `~/Library/Application Support/shared-resources/resources.json`
/// - Windows: `{FOLDERID_RoamingAppData}\shared-resources\resources.json`
///
/// Falls back to `.shared-resources/resources.json` in the current directory
/// if the platform config directory cannot be determined. Overridden by the
/// `--global-config` flag or the `SHARED_RESOURCES_GLOBAL_CONFIG` variable.
pub fn default_global_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("shared-resources"))
        .unwrap_or_else(|| PathBuf::from(".shared-resources"))
        .join(GLOBAL_CONFIG_FILENAME)
}
