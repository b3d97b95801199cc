//! # Configuration Store
//!
//! Reads and writes both resource tiers.
//!
//! ## Global file
//!
//! `{ "$schema"?, "resources": { <id>: SharedResource } }`, paths absolute.
//! A missing file is an empty collection. [`ConfigStore::load_global_with_live_tags`]
//! overlays `imageTag` with the commit tag derived from each resource's
//! working tree; that view is never written back by the loader.
//!
//! ## Repository settings file
//!
//! `.aspire/settings.json` under the repository root:
//!
//! ```json
//! {
//!   "$schema": "...",
//!   "appHostPath": "...",
//!   "sharedResources": { "resources": {}, "externalResources": [] }
//! }
//! ```
//!
//! Only `sharedResources` belongs to this crate. Every other top-level field
//! is round-tripped untouched. The file may contain comments and trailing
//! commas. Files written by older tooling keep `resources` and
//! `externalResources` at the top level; they are read as-is and migrated
//! into `sharedResources` on the next write.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::cancel::CancellationToken;
use crate::defaults::REPOSITORY_SETTINGS_PATH;
use crate::error::{Error, Result};
use crate::git::GitInspector;
use crate::jsonc;
use crate::model::{GlobalSharedResources, RepositorySharedResources};
use crate::tags::generate_tags;

const SHARED_RESOURCES_KEY: &str = "sharedResources";
const LEGACY_KEYS: [&str; 2] = ["resources", "externalResources"];

/// Location of the settings file inside a repository.
pub fn repository_settings_path(repo_root: &Path) -> PathBuf {
    repo_root.join(REPOSITORY_SETTINGS_PATH)
}

/// Reader/writer for the global file and repository settings files
#[derive(Debug, Clone)]
pub struct ConfigStore {
    global_path: PathBuf,
    cancel: CancellationToken,
}

impl ConfigStore {
    pub fn new(global_path: impl Into<PathBuf>, cancel: CancellationToken) -> Self {
        Self {
            global_path: global_path.into(),
            cancel,
        }
    }

    pub fn global_path(&self) -> &Path {
        &self.global_path
    }

    /// The global collection exactly as persisted.
    pub fn load_global(&self) -> Result<GlobalSharedResources> {
        self.cancel.check()?;
        let Some(content) = read_if_exists(&self.global_path)? else {
            debug!("no global config at {}", self.global_path.display());
            return Ok(GlobalSharedResources::default());
        };
        if content.trim().is_empty() {
            return Ok(GlobalSharedResources::default());
        }
        serde_json::from_str(&jsonc::strip(&content))
            .map_err(|e| parse_error(&self.global_path, e))
    }

    /// The global collection with `imageTag` taken from live git state.
    pub fn load_global_with_live_tags(
        &self,
        inspector: &GitInspector,
    ) -> Result<GlobalSharedResources> {
        let global = self.load_global()?;
        Ok(overlay_live_tags(&global, inspector))
    }

    pub fn save_global(&self, resources: &GlobalSharedResources) -> Result<()> {
        self.cancel.check()?;
        write_json(&self.global_path, &serde_json::to_value(resources)?)
    }

    /// Resources declared by the repository at `repo_root`.
    ///
    /// `None` when the settings file does not exist. A file that exists but
    /// declares nothing yields an empty collection.
    pub fn load_repository(&self, repo_root: &Path) -> Result<Option<RepositorySharedResources>> {
        self.cancel.check()?;
        let path = repository_settings_path(repo_root);
        let Some(document) = read_settings_document(&path)? else {
            return Ok(None);
        };
        resources_from_document(&document, &path).map(Some)
    }

    /// Write `resources` into the repository settings file, keeping every
    /// other field already in it.
    pub fn save_repository(
        &self,
        repo_root: &Path,
        resources: &RepositorySharedResources,
    ) -> Result<()> {
        self.cancel.check()?;
        let path = repository_settings_path(repo_root);
        let mut document = read_settings_document(&path)?.unwrap_or_default();

        if !document.contains_key(SHARED_RESOURCES_KEY) {
            for key in LEGACY_KEYS {
                document.remove(key);
            }
        }
        document.insert(
            SHARED_RESOURCES_KEY.to_string(),
            serde_json::to_value(resources)?,
        );

        self.cancel.check()?;
        write_json(&path, &Value::Object(document))
    }
}

/// Copy of `global` where each container resource's `imageTag` is the commit
/// tag of its build working directory. Resources whose directory cannot be
/// inspected keep their persisted tag.
pub fn overlay_live_tags(
    global: &GlobalSharedResources,
    inspector: &GitInspector,
) -> GlobalSharedResources {
    let mut view = global.clone();
    for (id, resource) in global.resources.iter() {
        let Some(container) = &resource.container_mode else {
            continue;
        };
        let Some(directory) = container.build_working_directory.as_deref() else {
            continue;
        };
        match inspector.inspect(Path::new(directory)) {
            Ok(repository) => {
                let tags = generate_tags(&repository);
                view = view.with_resource(id, resource.with_image_tag(&tags.commit_tag));
            }
            Err(e) => {
                warn!("keeping stored image tag for '{}': {}", id, e);
            }
        }
    }
    view
}

fn read_if_exists(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Top-level object of a settings file. Empty files yield an empty object.
fn read_settings_document(path: &Path) -> Result<Option<Map<String, Value>>> {
    let Some(content) = read_if_exists(path)? else {
        return Ok(None);
    };
    if content.trim().is_empty() {
        return Ok(Some(Map::new()));
    }
    let document: Value =
        serde_json::from_str(&jsonc::strip(&content)).map_err(|e| parse_error(path, e))?;
    match document {
        Value::Object(map) => Ok(Some(map)),
        Value::Null => Ok(Some(Map::new())),
        _ => Err(Error::ConfigParse {
            path: path.to_path_buf(),
            message: "expected a JSON object at the top level".to_string(),
        }),
    }
}

fn resources_from_document(
    document: &Map<String, Value>,
    path: &Path,
) -> Result<RepositorySharedResources> {
    let section = match document.get(SHARED_RESOURCES_KEY) {
        Some(Value::Null) => return Ok(RepositorySharedResources::default()),
        Some(section) => section.clone(),
        None if LEGACY_KEYS.iter().any(|key| document.contains_key(*key)) => {
            debug!("reading legacy settings layout from {}", path.display());
            Value::Object(
                LEGACY_KEYS
                    .iter()
                    .filter_map(|key| document.get(*key).map(|v| (key.to_string(), v.clone())))
                    .collect(),
            )
        }
        None => return Ok(RepositorySharedResources::default()),
    };
    serde_json::from_value(section).map_err(|e| parse_error(path, e))
}

fn parse_error(path: &Path, e: serde_json::Error) -> Error {
    Error::ConfigParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    fs::write(path, content)?;
    debug!("wrote {}", path.display());
    Ok(())
}
