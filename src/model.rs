//! # Shared Resource Data Model
//!
//! Resources are declared in two tiers that share one schema:
//!
//! - **Global tier** ([`GlobalSharedResources`]): the per-user cache of every
//!   known resource. Paths are absolute and each resource may carry its
//!   origin repository ([`GitRepositorySettings`]).
//! - **Repository tier** ([`RepositorySharedResources`]): the resources a
//!   repository owns, plus references to other repositories whose resources
//!   are imported transitively. Paths are `./`-relative to the repository root
//!   and provenance is omitted.
//!
//! Both collections are value snapshots. Update operations return a new
//! snapshot instead of mutating in place, so "nothing changed" is a plain
//! equality check.
//!
//! Serialized field names are camelCase and absent optional fields are
//! omitted rather than written as `null`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::path::{normalize, to_absolute, to_relative};

/// How a resource is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResourceMode {
    /// Run as a container image built from the resource's sources.
    #[default]
    #[serde(alias = "container")]
    Container,
    /// Referenced as an in-source project.
    #[serde(alias = "project")]
    Project,
}

impl fmt::Display for ResourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceMode::Container => write!(f, "Container"),
            ResourceMode::Project => write!(f, "Project"),
        }
    }
}

/// Container image settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerModeSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_registry: Option<String>,
    /// Last resolved tag. Advisory only; builds derive tags from git.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_working_directory: Option<String>,
}

impl ContainerModeSettings {
    /// The build command, if it is not blank.
    pub fn build_command(&self) -> Option<&str> {
        self.build_command
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// The image name, if it is not blank.
    pub fn image_name(&self) -> Option<&str> {
        self.image_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

/// In-source project settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectModeSettings {
    /// Path to the project file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<String>,
    /// Directory containing the project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_directory: Option<String>,
}

/// Origin of a resource. Only kept in the global tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepositorySettings {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
}

/// One declared build target
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedResource {
    #[serde(default)]
    pub mode: ResourceMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_mode: Option<ContainerModeSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_mode: Option<ProjectModeSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_repository: Option<GitRepositorySettings>,
}

impl SharedResource {
    /// Whether the settings block for `mode` is present.
    pub fn supports(&self, mode: ResourceMode) -> bool {
        match mode {
            ResourceMode::Container => self.container_mode.is_some(),
            ResourceMode::Project => self.project_mode.is_some(),
        }
    }

    /// Rewrite every path field through `convert`.
    fn map_paths(&self, convert: impl Fn(&str) -> String) -> Self {
        let mut resource = self.clone();
        if let Some(container) = resource.container_mode.as_mut() {
            container.build_working_directory =
                container.build_working_directory.as_deref().map(&convert);
        }
        if let Some(project) = resource.project_mode.as_mut() {
            project.project_path = project.project_path.as_deref().map(&convert);
            project.project_directory = project.project_directory.as_deref().map(&convert);
        }
        resource
    }

    /// Whether any path of this resource points inside `root`.
    pub fn lies_under(&self, root: &Path) -> bool {
        let root = normalize(root);
        let container = self
            .container_mode
            .iter()
            .filter_map(|c| c.build_working_directory.as_deref());
        let project = self.project_mode.iter().flat_map(|p| {
            [p.project_path.as_deref(), p.project_directory.as_deref()]
                .into_iter()
                .flatten()
        });
        container
            .chain(project)
            .any(|p| Path::new(p).has_root() && normalize(Path::new(p)).starts_with(&root))
    }

    /// Copy with every path made absolute, anchored at `repo_root`.
    pub fn to_absolute(&self, repo_root: &Path) -> Self {
        self.map_paths(|p| to_absolute(p, repo_root).to_string_lossy().into_owned())
    }

    /// Copy with every path under `repo_root` made `./`-relative.
    pub fn to_relative(&self, repo_root: &Path) -> Self {
        self.map_paths(|p| to_relative(Path::new(p), repo_root))
    }

    /// Copy in repository-tier form: relative paths, no provenance.
    pub fn to_repository_tier(&self, repo_root: &Path) -> Self {
        let mut resource = self.to_relative(repo_root);
        resource.git_repository = None;
        resource
    }

    pub fn with_mode(&self, mode: ResourceMode) -> Self {
        Self {
            mode,
            ..self.clone()
        }
    }

    pub fn with_image_tag(&self, tag: &str) -> Self {
        let mut resource = self.clone();
        if let Some(container) = resource.container_mode.as_mut() {
            container.image_tag = Some(tag.to_string());
        }
        resource
    }
}

/// A pointer to another repository whose resources are imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalResource {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// The per-user resource cache. Paths are absolute.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GlobalSharedResources {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default)]
    pub resources: BTreeMap<String, SharedResource>,
}

impl GlobalSharedResources {
    pub fn get(&self, id: &str) -> Option<&SharedResource> {
        self.resources.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.resources.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Ids of resources that have container settings, in key order.
    pub fn container_resource_ids(&self) -> Vec<String> {
        self.resources
            .iter()
            .filter(|(_, r)| r.container_mode.is_some())
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Snapshot with `id` inserted or replaced.
    pub fn with_resource(&self, id: &str, resource: SharedResource) -> Self {
        let mut next = self.clone();
        next.resources.insert(id.to_string(), resource);
        next
    }

    /// Snapshot without `id`.
    pub fn without(&self, id: &str) -> Self {
        let mut next = self.clone();
        next.resources.remove(id);
        next
    }

    /// Snapshot with every resource removed.
    pub fn cleared(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            resources: BTreeMap::new(),
        }
    }

    /// Snapshot with the mode of `id` changed. Unknown ids are left alone.
    pub fn with_mode(&self, id: &str, mode: ResourceMode) -> Self {
        match self.get(id) {
            Some(resource) => self.with_resource(id, resource.with_mode(mode)),
            None => self.clone(),
        }
    }
}

/// Resources owned by a repository. Paths are `./`-relative.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySharedResources {
    #[serde(default)]
    pub resources: BTreeMap<String, SharedResource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_resources: Vec<ExternalResource>,
}

impl RepositorySharedResources {
    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.resources.keys()
    }

    pub fn with_resource(&self, id: &str, resource: SharedResource) -> Self {
        let mut next = self.clone();
        next.resources.insert(id.to_string(), resource);
        next
    }

    /// Snapshot with `external` appended unless the same url and branch exist.
    pub fn with_external(&self, external: ExternalResource) -> Self {
        let mut next = self.clone();
        if !next.external_resources.contains(&external) {
            next.external_resources.push(external);
        }
        next
    }
}
