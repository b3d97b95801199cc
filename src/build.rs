//! # Build Orchestration
//!
//! Builds container images for shared resources, one resource at a time.
//!
//! For each id:
//!
//! ```text
//! found? -> container settings? -> build command? -> image name?
//!   -> inspect repository -> derive tags -> commit tag exists?
//!        yes, not forced -> skip
//!        otherwise       -> build -> tag branch + latest
//! ```
//!
//! Only the commit tag decides whether a build is needed: it pins the exact
//! source snapshot, while branch and `latest` tags move. A failure at any step
//! is recorded for that resource and the next id is processed. Cancellation
//! stops the batch.

use std::cell::RefCell;
use std::path::PathBuf;

use log::{debug, info};

use crate::container::{image_reference, BuildTarget, ContainerRuntime};
use crate::error::{Error, Result};
use crate::git::GitInspector;
use crate::model::{GlobalSharedResources, RepositorySharedResources};
use crate::tags::{generate_tags, ImageTags};

/// Build behaviour switches
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Rebuild even when the commit tag already exists.
    pub force: bool,
}

/// What happened to one resource that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The build ran and every tag was applied.
    Built { image: String, tags: ImageTags },
    /// The commit tag already existed.
    Skipped { image: String, tags: ImageTags },
}

impl BuildOutcome {
    pub fn tags(&self) -> &ImageTags {
        match self {
            BuildOutcome::Built { tags, .. } | BuildOutcome::Skipped { tags, .. } => tags,
        }
    }
}

/// Result for a single id
#[derive(Debug)]
pub struct BuildReport {
    pub id: String,
    pub result: Result<BuildOutcome>,
}

/// Results for a whole batch, in request order
#[derive(Debug, Default)]
pub struct BuildSummary {
    pub reports: Vec<BuildReport>,
}

impl BuildSummary {
    pub fn error_count(&self) -> usize {
        self.reports.iter().filter(|r| r.result.is_err()).count()
    }

    pub fn built_count(&self) -> usize {
        self.count(|o| matches!(o, BuildOutcome::Built { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, BuildOutcome::Skipped { .. }))
    }

    fn count(&self, predicate: impl Fn(&BuildOutcome) -> bool) -> usize {
        self.reports
            .iter()
            .filter(|r| r.result.as_ref().is_ok_and(&predicate))
            .count()
    }

    /// Copy of `global` with `imageTag` set to the commit tag of every
    /// resource that was built or found up to date.
    pub fn record_tags(&self, global: &GlobalSharedResources) -> GlobalSharedResources {
        let mut updated = global.clone();
        for report in &self.reports {
            if let (Ok(outcome), Some(resource)) = (&report.result, global.get(&report.id)) {
                updated = updated.with_resource(
                    &report.id,
                    resource.with_image_tag(&outcome.tags().commit_tag),
                );
            }
        }
        updated
    }
}

/// Receives progress and streamed build output.
pub trait BuildObserver {
    fn started(&mut self, _id: &str) {}

    /// The commit tag exists; `rebuilding` is true when forced.
    fn up_to_date(&mut self, _id: &str, _image: &str, _rebuilding: bool) {}

    fn stdout(&mut self, id: &str, line: &str);

    fn stderr(&mut self, id: &str, line: &str);

    fn finished(&mut self, _report: &BuildReport) {}
}

/// Pick the ids to build when none were named.
///
/// With `all_global`, every global resource that has container settings.
/// Otherwise, inside a repository, the repository's resource ids that are
/// also container resources in the global tier. Outside a repository there
/// is nothing to pick: `None`.
pub fn resolve_build_ids(
    global: &GlobalSharedResources,
    all_global: bool,
    repository: Option<&RepositorySharedResources>,
) -> Option<Vec<String>> {
    let container_ids = global.container_resource_ids();
    if all_global {
        return Some(container_ids);
    }
    let repository = repository?;
    Some(
        repository
            .ids()
            .filter(|id| container_ids.contains(id))
            .cloned()
            .collect(),
    )
}

/// Runs the per-resource build state machine.
pub struct BuildOrchestrator<'a> {
    git: &'a GitInspector,
    runtime: &'a ContainerRuntime,
    options: BuildOptions,
}

impl<'a> BuildOrchestrator<'a> {
    pub fn new(git: &'a GitInspector, runtime: &'a ContainerRuntime, options: BuildOptions) -> Self {
        Self {
            git,
            runtime,
            options,
        }
    }

    /// Build every id in order. Stops early only on cancellation.
    pub fn run(
        &self,
        ids: &[String],
        global: &GlobalSharedResources,
        observer: &mut dyn BuildObserver,
    ) -> BuildSummary {
        let mut summary = BuildSummary::default();
        for id in ids {
            observer.started(id);
            let result = self.build_resource(id, global, observer);
            let cancelled = matches!(result, Err(Error::Cancelled));
            let report = BuildReport {
                id: id.clone(),
                result,
            };
            observer.finished(&report);
            summary.reports.push(report);
            if cancelled {
                info!(
                    "build cancelled, {} resource(s) not attempted",
                    ids.len() - summary.reports.len()
                );
                break;
            }
        }
        summary
    }

    /// Build a single resource from the global tier.
    pub fn build_resource(
        &self,
        id: &str,
        global: &GlobalSharedResources,
        observer: &mut dyn BuildObserver,
    ) -> Result<BuildOutcome> {
        let resource = global.get(id).ok_or_else(|| Error::ResourceNotFound {
            id: id.to_string(),
        })?;
        let container = resource
            .container_mode
            .as_ref()
            .ok_or_else(|| Error::NoContainerMode { id: id.to_string() })?;
        let command = container
            .build_command()
            .ok_or_else(|| Error::NoBuildCommand { id: id.to_string() })?;
        let image_name = container
            .image_name()
            .ok_or_else(|| Error::NoImageName { id: id.to_string() })?;

        let working_directory = container
            .build_working_directory
            .as_deref()
            .or_else(|| {
                resource
                    .project_mode
                    .as_ref()
                    .and_then(|p| p.project_directory.as_deref())
            })
            .map(PathBuf::from)
            .ok_or_else(|| Error::GitInspectionFailed {
                id: id.to_string(),
                message: "no build working directory is configured".to_string(),
            })?;

        let repository = self
            .git
            .inspect(&working_directory)
            .map_err(|e| match e {
                Error::Cancelled => Error::Cancelled,
                other => Error::GitInspectionFailed {
                    id: id.to_string(),
                    message: other.to_string(),
                },
            })?;
        let tags = generate_tags(&repository);
        let registry = container.image_registry.as_deref();
        let image = image_reference(registry, image_name, &tags.commit_tag);
        debug!("{}: {} on {}", id, image, repository.current_branch);

        if self.runtime.image_exists(&image) {
            observer.up_to_date(id, &image, self.options.force);
            if !self.options.force {
                info!("{}: {} already exists, skipping", id, image);
                return Ok(BuildOutcome::Skipped { image, tags });
            }
            info!("{}: {} exists, rebuilding", id, image);
        }

        let observer = RefCell::new(observer);
        self.runtime.build(
            command,
            &working_directory,
            BuildTarget {
                resource_id: id,
                image: &image,
                tag: &tags.commit_tag,
            },
            &mut |line| observer.borrow_mut().stdout(id, line),
            &mut |line| observer.borrow_mut().stderr(id, line),
        )?;

        let targets = [
            image_reference(registry, image_name, &tags.branch_tag),
            image_reference(registry, image_name, &tags.latest_tag),
        ];
        self.runtime.tag(&image, &targets)?;

        Ok(BuildOutcome::Built { image, tags })
    }
}
