//! # Container Runtime
//!
//! Wraps the `docker`/`podman` CLI. The tool is chosen once per run:
//!
//! 1. the `SHARED_RESOURCES_CONTAINER_RUNTIME` environment variable, if set
//! 2. the first entry of the preference list that answers `--version`
//! 3. the last entry of the preference list, unconditionally
//!
//! A `--version` check that cannot spawn or exits non-zero only marks the
//! tool as unavailable.

use std::path::Path;
use std::sync::Arc;

use log::{debug, info};

use crate::cancel::CancellationToken;
use crate::defaults::{CONTAINER_RUNTIME_ENV, CONTAINER_RUNTIME_PREFERENCE};
use crate::error::{Error, Result};
use crate::process::{split_command, CommandRunner, CommandSpec};

/// Environment passed to build commands: the resource id.
pub const BUILD_ENV_RESOURCE_ID: &str = "SHARED_RESOURCE_ID";
/// Environment passed to build commands: the full commit-tag image reference.
pub const BUILD_ENV_IMAGE: &str = "SHARED_RESOURCE_IMAGE";
/// Environment passed to build commands: the commit tag.
pub const BUILD_ENV_TAG: &str = "SHARED_RESOURCE_TAG";

/// `registry/name:tag`, or `name:tag` without a registry.
pub fn image_reference(registry: Option<&str>, name: &str, tag: &str) -> String {
    match registry.map(|r| r.trim().trim_end_matches('/')) {
        Some(registry) if !registry.is_empty() => format!("{registry}/{name}:{tag}"),
        _ => format!("{name}:{tag}"),
    }
}

/// What a build is producing. Fills the `{image}` and `{tag}` placeholders
/// and the `SHARED_RESOURCE_*` environment.
#[derive(Debug, Clone, Copy)]
pub struct BuildTarget<'a> {
    pub resource_id: &'a str,
    pub image: &'a str,
    pub tag: &'a str,
}

/// The resolved container tool
#[derive(Clone)]
pub struct ContainerRuntime {
    program: String,
    runner: Arc<dyn CommandRunner>,
    cancel: CancellationToken,
}

impl ContainerRuntime {
    /// Pick the tool, honouring the environment override.
    pub fn resolve(runner: Arc<dyn CommandRunner>, cancel: CancellationToken) -> Self {
        let override_program = std::env::var(CONTAINER_RUNTIME_ENV).ok();
        Self::resolve_with(override_program.as_deref(), runner, cancel)
    }

    /// Pick the tool given an explicit override value.
    pub fn resolve_with(
        override_program: Option<&str>,
        runner: Arc<dyn CommandRunner>,
        cancel: CancellationToken,
    ) -> Self {
        let program = match override_program.map(str::trim).filter(|p| !p.is_empty()) {
            Some(program) => {
                debug!("container runtime from {}: {}", CONTAINER_RUNTIME_ENV, program);
                program.to_string()
            }
            None => detect(runner.as_ref(), &cancel),
        };
        Self {
            program,
            runner,
            cancel,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Whether `reference` exists locally. Never fails.
    pub fn image_exists(&self, reference: &str) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        let spec = CommandSpec::new(&self.program).args(["image", "inspect", reference]);
        match self.runner.run(&spec) {
            Ok(output) => output.success(),
            Err(e) => {
                debug!("image inspect {} failed: {}", reference, e);
                false
            }
        }
    }

    /// Whether the image `registry/name:tag` exists locally. Never fails.
    pub fn image_tag_exists(&self, registry: Option<&str>, name: &str, tag: &str) -> bool {
        self.image_exists(&image_reference(registry, name, tag))
    }

    /// Run a user-supplied build command in `working_directory`.
    ///
    /// The command is tokenized before anything is spawned, so a blank or
    /// malformed command fails without side effects. Output lines are
    /// forwarded as they arrive.
    pub fn build(
        &self,
        command: &str,
        working_directory: &Path,
        target: BuildTarget<'_>,
        on_stdout: &mut dyn FnMut(&str),
        on_stderr: &mut dyn FnMut(&str),
    ) -> Result<()> {
        let tokens: Vec<String> = split_command(command)?
            .into_iter()
            .map(|token| {
                token
                    .replace("{image}", target.image)
                    .replace("{tag}", target.tag)
            })
            .collect();
        self.cancel.check()?;

        let (program, args) = tokens.split_first().ok_or(Error::EmptyBuildCommand)?;
        let spec = CommandSpec::new(program.as_str())
            .args(args.iter().cloned())
            .current_dir(working_directory)
            .env(BUILD_ENV_RESOURCE_ID, target.resource_id)
            .env(BUILD_ENV_IMAGE, target.image)
            .env(BUILD_ENV_TAG, target.tag);

        info!("building {} in {}", target.image, working_directory.display());
        let exit_code = self
            .runner
            .stream(&spec, on_stdout, on_stderr, &self.cancel)?;
        if exit_code != 0 {
            return Err(Error::BuildCommandFailed { exit_code });
        }
        Ok(())
    }

    /// Apply each target reference to `source`, in order.
    ///
    /// Stops at the first failure, which names the tag and carries the
    /// tool's stderr.
    pub fn tag(&self, source: &str, targets: &[String]) -> Result<()> {
        for target in targets {
            self.cancel.check()?;
            let spec = CommandSpec::new(&self.program).args(["tag", source, target.as_str()]);
            let output = self.runner.run(&spec).map_err(|e| Error::TagFailed {
                tag: target.clone(),
                stderr: e.to_string(),
            })?;
            if !output.success() {
                return Err(Error::TagFailed {
                    tag: target.clone(),
                    stderr: output.stderr.trim().to_string(),
                });
            }
            debug!("tagged {} as {}", source, target);
        }
        Ok(())
    }
}

fn detect(runner: &dyn CommandRunner, cancel: &CancellationToken) -> String {
    for candidate in CONTAINER_RUNTIME_PREFERENCE {
        if cancel.is_cancelled() {
            break;
        }
        let spec = CommandSpec::new(*candidate).arg("--version");
        match runner.run(&spec) {
            Ok(output) if output.success() => {
                debug!("container runtime: {}", candidate);
                return candidate.to_string();
            }
            Ok(output) => debug!("{} --version exited with {}", candidate, output.exit_code),
            Err(e) => debug!("{} unavailable: {}", candidate, e),
        }
    }
    let fallback = CONTAINER_RUNTIME_PREFERENCE
        .last()
        .copied()
        .unwrap_or("docker");
    debug!("no container runtime answered, falling back to {}", fallback);
    fallback.to_string()
}
