//! Shared test utilities for E2E tests.
//!
//! Every fixture owns a temporary directory holding an isolated global
//! resources file (`global/resources.json`) and a repository directory
//! (`repo/`). Commands built by the fixture point at both through the
//! environment, so tests never touch the user's real global file.
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_repository_settings(settings::CONTAINER_API);
//!     fixture.command().arg("list").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::settings;
    pub use super::TestFixture;
}

/// Settings and global file snippets.
#[allow(dead_code)]
pub mod settings {
    /// Repository settings with one container resource.
    pub const CONTAINER_API: &str = r#"{
  // the API service
  "sharedResources": {
    "resources": {
      "api": {
        "mode": "Container",
        "containerMode": {
          "imageName": "api",
          "buildCommand": "docker build -t {image}:{tag} .",
          "buildWorkingDirectory": "./src/Api",
        },
      },
    },
  },
}
"#;

    /// Repository settings with a container and a project resource.
    pub const MIXED: &str = r#"{
  "profileName": "dev",
  "sharedResources": {
    "resources": {
      "api": {
        "mode": "Container",
        "containerMode": {
          "imageName": "api",
          "buildCommand": "docker build .",
          "buildWorkingDirectory": "./src/Api"
        }
      },
      "web": {
        "mode": "Project",
        "projectMode": { "projectDirectory": "./src/Web" }
      }
    }
  }
}
"#;

    /// Global file with a container-only and a dual-mode resource.
    pub const GLOBAL_TWO: &str = r#"{
  "resources": {
    "api": {
      "mode": "Container",
      "containerMode": {
        "imageName": "api",
        "imageRegistry": "ghcr.io/org",
        "imageTag": "abc1234",
        "buildCommand": "docker build ."
      }
    },
    "worker": {
      "mode": "Container",
      "containerMode": { "imageName": "worker", "buildCommand": "docker build ." },
      "projectMode": { "projectDirectory": "/src/worker" }
    }
  }
}
"#;
}

/// A temporary global file plus a repository directory.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("repo")
            .create_dir_all()
            .expect("Failed to create repository directory");
        Self { temp_dir }
    }

    /// Write `.aspire/settings.json` in the repository directory.
    pub fn with_repository_settings(self, content: &str) -> Self {
        self.temp_dir
            .child("repo/.aspire/settings.json")
            .write_str(content)
            .expect("Failed to write settings file");
        self
    }

    /// Write the global resources file.
    pub fn with_global(self, content: &str) -> Self {
        self.temp_dir
            .child("global/resources.json")
            .write_str(content)
            .expect("Failed to write global file");
        self
    }

    /// Make the repository directory a git repository with one commit.
    #[allow(dead_code)]
    pub fn with_git_repository(self) -> Self {
        let repo = self.repo_path();
        git(&repo, &["init", "--quiet", "--initial-branch", "main"]);
        std::fs::write(repo.join("README.md"), "# repo\n").expect("Failed to write README");
        git(&repo, &["add", "--all"]);
        git(
            &repo,
            &[
                "-c",
                "user.name=Test",
                "-c",
                "user.email=test@example.com",
                "commit",
                "--quiet",
                "-m",
                "initial",
            ],
        );
        self
    }

    /// A path inside the fixture directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn repo_path(&self) -> PathBuf {
        self.temp_dir.path().join("repo")
    }

    pub fn global_path(&self) -> PathBuf {
        self.temp_dir.path().join("global").join("resources.json")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.repo_path().join(".aspire").join("settings.json")
    }

    /// Contents of the global file, parsed.
    #[allow(dead_code)]
    pub fn read_global(&self) -> serde_json::Value {
        let content = std::fs::read_to_string(self.global_path()).expect("Failed to read global");
        serde_json::from_str(&content).expect("Global file is not JSON")
    }

    /// Contents of the repository settings file, parsed.
    #[allow(dead_code)]
    pub fn read_settings(&self) -> serde_json::Value {
        let content =
            std::fs::read_to_string(self.settings_path()).expect("Failed to read settings");
        serde_json::from_str(&content).expect("Settings file is not JSON")
    }

    /// Command running in the repository directory against the fixture's global file.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("shared-resources");
        cmd.current_dir(self.repo_path())
            .env("SHARED_RESOURCES_GLOBAL_CONFIG", self.global_path())
            .env("SHARED_RESOURCES_CONTAINER_RUNTIME", "docker")
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .expect("Failed to run git");
    assert!(status.success(), "git {args:?} failed");
}
