//! End-to-end tests for the commands that write repository settings files:
//! `export` and `add-external`.

#[allow(dead_code)]
mod common;
use common::prelude::*;

fn global_with_resource_in(fixture: &TestFixture, id: &str, relative: &str) -> String {
    let root = std::fs::canonicalize(fixture.repo_path()).unwrap();
    serde_json::json!({
        "resources": {
            id: {
                "mode": "Container",
                "containerMode": {
                    "imageName": id,
                    "buildCommand": "docker build .",
                    "buildWorkingDirectory": root.join(relative),
                },
                "gitRepository": { "url": "https://github.com/org/services.git" }
            }
        }
    })
    .to_string()
}

#[test]
fn test_export_outside_repository() {
    let fixture = TestFixture::new().with_global(settings::GLOBAL_TWO);

    fixture
        .command()
        .args(["export", "api"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Not inside a git repository"));
    assert!(!fixture.settings_path().exists());
}

#[test]
fn test_add_external_rejects_unusable_url() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .args(["add-external", "https://github.com/"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid external resource URL"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_export_writes_repository_form() {
    let fixture = TestFixture::new().with_git_repository();
    let global = global_with_resource_in(&fixture, "api", "src/Api");
    let fixture = fixture.with_global(&global);

    fixture
        .command()
        .arg("export")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 resource(s)"));

    let settings = fixture.read_settings();
    let api = &settings["sharedResources"]["resources"]["api"];
    assert_eq!(api["containerMode"]["buildWorkingDirectory"], "./src/Api");
    assert!(api.get("gitRepository").is_none());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_export_preserves_other_settings() {
    let fixture = TestFixture::new()
        .with_repository_settings(settings::MIXED)
        .with_git_repository();
    let global = global_with_resource_in(&fixture, "cache", "src/Cache");
    let fixture = fixture.with_global(&global);

    fixture.command().args(["export", "cache"]).assert().success();

    let settings = fixture.read_settings();
    assert_eq!(settings["profileName"], "dev");
    let resources = &settings["sharedResources"]["resources"];
    assert!(resources.get("api").is_some());
    assert!(resources.get("web").is_some());
    assert_eq!(
        resources["cache"]["containerMode"]["buildWorkingDirectory"],
        "./src/Cache"
    );

    fixture
        .command()
        .args(["export", "cache"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_export_unknown_resource() {
    let fixture = TestFixture::new()
        .with_global(settings::GLOBAL_TWO)
        .with_git_repository();

    fixture
        .command()
        .args(["export", "nope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Resource not found: nope"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_add_external_is_idempotent() {
    let fixture = TestFixture::new()
        .with_repository_settings(settings::MIXED)
        .with_git_repository();

    fixture
        .command()
        .args([
            "add-external",
            "git@github.com:org/platform.git",
            "--branch",
            "develop",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("clones into ../platform"));

    fixture
        .command()
        .args([
            "add-external",
            "git@github.com:org/platform.git",
            "-b",
            "develop",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("already referenced"));

    let settings = fixture.read_settings();
    assert_eq!(settings["profileName"], "dev");
    let externals = settings["sharedResources"]["externalResources"]
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(externals.len(), 1);
    assert_eq!(externals[0]["branch"], "develop");
}
