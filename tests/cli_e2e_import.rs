//! End-to-end tests for the `shared-resources import` command.
//!
//! A plain directory with a settings file can be imported without git; tests
//! that need a real repository run with the `integration-tests` feature.

#[allow(dead_code)]
mod common;
use common::prelude::*;

fn expected_api_directory(fixture: &TestFixture) -> String {
    std::fs::canonicalize(fixture.repo_path())
        .unwrap()
        .join("src")
        .join("Api")
        .to_string_lossy()
        .into_owned()
}

#[test]
fn test_import_missing_settings() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .arg("import")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Shared resources settings not found"))
        .stderr(predicate::str::contains("hint:"));
    assert!(!fixture.global_path().exists());
}

#[test]
fn test_import_makes_paths_absolute() {
    let fixture = TestFixture::new().with_repository_settings(settings::CONTAINER_API);

    fixture
        .command()
        .arg("import")
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 resource(s)"));

    let global = fixture.read_global();
    let api = &global["resources"]["api"];
    assert_eq!(
        api["containerMode"]["buildWorkingDirectory"],
        expected_api_directory(&fixture).as_str()
    );
    assert_eq!(api["containerMode"]["imageName"], "api");
    assert!(api.get("gitRepository").is_none());
}

#[test]
fn test_import_explicit_path() {
    let fixture = TestFixture::new().with_repository_settings(settings::MIXED);

    let mut cmd = cargo_bin_cmd!("shared-resources");
    cmd.current_dir(fixture.path())
        .env("SHARED_RESOURCES_GLOBAL_CONFIG", fixture.global_path())
        .env("NO_COLOR", "1")
        .arg("import")
        .arg(fixture.repo_path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 resource(s)"));

    let global = fixture.read_global();
    assert_eq!(global["resources"]["web"]["mode"], "Project");
    let web_directory = global["resources"]["web"]["projectMode"]["projectDirectory"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(web_directory.ends_with("Web"));
    assert!(std::path::Path::new(&web_directory).is_absolute());
}

/// A relative path is resolved against the working directory, and sibling
/// references are found next to it.
#[test]
fn test_import_relative_path_with_parent_segments() {
    let fixture = TestFixture::new().with_repository_settings(
        r#"{
  "sharedResources": {
    "resources": {
      "api": { "mode": "Container", "containerMode": { "imageName": "api", "buildWorkingDirectory": "./src/Api" } }
    },
    "externalResources": [ { "url": "https://example.com/org/lib.git" } ]
  }
}"#,
    );
    fixture.child("lib/.git").create_dir_all().unwrap();
    fixture
        .child("lib/.aspire/settings.json")
        .write_str(
            r#"{ "sharedResources": { "resources": { "lib": { "mode": "Project", "projectMode": { "projectDirectory": "./" } } } } }"#,
        )
        .unwrap();

    let mut cmd = cargo_bin_cmd!("shared-resources");
    cmd.current_dir(fixture.path())
        .env("SHARED_RESOURCES_GLOBAL_CONFIG", fixture.global_path())
        .env("NO_COLOR", "1")
        .args(["import", "repo/../repo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 resource(s)"))
        .stdout(predicate::str::contains("from 2 repository(ies)"));

    let base = std::fs::canonicalize(fixture.path()).unwrap();
    let global = fixture.read_global();
    assert_eq!(
        global["resources"]["api"]["containerMode"]["buildWorkingDirectory"],
        base.join("repo").join("src").join("Api").to_string_lossy().as_ref()
    );
    assert_eq!(
        global["resources"]["lib"]["projectMode"]["projectDirectory"],
        base.join("lib").to_string_lossy().as_ref()
    );
}

#[test]
fn test_import_twice_skips_existing() {
    let fixture = TestFixture::new().with_repository_settings(settings::CONTAINER_API);

    fixture.command().arg("import").assert().success();
    let first = std::fs::read_to_string(fixture.global_path()).unwrap();

    fixture
        .command()
        .arg("import")
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 0 resource(s), skipped 1"))
        .stdout(predicate::str::contains("--force"));

    let second = std::fs::read_to_string(fixture.global_path()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_import_force_overwrites() {
    let fixture = TestFixture::new()
        .with_repository_settings(settings::CONTAINER_API)
        .with_global(
            r#"{ "resources": { "api": { "mode": "Container", "containerMode": { "imageName": "stale" } } } }"#,
        );

    fixture
        .command()
        .arg("import")
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped 1"));
    assert_eq!(
        fixture.read_global()["resources"]["api"]["containerMode"]["imageName"],
        "stale"
    );

    fixture
        .command()
        .args(["import", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 resource(s)"));
    assert_eq!(
        fixture.read_global()["resources"]["api"]["containerMode"]["imageName"],
        "api"
    );
}

#[test]
fn test_import_invalid_settings() {
    let fixture = TestFixture::new().with_repository_settings("{ \"sharedResources\": [1, 2] }");

    fixture
        .command()
        .arg("import")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration parsing error"));
}

/// Inside a git repository the origin is recorded with each resource.
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_import_records_git_provenance() {
    let fixture = TestFixture::new()
        .with_repository_settings(settings::CONTAINER_API)
        .with_git_repository();
    std::process::Command::new("git")
        .args(["remote", "add", "origin", "https://github.com/org/services.git"])
        .current_dir(fixture.repo_path())
        .status()
        .unwrap();

    fixture.command().arg("import").assert().success();

    let global = fixture.read_global();
    let git_repository = &global["resources"]["api"]["gitRepository"];
    assert_eq!(git_repository["url"], "https://github.com/org/services.git");
    assert_eq!(git_repository["defaultBranch"], "main");
}

/// A referenced repository that is not cloned is declined without a prompt
/// when stdin is not a terminal, and the import still succeeds.
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_import_declined_external_reference() {
    let fixture = TestFixture::new()
        .with_repository_settings(
            r#"{
  "sharedResources": {
    "resources": {},
    "externalResources": [ { "url": "https://github.com/org/elsewhere.git" } ]
  }
}"#,
        )
        .with_git_repository();

    fixture
        .command()
        .arg("import")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Not cloned: https://github.com/org/elsewhere.git",
        ));
    assert!(!fixture.path().join("elsewhere").exists());
}
