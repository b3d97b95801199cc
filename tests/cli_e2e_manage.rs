//! End-to-end tests for the commands that edit the global file directly:
//! `remove`, `clear` and `mode`.

#[allow(dead_code)]
mod common;
use common::prelude::*;

#[test]
fn test_remove_resource() {
    let fixture = TestFixture::new().with_global(settings::GLOBAL_TWO);

    fixture
        .command()
        .args(["remove", "api"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed api"));

    let global = fixture.read_global();
    assert!(global["resources"].get("api").is_none());
    assert!(global["resources"].get("worker").is_some());
}

#[test]
fn test_remove_unknown_suggests_similar() {
    let fixture = TestFixture::new().with_global(settings::GLOBAL_TWO);

    fixture
        .command()
        .args(["remove", "apj"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Resource not found: apj"))
        .stderr(predicate::str::contains("Did you mean 'api'?"));
}

#[test]
fn test_clear_with_yes() {
    let fixture = TestFixture::new().with_global(settings::GLOBAL_TWO);

    fixture
        .command()
        .args(["clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 2 shared resource(s)"));

    let global = fixture.read_global();
    assert_eq!(global["resources"], serde_json::json!({}));
}

#[test]
fn test_clear_empty() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .args(["clear", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No shared resources to clear"));
    assert!(!fixture.global_path().exists());
}

#[test]
fn test_mode_switch_to_project() {
    let fixture = TestFixture::new().with_global(settings::GLOBAL_TWO);

    fixture
        .command()
        .args(["mode", "worker", "project"])
        .assert()
        .success()
        .stdout(predicate::str::contains("now uses Project mode"));

    let global = fixture.read_global();
    assert_eq!(global["resources"]["worker"]["mode"], "Project");
    assert_eq!(global["resources"]["api"]["mode"], "Container");
}

#[test]
fn test_mode_unchanged_does_not_write() {
    let fixture = TestFixture::new().with_global(settings::GLOBAL_TWO);

    fixture
        .command()
        .args(["mode", "api", "container"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already in Container mode"));

    let content = std::fs::read_to_string(fixture.global_path()).unwrap();
    assert_eq!(content, settings::GLOBAL_TWO);
}

#[test]
fn test_mode_refuses_missing_settings() {
    let fixture = TestFixture::new().with_global(settings::GLOBAL_TWO);

    fixture
        .command()
        .args(["mode", "api", "project"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("has no projectMode settings"));

    let global = fixture.read_global();
    assert_eq!(global["resources"]["api"]["mode"], "Container");
}
