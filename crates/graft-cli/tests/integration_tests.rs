//! End-to-end tests for the graft binary: real blueprints applied to real
//! temporary directories.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ROUTER_BLUEPRINT: &str = r#"{
    "id": "router-setup",
    "name": "Router Setup",
    "contextual_files": ["package.json"],
    "actions": [
        { "type": "create-file", "path": "src/routes.tsx", "content": "export const routes = [];\n" },
        { "type": "install-packages", "packages": { "react-router-dom": "^6.20.0" } },
        { "type": "add-env-var", "key": "PUBLIC_URL", "value": "/" }
    ]
}"#;

fn graft() -> Command {
    Command::cargo_bin("graft").unwrap()
}

fn write_blueprint(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("blueprint.json");
    fs::write(&path, json).unwrap();
    path
}

/// A throwaway project with a minimal package.json manifest.
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{ "name": "my-app", "version": "0.1.0", "dependencies": {} }"#,
    )
    .unwrap();
    dir
}

#[test]
fn test_help_lists_subcommands() {
    graft()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_version_flag() {
    graft()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_apply_writes_staged_files() {
    let work = TempDir::new().unwrap();
    let blueprint = write_blueprint(work.path(), ROUTER_BLUEPRINT);
    let proj = project();

    graft()
        .args([
            "apply",
            blueprint.to_str().unwrap(),
            "--project",
            proj.path().to_str().unwrap(),
            "--yes",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("applied"));

    let routes = fs::read_to_string(proj.path().join("src/routes.tsx")).unwrap();
    assert_eq!(routes, "export const routes = [];\n");

    let manifest = fs::read_to_string(proj.path().join("package.json")).unwrap();
    assert!(manifest.contains("react-router-dom"));

    let env = fs::read_to_string(proj.path().join(".env")).unwrap();
    assert!(env.contains("PUBLIC_URL=/"));
}

#[test]
fn test_apply_conflict_aborts_without_touching_disk() {
    let work = TempDir::new().unwrap();
    let blueprint = write_blueprint(
        work.path(),
        r#"{
            "id": "collide",
            "name": "Collide",
            "actions": [
                { "type": "create-file", "path": "fresh.txt", "content": "new\n" },
                { "type": "create-file", "path": "hello.txt", "content": "clobber\n" }
            ]
        }"#,
    );
    let proj = TempDir::new().unwrap();
    fs::write(proj.path().join("hello.txt"), "original\n").unwrap();

    graft()
        .args([
            "apply",
            blueprint.to_str().unwrap(),
            "--project",
            proj.path().to_str().unwrap(),
            "--yes",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed"));

    // The abort happened before commit: nothing was written at all.
    assert!(!proj.path().join("fresh.txt").exists());
    assert_eq!(
        fs::read_to_string(proj.path().join("hello.txt")).unwrap(),
        "original\n"
    );
}

#[test]
fn test_plan_previews_without_writing() {
    let work = TempDir::new().unwrap();
    let blueprint = write_blueprint(work.path(), ROUTER_BLUEPRINT);
    let proj = project();

    graft()
        .args([
            "plan",
            blueprint.to_str().unwrap(),
            "--project",
            proj.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("create-file"))
        .stdout(predicate::str::contains("Footprint"))
        .stdout(predicate::str::contains("package.json"))
        .stdout(predicate::str::contains("present"))
        .stdout(predicate::str::contains("new"));

    assert!(!proj.path().join("src").exists());
    assert!(!proj.path().join(".env").exists());
}

#[test]
fn test_dry_run_reports_but_writes_nothing() {
    let work = TempDir::new().unwrap();
    let blueprint = write_blueprint(work.path(), ROUTER_BLUEPRINT);
    let proj = project();

    graft()
        .args([
            "apply",
            blueprint.to_str().unwrap(),
            "--project",
            proj.path().to_str().unwrap(),
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("would write"))
        .stdout(predicate::str::contains("Rehearsal"));

    assert!(!proj.path().join("src").exists());
    assert!(!proj.path().join(".env").exists());
    // The manifest was staged, never committed.
    let manifest = fs::read_to_string(proj.path().join("package.json")).unwrap();
    assert!(!manifest.contains("react-router-dom"));
}

#[test]
fn test_validate_accepts_well_formed_blueprint() {
    let work = TempDir::new().unwrap();
    let blueprint = write_blueprint(work.path(), ROUTER_BLUEPRINT);

    graft()
        .args(["validate", blueprint.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"))
        .stdout(predicate::str::contains("Router Setup"));
}

#[test]
fn test_json_output_is_machine_readable() {
    let work = TempDir::new().unwrap();
    let blueprint = write_blueprint(work.path(), ROUTER_BLUEPRINT);
    let proj = project();

    let output = graft()
        .args([
            "apply",
            blueprint.to_str().unwrap(),
            "--project",
            proj.path().to_str().unwrap(),
            "--output-format",
            "json",
        ])
        .assert()
        .success()
        .get_output()
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["blueprint_id"], "router-setup");
    assert_eq!(report["success"], serde_json::Value::Bool(true));
    assert_eq!(report["files_written"].as_array().unwrap().len(), 3);
    assert_eq!(report["actions_applied"], serde_json::json!(3));
}

#[test]
fn test_quiet_apply_produces_no_stdout() {
    let work = TempDir::new().unwrap();
    let blueprint = write_blueprint(work.path(), ROUTER_BLUEPRINT);
    let proj = project();

    graft()
        .args([
            "apply",
            blueprint.to_str().unwrap(),
            "--project",
            proj.path().to_str().unwrap(),
            "--quiet",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(proj.path().join("src/routes.tsx").exists());
}

#[test]
fn test_completions_generate_bash_script() {
    graft()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("graft"))
        .stdout(predicate::str::contains("complete"));
}

#[test]
fn test_apply_runs_deferred_commands() {
    let work = TempDir::new().unwrap();
    let blueprint = write_blueprint(
        work.path(),
        r#"{
            "id": "with-command",
            "name": "With Command",
            "actions": [
                { "type": "create-file", "path": "input.txt", "content": "data\n" },
                { "type": "run-command", "command": "printf ok > marker.txt" }
            ]
        }"#,
    );
    let proj = TempDir::new().unwrap();

    graft()
        .args([
            "apply",
            blueprint.to_str().unwrap(),
            "--project",
            proj.path().to_str().unwrap(),
            "--yes",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("ran"));

    // The command ran with the project root as its working directory.
    assert_eq!(
        fs::read_to_string(proj.path().join("marker.txt")).unwrap(),
        "ok"
    );
}

#[test]
fn test_conditions_gate_actions_on_params() {
    let work = TempDir::new().unwrap();
    let blueprint = write_blueprint(
        work.path(),
        r#"{
            "id": "conditional",
            "name": "Conditional",
            "actions": [
                { "type": "create-file", "path": "always.txt", "content": "a\n" },
                {
                    "type": "create-file",
                    "path": "api.txt",
                    "content": "b\n",
                    "condition": "project.hasApi"
                }
            ]
        }"#,
    );

    // Without the parameter the gated action is skipped.
    let without = TempDir::new().unwrap();
    graft()
        .args([
            "apply",
            blueprint.to_str().unwrap(),
            "--project",
            without.path().to_str().unwrap(),
            "--yes",
        ])
        .assert()
        .success();
    assert!(without.path().join("always.txt").exists());
    assert!(!without.path().join("api.txt").exists());

    // With -p project.hasApi=true it runs.
    let with = TempDir::new().unwrap();
    graft()
        .args([
            "apply",
            blueprint.to_str().unwrap(),
            "--project",
            with.path().to_str().unwrap(),
            "--yes",
            "-p",
            "project.hasApi=true",
        ])
        .assert()
        .success();
    assert!(with.path().join("api.txt").exists());
}

#[test]
fn test_search_path_resolves_bare_blueprint_names() {
    let work = TempDir::new().unwrap();
    let store = work.path().join("blueprints");
    fs::create_dir(&store).unwrap();
    fs::write(store.join("router-setup.json"), ROUTER_BLUEPRINT).unwrap();

    let config = work.path().join("graft.toml");
    fs::write(
        &config,
        format!("[blueprints]\nsearch_path = \"{}\"\n", store.display()),
    )
    .unwrap();

    graft()
        .args([
            "--config",
            config.to_str().unwrap(),
            "validate",
            "router-setup",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));
}
