//! End-to-end tests: blueprints executed through real adapters.

use std::path::Path;

use graft_adapters::{LocalDisk, MemoryDisk, RecordingRunner, ShellRunner, load_blueprint_str};
use graft_core::prelude::*;

fn execute(
    disk: &MemoryDisk,
    runner: &RecordingRunner,
    blueprint: &Blueprint,
    ctx: &ExecutionContext,
) -> ExecutionReport {
    let executor = BlueprintExecutor::new(Box::new(disk.clone()), Box::new(runner.clone()));
    executor
        .execute(blueprint, ctx, ExecuteOptions::default())
        .unwrap()
}

#[test]
fn create_then_merge_writes_the_exact_manifest() {
    let blueprint = load_blueprint_str(
        r#"{
            "id": "manifest",
            "name": "Manifest",
            "actions": [
                { "type": "create-file", "path": "pkg.json", "content": "{\"name\":\"a\"}" },
                { "type": "merge-structured-data", "path": "pkg.json", "value": { "version": "1.0.0" } }
            ]
        }"#,
    )
    .unwrap();

    let disk = MemoryDisk::new();
    let report = execute(&disk, &RecordingRunner::new(), &blueprint, &ExecutionContext::new());

    assert!(report.success);
    assert!(report.warnings.is_empty());
    assert!(report.errors.is_empty());
    // Both actions touched the same file; the log keeps both entries.
    assert_eq!(report.files_touched.len(), 2);
    assert_eq!(report.files_written.len(), 1);
    assert_eq!(
        disk.read_file(Path::new("pkg.json")).unwrap(),
        "{\n  \"name\": \"a\",\n  \"version\": \"1.0.0\"\n}\n"
    );
}

#[test]
fn aborted_execution_leaves_disk_byte_identical() {
    let disk = MemoryDisk::new();
    disk.seed(".gitignore", "node_modules/\n");
    disk.seed("taken.txt", "already here\n");

    let blueprint = load_blueprint_str(
        r#"{
            "id": "doomed",
            "name": "Doomed",
            "actions": [
                { "type": "append-to-file", "path": ".gitignore", "content": "dist/\n" },
                { "type": "create-file", "path": "taken.txt", "content": "clobber" }
            ]
        }"#,
    )
    .unwrap();

    let report = execute(&disk, &RecordingRunner::new(), &blueprint, &ExecutionContext::new());

    assert!(!report.success);
    assert!(report.files_written.is_empty());
    // The staged append never reached disk.
    assert_eq!(
        disk.read_file(Path::new(".gitignore")).unwrap(),
        "node_modules/\n"
    );
    assert_eq!(
        disk.read_file(Path::new("taken.txt")).unwrap(),
        "already here\n"
    );
}

#[test]
fn second_run_is_idempotent_under_skip_policy() {
    let blueprint = load_blueprint_str(
        r#"{
            "id": "setup",
            "name": "Setup",
            "actions": [
                {
                    "type": "create-file",
                    "path": "vitest.config.ts",
                    "content": "export default {};\n",
                    "conflict": { "strategy": "skip" }
                },
                { "type": "append-to-file", "path": ".gitignore", "content": "coverage/\n", "fallback": "create" },
                { "type": "add-env-var", "key": "VITE_API_URL", "value": "http://localhost:3000" }
            ]
        }"#,
    )
    .unwrap();

    let disk = MemoryDisk::new();
    let runner = RecordingRunner::new();
    let ctx = ExecutionContext::new();

    let first = execute(&disk, &runner, &blueprint, &ctx);
    assert!(first.success);
    assert_eq!(first.files_written.len(), 3);
    let snapshot: Vec<_> = disk
        .list_files()
        .into_iter()
        .map(|p| (p.clone(), disk.read_file(&p).unwrap()))
        .collect();

    let second = execute(&disk, &runner, &blueprint, &ctx);
    assert!(second.success);
    // Only the create conflicts; append and env upsert are no-ops.
    assert_eq!(second.warnings.len(), 1);
    assert!(second.files_written.is_empty());
    for (path, content) in snapshot {
        assert_eq!(disk.read_file(&path).unwrap(), content, "{path:?} changed");
    }
}

#[test]
fn present_import_leaves_file_untouched() {
    let source = "import { QueryClient } from \"@tanstack/react-query\";\n\nconst app = 1;\n";
    let disk = MemoryDisk::new();
    disk.seed("src/main.tsx", source);

    let blueprint = load_blueprint_str(
        r#"{
            "id": "rq",
            "name": "React Query",
            "actions": [
                {
                    "type": "enhance-source-file",
                    "path": "src/main.tsx",
                    "imports": [{ "name": "QueryClient", "from": "@tanstack/react-query" }]
                }
            ]
        }"#,
    )
    .unwrap();

    let report = execute(&disk, &RecordingRunner::new(), &blueprint, &ExecutionContext::new());

    assert!(report.success);
    assert_eq!(report.files_touched.len(), 1);
    // Nothing changed, so nothing was written.
    assert!(report.files_written.is_empty());
    assert_eq!(disk.read_file(Path::new("src/main.tsx")).unwrap(), source);
}

#[test]
fn disjoint_merges_commute() {
    let seed = "{\n  \"compilerOptions\": {}\n}\n";
    let a = r#"{ "type": "merge-structured-data", "path": "tsconfig.json", "value": { "a": 1 } }"#;
    let b = r#"{ "type": "merge-structured-data", "path": "tsconfig.json", "value": { "b": 2 } }"#;

    let run = |first: &str, second: &str| {
        let disk = MemoryDisk::new();
        disk.seed("tsconfig.json", seed);
        let blueprint = load_blueprint_str(&format!(
            r#"{{ "id": "m", "name": "M", "actions": [{first}, {second}] }}"#
        ))
        .unwrap();
        let report = execute(&disk, &RecordingRunner::new(), &blueprint, &ExecutionContext::new());
        assert!(report.success);
        disk.read_file(Path::new("tsconfig.json")).unwrap()
    };

    assert_eq!(run(a, b), run(b, a));
}

#[test]
fn wrap_without_target_warns_and_changes_nothing() {
    let source = "import React from \"react\";\n\nexport const x = <Other />;\n";
    let disk = MemoryDisk::new();
    disk.seed("src/main.tsx", source);

    let blueprint = load_blueprint_str(
        r#"{
            "id": "wrap",
            "name": "Wrap",
            "actions": [
                {
                    "type": "enhance-source-file",
                    "path": "src/main.tsx",
                    "wrap": { "target": "App", "wrapper": "StrictMode" }
                }
            ]
        }"#,
    )
    .unwrap();

    let report = execute(&disk, &RecordingRunner::new(), &blueprint, &ExecutionContext::new());

    assert!(report.success);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("App"));
    assert_eq!(disk.read_file(Path::new("src/main.tsx")).unwrap(), source);
}

#[test]
fn commands_run_at_their_list_position() {
    let blueprint = load_blueprint_str(
        r#"{
            "id": "install",
            "name": "Install",
            "actions": [
                { "type": "install-packages", "packages": { "zod": "^3.23.0" } },
                { "type": "run-command", "command": "npm install" }
            ]
        }"#,
    )
    .unwrap();

    let disk = MemoryDisk::new();
    disk.seed("package.json", "{\n  \"name\": \"app\"\n}\n");
    let runner = RecordingRunner::new();
    let report = execute(&disk, &runner, &blueprint, &ExecutionContext::new());

    assert!(report.success);
    assert_eq!(runner.commands(), vec!["npm install".to_string()]);
    assert_eq!(report.commands, vec!["npm install".to_string()]);
    let manifest = disk.read_file(Path::new("package.json")).unwrap();
    assert!(manifest.contains("\"zod\": \"^3.23.0\""));
}

#[test]
fn partial_commit_reports_the_written_subset() {
    let disk = MemoryDisk::new();
    disk.fail_writes_on("b.txt");

    let blueprint = load_blueprint_str(
        r#"{
            "id": "partial",
            "name": "Partial",
            "actions": [
                { "type": "create-file", "path": "a.txt", "content": "a" },
                { "type": "create-file", "path": "b.txt", "content": "b" }
            ]
        }"#,
    )
    .unwrap();

    let report = execute(&disk, &RecordingRunner::new(), &blueprint, &ExecutionContext::new());

    assert!(!report.success);
    assert!(report.is_partial_commit());
    assert_eq!(report.files_written, vec![std::path::PathBuf::from("a.txt")]);
    assert_eq!(disk.read_file(Path::new("a.txt")).unwrap(), "a");
    assert_eq!(disk.read_file(Path::new("b.txt")), None);
}

#[test]
fn env_upsert_replaces_the_existing_line() {
    let disk = MemoryDisk::new();
    disk.seed(".env", "API_URL=http://old\nOTHER=1\n");

    let blueprint = load_blueprint_str(
        r#"{
            "id": "env",
            "name": "Env",
            "actions": [
                { "type": "add-env-var", "key": "API_URL", "value": "http://new" }
            ]
        }"#,
    )
    .unwrap();

    let report = execute(&disk, &RecordingRunner::new(), &blueprint, &ExecutionContext::new());

    assert!(report.success);
    assert_eq!(
        disk.read_file(Path::new(".env")).unwrap(),
        "API_URL=http://new\nOTHER=1\n"
    );
}

#[test]
fn context_parameters_flow_into_rendered_content() {
    let blueprint = load_blueprint_str(
        r#"{
            "id": "readme",
            "name": "Readme",
            "actions": [
                { "type": "create-file", "path": "README.md", "content": "# {{project.name}}\n" }
            ]
        }"#,
    )
    .unwrap();

    let disk = MemoryDisk::new();
    let ctx = ExecutionContext::new().with_value("project.name", "acme-site");
    let report = execute(&disk, &RecordingRunner::new(), &blueprint, &ctx);

    assert!(report.success);
    assert_eq!(
        disk.read_file(Path::new("README.md")).unwrap(),
        "# acme-site\n"
    );
}

#[test]
fn conditions_gate_actions_per_context() {
    let blueprint = load_blueprint_str(
        r#"{
            "id": "optional",
            "name": "Optional",
            "actions": [
                { "type": "create-file", "path": "base.txt", "content": "base" },
                {
                    "type": "create-file",
                    "path": "api.ts",
                    "content": "export {};",
                    "condition": "project.hasApi"
                }
            ]
        }"#,
    )
    .unwrap();

    let disk = MemoryDisk::new();
    let ctx = ExecutionContext::new().with_value("project.hasApi", false);
    let report = execute(&disk, &RecordingRunner::new(), &blueprint, &ctx);

    assert!(report.success);
    assert_eq!(report.actions_skipped, 1);
    assert!(disk.read_file(Path::new("base.txt")).is_some());
    assert_eq!(disk.read_file(Path::new("api.ts")), None);
}

#[test]
fn dry_run_previews_without_writing() {
    let blueprint = load_blueprint_str(
        r#"{
            "id": "dry",
            "name": "Dry",
            "actions": [
                { "type": "create-file", "path": "new.txt", "content": "content" }
            ]
        }"#,
    )
    .unwrap();

    let disk = MemoryDisk::new();
    let executor = BlueprintExecutor::new(
        Box::new(disk.clone()),
        Box::new(RecordingRunner::new()),
    );
    let options = ExecuteOptions {
        dry_run: true,
        ..ExecuteOptions::default()
    };
    let report = executor
        .execute(&blueprint, &ExecutionContext::new(), options)
        .unwrap();

    assert!(report.success);
    assert_eq!(report.files_written.len(), 1);
    assert!(disk.list_files().is_empty());
}

// ── real filesystem and shell ────────────────────────────────────────────────

#[test]
fn local_disk_and_shell_runner_compose() {
    let dir = tempfile::tempdir().unwrap();
    let blueprint = load_blueprint_str(
        r#"{
            "id": "real",
            "name": "Real",
            "actions": [
                { "type": "create-file", "path": "src/index.ts", "content": "export {};\n" },
                { "type": "run-command", "command": "printf ran > marker.txt" }
            ]
        }"#,
    )
    .unwrap();

    let executor = BlueprintExecutor::new(
        Box::new(LocalDisk::new(dir.path())),
        Box::new(ShellRunner::new(dir.path())),
    );
    let report = executor
        .execute(&blueprint, &ExecutionContext::new(), ExecuteOptions::default())
        .unwrap();

    assert!(report.success, "errors: {:?}", report.errors);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("src/index.ts")).unwrap(),
        "export {};\n"
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("marker.txt")).unwrap(),
        "ran"
    );
}
