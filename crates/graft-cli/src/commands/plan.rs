//! Implementation of the `graft plan` command.
//!
//! Loads a blueprint, runs the pre-flight analyzer and prints what `apply`
//! would do, without ever constructing an executor.

use serde_json::json;
use tracing::instrument;

use graft_adapters::LocalDisk;
use graft_core::domain::analyze;
use graft_core::prelude::*;

use crate::{
    cli::{OutputFormat, PlanArgs},
    commands,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Widest action discriminant (`merge-structured-data`), used to align the
/// target column.
const KIND_COLUMN: usize = 21;

#[instrument(skip_all, fields(blueprint = %args.blueprint.display()))]
pub fn execute(args: PlanArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let blueprint_path = commands::resolve_blueprint_path(&args.blueprint, &config);
    let blueprint = commands::load(&blueprint_path)?;
    let footprint = analyze(&blueprint);

    // Optional presence probe: with --project, each required path is checked
    // against the real tree so the plan shows what exists already.
    let disk = match &args.project {
        Some(dir) => {
            if !dir.is_dir() {
                return Err(CliError::ProjectDirMissing { path: dir.clone() });
            }
            Some(LocalDisk::new(dir))
        }
        None => None,
    };

    if output.format() == OutputFormat::Json {
        let payload = plan_json(&blueprint, &footprint, disk.as_ref());
        let rendered = serde_json::to_string_pretty(&payload).map_err(|e| {
            CliError::Core(GraftError::Internal {
                message: format!("plan serialization failed: {e}"),
            })
        })?;
        println!("{rendered}");
        return Ok(());
    }

    output.header(&format!(
        "Plan for '{}' ({} actions)",
        blueprint.name,
        blueprint.actions.len()
    ))?;
    for (index, action) in blueprint.actions.iter().enumerate() {
        output.print(&describe_action(index, action))?;
    }

    output.print("")?;
    output.header(&format!("Footprint ({} files)", footprint.required.len()))?;
    for path in &footprint.required {
        output.print(&describe_path(path, &footprint, disk.as_ref()))?;
    }

    output.print("")?;
    output.info("Plan only: nothing was staged or written")?;
    Ok(())
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// One plan line: `  3. enhance-source-file    src/main.tsx  [if project.hasApi]`
fn describe_action(index: usize, action: &Action) -> String {
    let target = match (&action.kind, action.kind.target_path()) {
        (ActionKind::RunCommand { command, .. }, _) => format!("$ {command}"),
        (_, Some(path)) => path.as_str().to_string(),
        (_, None) => String::new(),
    };
    let mut line = format!(
        "  {:>2}. {:<width$} {}",
        index + 1,
        action.kind.name(),
        target,
        width = KIND_COLUMN
    );
    if let Some(condition) = &action.condition {
        line.push_str(&format!("  [if {condition}]"));
    }
    line.trim_end().to_string()
}

fn describe_path(path: &RelativePath, footprint: &Footprint, disk: Option<&LocalDisk>) -> String {
    let mut notes = Vec::new();
    if footprint.contextual.contains(path) {
        notes.push("contextual");
    }
    if let Some(disk) = disk {
        notes.push(if disk.exists(path.as_path()) {
            "present"
        } else {
            "new"
        });
    }
    if notes.is_empty() {
        format!("  {path}")
    } else {
        format!("  {path}  ({})", notes.join(", "))
    }
}

fn plan_json(
    blueprint: &Blueprint,
    footprint: &Footprint,
    disk: Option<&LocalDisk>,
) -> serde_json::Value {
    let probe = |path: &RelativePath| match disk {
        Some(disk) => json!(disk.exists(path.as_path())),
        None => json!(null),
    };
    json!({
        "blueprint_id": blueprint.id,
        "name": blueprint.name,
        "actions": blueprint
            .actions
            .iter()
            .map(|action| json!({
                "type": action.kind.name(),
                "target": action.kind.target_path().map(|p| p.as_str()),
                "condition": action.condition,
            }))
            .collect::<Vec<_>>(),
        "footprint": {
            "required": footprint
                .required
                .iter()
                .map(|p| json!({ "path": p.as_str(), "present": probe(p) }))
                .collect::<Vec<_>>(),
            "contextual": footprint
                .contextual
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>(),
        },
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn create(path: &str) -> Action {
        Action::new(ActionKind::CreateFile {
            path: path.into(),
            content: String::new(),
            overwrite: false,
        })
    }

    #[test]
    fn action_lines_show_index_kind_and_target() {
        let line = describe_action(0, &create("src/routes.tsx"));
        assert_eq!(line, "   1. create-file           src/routes.tsx");
    }

    #[test]
    fn run_command_lines_show_the_command() {
        let action = Action::new(ActionKind::RunCommand {
            command: "npm install".into(),
            cwd: None,
            timeout_secs: None,
        });
        let line = describe_action(3, &action);
        assert!(line.contains("$ npm install"), "line: {line}");
        assert!(line.starts_with("   4. run-command"));
    }

    #[test]
    fn conditions_render_as_a_suffix() {
        let action = create("src/api.ts").with_condition("project.hasApi");
        let line = describe_action(1, &action);
        assert!(line.ends_with("[if project.hasApi]"), "line: {line}");
    }

    #[test]
    fn contextual_paths_are_annotated() {
        let blueprint = Blueprint::builder()
            .id("bp")
            .name("Bp")
            .contextual_file("src/main.tsx")
            .action(create("src/routes.tsx"))
            .build()
            .unwrap();
        let footprint = analyze(&blueprint);
        let line = describe_path(&RelativePath::new("src/main.tsx"), &footprint, None);
        assert_eq!(line, "  src/main.tsx  (contextual)");
        let plain = describe_path(&RelativePath::new("src/routes.tsx"), &footprint, None);
        assert_eq!(plain, "  src/routes.tsx");
    }

    #[test]
    fn plan_json_carries_actions_and_footprint() {
        let blueprint = Blueprint::builder()
            .id("bp")
            .name("Bp")
            .action(create("a.txt"))
            .build()
            .unwrap();
        let footprint = analyze(&blueprint);
        let payload = plan_json(&blueprint, &footprint, None);
        assert_eq!(payload["blueprint_id"], "bp");
        assert_eq!(payload["actions"][0]["type"], "create-file");
        assert_eq!(payload["footprint"]["required"][0]["path"], "a.txt");
        assert_eq!(payload["footprint"]["required"][0]["present"], json!(null));
    }
}
