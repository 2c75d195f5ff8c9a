//! Implementation of the `graft apply` command.
//!
//! Responsibility: translate CLI arguments into an execution context, call
//! the core executor, and display the report. No mutation logic lives here.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, instrument};

use graft_adapters::{LocalDisk, ShellRunner};
use graft_core::prelude::*;

use crate::{
    cli::{ApplyArgs, OutputFormat, global::GlobalArgs},
    commands,
    config::AppConfig,
    error::{CliError, CliResult, IntoCli as _},
    output::OutputManager,
};

/// Execute the `graft apply` command.
///
/// Dispatch sequence:
/// 1. Parse `-p` parameters (fail fast on malformed input)
/// 2. Resolve and load the blueprint
/// 3. Resolve the project directory and build the execution context
/// 4. Confirm with user unless `--yes`, `--quiet`, `--dry-run` or JSON mode
/// 5. Execute through the core engine (staging, actions, commit)
/// 6. Render the report and map a failed report to an exit code
#[instrument(skip_all, fields(blueprint = %args.blueprint.display()))]
pub fn execute(
    args: ApplyArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let json_mode = output.format() == OutputFormat::Json;

    // 1. Parse parameters before anything touches the filesystem.
    let params = parse_params(&args.params)?;

    // 2. Load the blueprint.
    let blueprint_path = commands::resolve_blueprint_path(&args.blueprint, &config);
    let blueprint = commands::load(&blueprint_path)?;

    // 3. Project directory + execution context.
    let project_root = resolve_project_root(args.project.as_deref(), &config)?;
    let project_name = project_leaf_name(&project_root);
    let context = build_context(&project_name, &project_root, params);

    debug!(
        blueprint = %blueprint.id,
        project = %project_root.display(),
        actions = blueprint.actions.len(),
        "apply resolved"
    );

    // 4. Show configuration and confirm.
    if !args.yes && !args.dry_run && !global.quiet && !json_mode {
        show_configuration(&blueprint, &project_root, &args, &output)?;
        if !confirm()? {
            return Err(CliError::Cancelled);
        }
    }

    // 5. Execute.
    let executor = BlueprintExecutor::new(
        Box::new(LocalDisk::new(&project_root)),
        Box::new(ShellRunner::new(&project_root)),
    );
    let options = ExecuteOptions {
        dry_run: args.dry_run,
        command_timeout: Duration::from_secs(
            args.timeout.unwrap_or(config.defaults.command_timeout_secs),
        ),
    };

    info!(blueprint = %blueprint.id, dry_run = args.dry_run, "execution started");

    let spinner = start_spinner(&blueprint.name, &output);
    let result = executor.execute(&blueprint, &context, options);
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    // Err here means the blueprint failed validation before anything ran;
    // execution failures come back inside the report.
    let report = result.map_err(CliError::Core)?;

    info!(
        blueprint = %report.blueprint_id,
        success = report.success,
        applied = report.actions_applied,
        skipped = report.actions_skipped,
        "execution finished"
    );

    // 6. Render + exit mapping.
    if json_mode {
        let json = serde_json::to_string_pretty(&report).map_err(|e| {
            CliError::Core(GraftError::Internal {
                message: format!("report serialization failed: {e}"),
            })
        })?;
        println!("{json}");
    } else {
        render_report(&report, &output)?;
    }

    if !report.success {
        return Err(CliError::ExecutionFailed {
            blueprint: report.blueprint_id.clone(),
            summary: report
                .errors
                .first()
                .cloned()
                .unwrap_or_else(|| "execution aborted".into()),
        });
    }

    if !json_mode && !global.quiet && !report.dry_run {
        output.print("")?;
        output.print("Next steps:")?;
        output.print("  git diff    # review what was grafted")?;
    }

    Ok(())
}

// ── Parameter parsing ─────────────────────────────────────────────────────────

/// Split each `-p KEY=VALUE` pair and parse the value.
fn parse_params(pairs: &[String]) -> CliResult<Vec<(String, Value)>> {
    pairs
        .iter()
        .map(|pair| {
            let (key, raw) = pair.split_once('=').ok_or_else(|| CliError::InvalidParam {
                param: pair.clone(),
                reason: "expected KEY=VALUE".into(),
            })?;
            if key.trim().is_empty() {
                return Err(CliError::InvalidParam {
                    param: pair.clone(),
                    reason: "key is empty".into(),
                });
            }
            Ok((key.to_string(), parse_value(raw)))
        })
        .collect()
}

/// `true`, `3`, `null` and friends become JSON values; anything that does
/// not parse stays a string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

// ── Project resolution ────────────────────────────────────────────────────────

fn resolve_project_root(project: Option<&Path>, config: &AppConfig) -> CliResult<PathBuf> {
    let dir = project
        .map(Path::to_path_buf)
        .or_else(|| config.defaults.project_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    if !dir.is_dir() {
        return Err(CliError::ProjectDirMissing { path: dir });
    }

    // project.root must be absolute for blueprints that interpolate it.
    dir.canonicalize()
        .with_cli_context(|| format!("resolving project directory '{}'", dir.display()))
}

fn project_leaf_name(root: &Path) -> String {
    root.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("project")
        .to_string()
}

fn build_context(name: &str, root: &Path, params: Vec<(String, Value)>) -> ExecutionContext {
    let mut context = ExecutionContext::new()
        .with_value("project.name", name)
        .with_value("project.root", root.display().to_string());
    // Caller parameters land last so they can override the derived values.
    for (key, value) in params {
        context = context.with_value(&key, value);
    }
    context
}

// ── UI helpers ────────────────────────────────────────────────────────────────

fn show_configuration(
    blueprint: &Blueprint,
    project_root: &Path,
    args: &ApplyArgs,
    out: &OutputManager,
) -> CliResult<()> {
    out.header("Configuration")?;
    out.print(&format!(
        "  Blueprint:  {} ({})",
        blueprint.name, blueprint.id
    ))?;
    if let Some(description) = &blueprint.description {
        out.print(&format!("  About:      {description}"))?;
    }
    out.print(&format!("  Project:    {}", project_root.display()))?;
    out.print(&format!("  Actions:    {}", blueprint.actions.len()))?;
    if !args.params.is_empty() {
        out.print(&format!("  Parameters: {}", args.params.join(", ")))?;
    }
    out.print("")?;
    Ok(())
}

#[cfg(feature = "interactive")]
fn confirm() -> CliResult<bool> {
    dialoguer::Confirm::new()
        .with_prompt("Continue?")
        .default(true)
        .interact()
        .map_err(|e| match e {
            dialoguer::Error::IO(source) => CliError::IoError {
                message: "failed to read confirmation input".into(),
                source,
            },
        })
}

#[cfg(not(feature = "interactive"))]
fn confirm() -> CliResult<bool> {
    use std::io::{self, Write};

    print!("Continue? [Y/n] ");
    io::stdout().flush().map_err(|e| CliError::IoError {
        message: "failed to flush stdout".into(),
        source: e,
    })?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .map_err(|e| CliError::IoError {
            message: "failed to read confirmation input".into(),
            source: e,
        })?;

    let input = input.trim().to_ascii_lowercase();
    Ok(input.is_empty() || input == "y" || input == "yes")
}

fn start_spinner(name: &str, output: &OutputManager) -> Option<indicatif::ProgressBar> {
    if output.format() != OutputFormat::Human || output.is_quiet() || !output.supports_color() {
        return None;
    }
    let bar = indicatif::ProgressBar::new_spinner();
    bar.set_message(format!("Applying '{name}'..."));
    bar.enable_steady_tick(Duration::from_millis(80));
    Some(bar)
}

fn render_report(report: &ExecutionReport, out: &OutputManager) -> CliResult<()> {
    for warning in &report.warnings {
        out.warning(warning)?;
    }
    for error in &report.errors {
        out.error(error)?;
    }

    if report.dry_run {
        for path in &report.files_written {
            out.print(&format!("  would write {}", path.display()))?;
        }
        for command in &report.commands {
            out.print(&format!("  would run   {command}"))?;
        }
    } else {
        for path in &report.files_written {
            out.print(&format!("  wrote {}", path.display()))?;
        }
        for command in &report.commands {
            out.print(&format!("  ran   {command}"))?;
        }
    }

    if report.success {
        if report.dry_run {
            out.info(&format!(
                "Rehearsal finished: {} actions applied, {} skipped; nothing was written",
                report.actions_applied, report.actions_skipped,
            ))?;
        } else {
            out.success(&format!(
                "Blueprint '{}' applied: {} actions, {} files written",
                report.blueprint_id,
                report.actions_applied,
                report.files_written.len(),
            ))?;
        }
    } else if report.is_partial_commit() {
        out.error(
            "The project holds a partial set of changes; review the written files before re-running",
        )?;
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
