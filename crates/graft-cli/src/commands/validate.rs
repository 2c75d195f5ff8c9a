//! Implementation of the `graft validate` command.
//!
//! Load, parse and shape-check a blueprint without executing anything. The
//! loader already validates on success, so reaching the report line means
//! the blueprint is well-formed.

use serde_json::json;
use tracing::instrument;

use graft_core::domain::analyze;
use graft_core::prelude::*;

use crate::{
    cli::{OutputFormat, ValidateArgs},
    commands,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(blueprint = %args.blueprint.display()))]
pub fn execute(args: ValidateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let path = commands::resolve_blueprint_path(&args.blueprint, &config);
    let blueprint = commands::load(&path)?;
    let footprint = analyze(&blueprint);

    if output.format() == OutputFormat::Json {
        let payload = validate_json(&blueprint, &footprint);
        let rendered = serde_json::to_string_pretty(&payload).map_err(|e| {
            CliError::Core(GraftError::Internal {
                message: format!("validation report serialization failed: {e}"),
            })
        })?;
        println!("{rendered}");
        return Ok(());
    }

    output.success(&format!(
        "'{}' is valid: {} ({} actions, {} files in footprint)",
        path.display(),
        blueprint.name,
        blueprint.actions.len(),
        footprint.required.len(),
    ))?;
    Ok(())
}

fn validate_json(blueprint: &Blueprint, footprint: &Footprint) -> serde_json::Value {
    json!({
        "blueprint_id": blueprint.id,
        "name": blueprint.name,
        "version": blueprint.version,
        "valid": true,
        "actions": blueprint.actions.len(),
        "footprint_files": footprint.required.len(),
    })
}
