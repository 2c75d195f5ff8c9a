//! Blueprint loading from JSON.
//!
//! Blueprints are authored as JSON documents; this module reads and
//! validates them before anything executes. A blueprint that fails shape
//! validation never reaches the executor.

use std::path::Path;

use graft_core::domain::Blueprint;
use graft_core::error::{GraftError, GraftResult};
use tracing::debug;

/// Load and validate a blueprint from a JSON file.
pub fn load_blueprint(path: &Path) -> GraftResult<Blueprint> {
    debug!(path = %path.display(), "loading blueprint");
    let json = std::fs::read_to_string(path).map_err(|e| GraftError::Configuration {
        message: format!("Cannot read blueprint file {}: {}", path.display(), e),
    })?;
    load_blueprint_str(&json).map_err(|e| match e {
        GraftError::Configuration { message } => GraftError::Configuration {
            message: format!("{}: {}", path.display(), message),
        },
        other => other,
    })
}

/// Parse and validate a blueprint from a JSON string.
pub fn load_blueprint_str(json: &str) -> GraftResult<Blueprint> {
    let blueprint: Blueprint =
        serde_json::from_str(json).map_err(|e| GraftError::Configuration {
            message: format!("Invalid blueprint JSON: {}", e),
        })?;
    blueprint.validate()?;
    Ok(blueprint)
}

// ═══════════════════════════════════════════════
//                    TESTS
// ═══════════════════════════════════════════════
