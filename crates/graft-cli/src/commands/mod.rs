//! Command handlers: one module per subcommand.
//!
//! Shared plumbing (blueprint resolution and loading) lives here; each
//! handler translates its arguments, calls into the core crates, and
//! renders the result.

use std::path::{Path, PathBuf};

use tracing::debug;

use graft_core::prelude::Blueprint;

use crate::config::AppConfig;
use crate::error::{CliError, CliResult, IntoCli as _};

pub mod apply;
pub mod completions;
pub mod plan;
pub mod validate;

/// Resolve a blueprint argument against the configured search path.
///
/// An existing path wins unchanged.  Otherwise, when `blueprints.search_path`
/// is set, the name is tried inside it, with and without a `.json` extension.
/// A miss returns the original argument so the caller reports the path the
/// user actually typed.
pub fn resolve_blueprint_path(arg: &Path, config: &AppConfig) -> PathBuf {
    if arg.exists() {
        return arg.to_path_buf();
    }

    if let Some(dir) = &config.blueprints.search_path {
        let direct = dir.join(arg);
        if direct.exists() {
            debug!(path = %direct.display(), "blueprint resolved via search path");
            return direct;
        }
        let with_ext = dir.join(format!("{}.json", arg.display()));
        if with_ext.exists() {
            debug!(path = %with_ext.display(), "blueprint resolved via search path");
            return with_ext;
        }
    }

    arg.to_path_buf()
}

/// Load and validate a blueprint file, mapping failures to CLI errors.
pub fn load(path: &Path) -> CliResult<Blueprint> {
    if !path.exists() {
        return Err(CliError::BlueprintNotFound {
            path: path.to_path_buf(),
        });
    }
    graft_adapters::load_blueprint(path)
        .with_cli_context(|| format!("loading '{}'", path.display()))
}

// ── tests ─────────────────────────────────────────────────────────────────────
