//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crates never see it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables (`GRAFT_` prefix, `__` separates segments)
//! 3. Config file (`--config`, or the platform config dir)
//! 4. Built-in defaults (always present)

use std::path::PathBuf;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default values for blueprint execution.
    pub defaults: Defaults,
    /// Output settings.
    pub output: OutputConfig,
    /// Blueprint resolution settings.
    pub blueprints: BlueprintConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Project directory used when `--project` is not given.
    pub project_dir: Option<PathBuf>,
    /// Timeout for run-command actions without their own `timeout_secs`.
    pub command_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`; the `--output-format` flag wins.
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlueprintConfig {
    /// Directory searched when a blueprint argument is a bare name rather
    /// than an existing path.
    pub search_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            defaults: Defaults::default(),
            output: OutputConfig::default(),
            blueprints: BlueprintConfig::default(),
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            project_dir: None,
            command_timeout_secs: 120,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl Default for BlueprintConfig {
    fn default() -> Self {
        Self { search_path: None }
    }
}

impl AppConfig {
    /// Load configuration, layering file and environment over defaults.
    ///
    /// `config_file` is the path the user passed via `--config`; when given,
    /// the file must exist.  Without it, the default location is read if
    /// present and silently skipped otherwise.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let explicit = config_file.is_some();
        let path = config_file.cloned().unwrap_or_else(Self::config_path);

        let merged = config::Config::builder()
            .add_source(
                config::File::from(path.clone())
                    .format(config::FileFormat::Toml)
                    .required(explicit),
            )
            .add_source(
                config::Environment::with_prefix("GRAFT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read configuration from '{}'", path.display()))?;

        merged
            .try_deserialize()
            .with_context(|| format!("invalid configuration in '{}'", path.display()))
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.graft.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "graft", "graft")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".graft.toml"))
    }
}
