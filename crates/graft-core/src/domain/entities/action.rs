//! Blueprint actions: the closed set of mutations a blueprint may request.
//!
//! # Design
//!
//! An [`Action`] is one step of a blueprint. Its serialized form is a tagged
//! object keyed by `type`:
//!
//! ```json
//! { "type": "create-file", "path": "src/routes.tsx", "content": "..." }
//! { "type": "install-packages", "packages": { "react-router-dom": "^6" } }
//! { "type": "run-command", "command": "npm install", "timeout_secs": 300 }
//! ```
//!
//! The `type` discriminant maps to [`ActionKind`], a closed enum: adding an
//! action kind means adding a variant, and the compiler then points at every
//! dispatch site that must handle it. Unknown `type` strings fail
//! deserialization instead of being carried around as stringly-typed data.
//!
//! Fields shared by every kind — `condition` and `conflict` — live on
//! [`Action`] itself and are flattened around the payload, so a blueprint
//! author writes them as siblings of the type-specific fields.
//!
//! Actions are read-only inputs. The orchestrator substitutes template
//! placeholders into a *copy* of the string fields at execution time; the
//! blueprint's own actions are never mutated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::entities::common::RelativePath;
use crate::domain::error::DomainError;
use crate::domain::value_objects::{AppendFallback, ArrayMergePolicy, ConflictStrategy};

// ── Conflict resolution ──────────────────────────────────────────────────────

/// Per-action conflict policy: what to do when a primitive cannot apply.
///
/// `merge_strategy` only matters when the resolution ends in a structured
/// merge (strategy `merge`, or a merge-kind action being retried).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConflictResolution {
    #[serde(default)]
    pub strategy: ConflictStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_strategy: Option<ArrayMergePolicy>,
}

impl ConflictResolution {
    pub const fn new(strategy: ConflictStrategy) -> Self {
        Self {
            strategy,
            merge_strategy: None,
        }
    }
}

impl From<ConflictStrategy> for ConflictResolution {
    fn from(strategy: ConflictStrategy) -> Self {
        Self::new(strategy)
    }
}

// ── Payload fragments ────────────────────────────────────────────────────────

/// One named import to inject: `import { name } from "from";`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpec {
    pub name: String,
    pub from: String,
}

impl ImportSpec {
    pub fn new(name: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            from: from.into(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("import name is empty".into());
        }
        if self.from.trim().is_empty() {
            return Err(format!("import '{}' has an empty module", self.name));
        }
        Ok(())
    }
}

/// Wrap the first `<target>…</target>` occurrence in `<wrapper>…</wrapper>`.
///
/// Attributes are rendered onto the wrapper's opening tag in sorted key
/// order (BTreeMap), so the rewritten file is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapSpec {
    pub target: String,
    pub wrapper: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl WrapSpec {
    pub fn new(target: impl Into<String>, wrapper: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            wrapper: wrapper.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    fn validate(&self) -> Result<(), String> {
        if self.target.trim().is_empty() {
            return Err("wrap target is empty".into());
        }
        if self.wrapper.trim().is_empty() {
            return Err("wrap wrapper is empty".into());
        }
        Ok(())
    }
}

// ── ActionKind ───────────────────────────────────────────────────────────────

fn default_manifest() -> RelativePath {
    RelativePath::new("package.json")
}

fn default_env_file() -> RelativePath {
    RelativePath::new(".env")
}

/// The type-specific payload of an action.
///
/// Serialized with an internal `type` tag in kebab-case, so variant names
/// below read exactly as blueprint authors write them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ActionKind {
    /// Write a new file. Fails `AlreadyExists` unless `overwrite` is set.
    CreateFile {
        path: RelativePath,
        content: String,
        #[serde(default)]
        overwrite: bool,
    },

    /// Insert a block at the end of an existing file.
    AppendToFile {
        path: RelativePath,
        content: String,
        #[serde(default)]
        fallback: AppendFallback,
    },

    /// Insert a block at the start of an existing file.
    PrependToFile {
        path: RelativePath,
        content: String,
        #[serde(default)]
        fallback: AppendFallback,
    },

    /// Deep-merge a JSON object into an existing JSON document.
    MergeStructuredData {
        path: RelativePath,
        value: Value,
        #[serde(default)]
        arrays: ArrayMergePolicy,
    },

    /// Inject imports and/or wrap an element in a source file.
    EnhanceSourceFile {
        path: RelativePath,
        #[serde(default)]
        imports: Vec<ImportSpec>,
        #[serde(default)]
        wrap: Option<WrapSpec>,
    },

    /// Record packages in the manifest's dependency table.
    ///
    /// This mutates the manifest only — no registry is contacted. Pair with
    /// a `run-command` action when the install itself should run.
    InstallPackages {
        #[serde(default = "default_manifest")]
        manifest: RelativePath,
        packages: BTreeMap<String, String>,
        #[serde(default)]
        dev: bool,
    },

    /// Add one entry to the manifest's `scripts` table.
    AddScript {
        #[serde(default = "default_manifest")]
        manifest: RelativePath,
        name: String,
        command: String,
    },

    /// Append `KEY=VALUE` to the env file, replacing an existing `KEY` line.
    AddEnvVar {
        #[serde(default = "default_env_file")]
        file: RelativePath,
        key: String,
        value: String,
    },

    /// Deep-merge into a JSON config file, creating it when absent.
    MergeConfig {
        path: RelativePath,
        value: Value,
        #[serde(default)]
        arrays: ArrayMergePolicy,
    },

    /// Wrap an element in a config/entry file, optionally importing the
    /// wrapper first.
    WrapConfig {
        path: RelativePath,
        wrap: WrapSpec,
        #[serde(default)]
        import: Option<ImportSpec>,
    },

    /// Run an external command after staging (deferred side effect).
    RunCommand {
        command: String,
        #[serde(default)]
        cwd: Option<RelativePath>,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },

    /// Append a definition block to a schema file, creating it when absent.
    /// Idempotent when the block is already present verbatim.
    ExtendSchema {
        path: RelativePath,
        definition: String,
    },
}

impl ActionKind {
    /// The kebab-case discriminant, matching the serialized `type` field.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateFile { .. } => "create-file",
            Self::AppendToFile { .. } => "append-to-file",
            Self::PrependToFile { .. } => "prepend-to-file",
            Self::MergeStructuredData { .. } => "merge-structured-data",
            Self::EnhanceSourceFile { .. } => "enhance-source-file",
            Self::InstallPackages { .. } => "install-packages",
            Self::AddScript { .. } => "add-script",
            Self::AddEnvVar { .. } => "add-env-var",
            Self::MergeConfig { .. } => "merge-config",
            Self::WrapConfig { .. } => "wrap-config",
            Self::RunCommand { .. } => "run-command",
            Self::ExtendSchema { .. } => "extend-schema",
        }
    }

    /// The file this action stages, if any.
    ///
    /// `run-command` is the only kind with no filesystem target; an import's
    /// module specifier is a name, not a path, and is deliberately not
    /// reported here.
    pub fn target_path(&self) -> Option<&RelativePath> {
        match self {
            Self::CreateFile { path, .. }
            | Self::AppendToFile { path, .. }
            | Self::PrependToFile { path, .. }
            | Self::MergeStructuredData { path, .. }
            | Self::EnhanceSourceFile { path, .. }
            | Self::MergeConfig { path, .. }
            | Self::WrapConfig { path, .. }
            | Self::ExtendSchema { path, .. } => Some(path),
            Self::InstallPackages { manifest, .. } | Self::AddScript { manifest, .. } => {
                Some(manifest)
            }
            Self::AddEnvVar { file, .. } => Some(file),
            Self::RunCommand { .. } => None,
        }
    }
}

// ── Action ───────────────────────────────────────────────────────────────────

/// One step of a blueprint: a payload plus the fields every kind shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Boolean expression gating this action; absent means "always run".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    /// Explicit conflict policy; absent means the kind's default
    /// (see [`Action::conflict_strategy`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict: Option<ConflictResolution>,

    #[serde(flatten)]
    pub kind: ActionKind,
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            condition: None,
            conflict: None,
            kind,
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_conflict(mut self, conflict: impl Into<ConflictResolution>) -> Self {
        self.conflict = Some(conflict.into());
        self
    }

    /// Effective conflict strategy for this action.
    ///
    /// Mutation kinds default to `error`. `run-command` defaults to `skip`
    /// so an optional install step cannot sink an otherwise-valid blueprint;
    /// set `conflict` explicitly to make a command failure fatal.
    pub fn conflict_strategy(&self) -> ConflictStrategy {
        match self.conflict {
            Some(resolution) => resolution.strategy,
            None => match self.kind {
                ActionKind::RunCommand { .. } => ConflictStrategy::Skip,
                _ => ConflictStrategy::Error,
            },
        }
    }

    /// Array policy to use when conflict resolution retries with a merge.
    pub fn merge_strategy(&self) -> ArrayMergePolicy {
        self.conflict
            .and_then(|c| c.merge_strategy)
            .unwrap_or_default()
    }

    /// Shape checks that deserialization cannot express.
    ///
    /// `index` identifies the action within its blueprint for reporting.
    pub fn validate(&self, index: usize) -> Result<(), DomainError> {
        let fail = |reason: String| DomainError::InvalidAction {
            index,
            kind: self.kind.name().to_owned(),
            reason,
        };

        match &self.kind {
            ActionKind::CreateFile { .. }
            | ActionKind::AppendToFile { .. }
            | ActionKind::PrependToFile { .. } => Ok(()),

            ActionKind::MergeStructuredData { value, .. }
            | ActionKind::MergeConfig { value, .. } => {
                if value.is_object() {
                    Ok(())
                } else {
                    Err(fail("merge value must be a JSON object".into()))
                }
            }

            ActionKind::EnhanceSourceFile { imports, wrap, .. } => {
                if imports.is_empty() && wrap.is_none() {
                    return Err(fail("neither imports nor wrap specified".into()));
                }
                for import in imports {
                    import.validate().map_err(&fail)?;
                }
                if let Some(spec) = wrap {
                    spec.validate().map_err(&fail)?;
                }
                Ok(())
            }

            ActionKind::InstallPackages { packages, .. } => {
                if packages.is_empty() {
                    Err(fail("no packages listed".into()))
                } else {
                    Ok(())
                }
            }

            ActionKind::AddScript { name, command, .. } => {
                if name.trim().is_empty() {
                    Err(fail("script name is empty".into()))
                } else if command.trim().is_empty() {
                    Err(fail(format!("script '{name}' has an empty command")))
                } else {
                    Ok(())
                }
            }

            ActionKind::AddEnvVar { key, .. } => {
                if key.trim().is_empty() {
                    Err(fail("env var key is empty".into()))
                } else if key.contains('=') {
                    Err(fail(format!("env var key '{key}' contains '='")))
                } else {
                    Ok(())
                }
            }

            ActionKind::WrapConfig { wrap, import, .. } => {
                wrap.validate().map_err(&fail)?;
                if let Some(spec) = import {
                    spec.validate().map_err(&fail)?;
                }
                Ok(())
            }

            ActionKind::RunCommand { command, .. } => {
                if command.trim().is_empty() {
                    Err(fail("command is empty".into()))
                } else {
                    Ok(())
                }
            }

            ActionKind::ExtendSchema { definition, .. } => {
                if definition.trim().is_empty() {
                    Err(fail("schema definition is empty".into()))
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl From<ActionKind> for Action {
    fn from(kind: ActionKind) -> Self {
        Self::new(kind)
    }
}
