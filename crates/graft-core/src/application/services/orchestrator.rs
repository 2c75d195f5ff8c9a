//! Orchestrator - maps semantic actions onto mutation primitives.
//!
//! One call per action: substitute templates in the action's string fields,
//! dispatch on the action kind to one or more primitives against the
//! staging filesystem, then put any primitive failure through the action's
//! conflict-resolution policy. The dispatch is an exhaustive match, so a
//! new action kind fails to compile until it is handled here.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::application::ports::CommandRequest;
use crate::application::staging::StagingFs;
use crate::domain::entities::action::{Action, ActionKind, ImportSpec, WrapSpec};
use crate::domain::entities::common::{FileState, RelativePath};
use crate::domain::error::DomainError;
use crate::domain::mutate::{self, Rewrite, ScalarPolicy};
use crate::domain::value_objects::{AppendFallback, ArrayMergePolicy, ConflictStrategy};
use crate::domain::{ExecutionContext, template};

/// What applying one action produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A file mutation went through (or was recognized as already done).
    Applied {
        path: RelativePath,
        changed: bool,
        warnings: Vec<String>,
    },
    /// The conflict policy turned a primitive failure into a skip.
    Skipped { reason: String },
    /// A run-command action; the executor forwards it to the process
    /// runner, sequenced like any file action but never staged.
    Deferred(CommandRequest),
}

/// Stateless action dispatcher. Holds only the default timeout handed to
/// deferred commands.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    default_command_timeout: Duration,
}

impl Orchestrator {
    pub fn new(default_command_timeout: Duration) -> Self {
        Self {
            default_command_timeout,
        }
    }

    /// Apply one action against the staging filesystem.
    ///
    /// Errors returned here are fatal for the execution: the conflict
    /// policy has already been consulted.
    pub fn apply(
        &self,
        action: &Action,
        staging: &mut StagingFs<'_>,
        ctx: &ExecutionContext,
    ) -> Result<ActionOutcome, DomainError> {
        let strategy = action.conflict_strategy();
        debug!(kind = action.kind.name(), ?strategy, "dispatching action");

        match &action.kind {
            ActionKind::CreateFile {
                path,
                content,
                overwrite,
            } => {
                let content = template::render(content, ctx)?;
                let state = staging.read(path)?;
                let result = mutate::create(path.as_str(), &state, &content, *overwrite);
                self.resolve(
                    action,
                    staging,
                    path,
                    result,
                    RetryWith::Create { content: &content },
                )
            }

            ActionKind::AppendToFile {
                path,
                content,
                fallback,
            } => {
                let content = template::render(content, ctx)?;
                let state = staging.read(path)?;
                let result = mutate::append(path.as_str(), &state, &content, *fallback);
                self.resolve(
                    action,
                    staging,
                    path,
                    result,
                    RetryWith::Append {
                        content: &content,
                        prepend: false,
                    },
                )
            }

            ActionKind::PrependToFile {
                path,
                content,
                fallback,
            } => {
                let content = template::render(content, ctx)?;
                let state = staging.read(path)?;
                let result = mutate::prepend(path.as_str(), &state, &content, *fallback);
                self.resolve(
                    action,
                    staging,
                    path,
                    result,
                    RetryWith::Append {
                        content: &content,
                        prepend: true,
                    },
                )
            }

            ActionKind::MergeStructuredData {
                path,
                value,
                arrays,
            } => {
                let value = substitute_value(value, ctx)?;
                self.merge_into(action, staging, path, &value, *arrays, false)
            }

            // merge-config differs from merge-structured-data only in that a
            // missing config file starts as an empty document.
            ActionKind::MergeConfig {
                path,
                value,
                arrays,
            } => {
                let value = substitute_value(value, ctx)?;
                self.merge_into(action, staging, path, &value, *arrays, true)
            }

            ActionKind::InstallPackages {
                manifest,
                packages,
                dev,
            } => {
                let section = if *dev {
                    "devDependencies"
                } else {
                    "dependencies"
                };
                let mut versions = serde_json::Map::new();
                for (name, version) in packages {
                    versions.insert(name.clone(), Value::String(template::render(version, ctx)?));
                }
                let incoming = section_document(section, Value::Object(versions));
                self.merge_into(action, staging, manifest, &incoming, action.merge_strategy(), true)
            }

            ActionKind::AddScript {
                manifest,
                name,
                command,
            } => {
                let mut scripts = serde_json::Map::new();
                scripts.insert(name.clone(), Value::String(template::render(command, ctx)?));
                let incoming = section_document("scripts", Value::Object(scripts));
                self.merge_into(action, staging, manifest, &incoming, action.merge_strategy(), true)
            }

            ActionKind::AddEnvVar { file, key, value } => {
                let value = template::render(value, ctx)?;
                let state = staging.read(file)?;
                let result = mutate::append_env_var(file.as_str(), &state, key, &value);
                self.resolve(action, staging, file, result, RetryWith::Nothing)
            }

            ActionKind::EnhanceSourceFile {
                path,
                imports,
                wrap,
            } => self.enhance(action, staging, path, imports, wrap.as_ref(), ctx),

            ActionKind::WrapConfig { path, wrap, import } => {
                let imports: Vec<ImportSpec> = import.iter().cloned().collect();
                self.enhance(action, staging, path, &imports, Some(wrap), ctx)
            }

            ActionKind::ExtendSchema { path, definition } => {
                let definition = template::render(definition, ctx)?;
                let state = staging.read(path)?;
                let result =
                    mutate::append(path.as_str(), &state, &definition, AppendFallback::Create);
                self.resolve(action, staging, path, result, RetryWith::Nothing)
            }

            ActionKind::RunCommand {
                command,
                cwd,
                timeout_secs,
            } => {
                let command = template::render(command, ctx)?;
                Ok(ActionOutcome::Deferred(CommandRequest {
                    command,
                    cwd: cwd.clone(),
                    timeout: timeout_secs
                        .map(Duration::from_secs)
                        .unwrap_or(self.default_command_timeout),
                }))
            }
        }
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    /// Structured merges share one path: substitute, merge, resolve.
    /// The skip strategy flips scalar conflicts to existing-wins instead of
    /// skipping the whole action.
    fn merge_into(
        &self,
        action: &Action,
        staging: &mut StagingFs<'_>,
        path: &RelativePath,
        incoming: &Value,
        arrays: ArrayMergePolicy,
        create_if_absent: bool,
    ) -> Result<ActionOutcome, DomainError> {
        let scalars = match action.conflict_strategy() {
            ConflictStrategy::Skip => ScalarPolicy::ExistingWins,
            _ => ScalarPolicy::IncomingWins,
        };
        let state = staging.read(path)?;
        let result = mutate::deep_merge(
            path.as_str(),
            &state,
            incoming,
            arrays,
            scalars,
            create_if_absent,
        );
        self.resolve(
            action,
            staging,
            path,
            result,
            RetryWith::Merge {
                incoming,
                arrays,
                scalars,
            },
        )
    }

    /// Import injection followed by element wrapping, one staged write.
    fn enhance(
        &self,
        action: &Action,
        staging: &mut StagingFs<'_>,
        path: &RelativePath,
        imports: &[ImportSpec],
        wrap: Option<&WrapSpec>,
        ctx: &ExecutionContext,
    ) -> Result<ActionOutcome, DomainError> {
        let imports: Vec<ImportSpec> = imports
            .iter()
            .map(|spec| {
                Ok(ImportSpec {
                    name: template::render(&spec.name, ctx)?,
                    from: template::render(&spec.from, ctx)?,
                })
            })
            .collect::<Result<_, DomainError>>()?;
        let wrap = wrap
            .map(|spec| {
                Ok::<_, DomainError>(WrapSpec {
                    target: template::render(&spec.target, ctx)?,
                    wrapper: template::render(&spec.wrapper, ctx)?,
                    attributes: spec
                        .attributes
                        .iter()
                        .map(|(key, value)| Ok((key.clone(), template::render(value, ctx)?)))
                        .collect::<Result<_, DomainError>>()?,
                })
            })
            .transpose()?;

        let state = staging.read(path)?;
        let step = mutate::inject_imports(path.as_str(), &state, &imports);
        let mut rewrite = match self.intercept(action, step)? {
            Resolved::Rewrite(rewrite) => rewrite,
            Resolved::Skip(reason) => return Ok(ActionOutcome::Skipped { reason }),
        };

        if let Some(wrap) = wrap {
            let step = mutate::wrap_element(
                path.as_str(),
                &FileState::Present(rewrite.content.clone()),
                &wrap,
            );
            match self.intercept(action, step)? {
                Resolved::Rewrite(wrapped) => {
                    let import_changed = rewrite.changed;
                    let mut warnings = rewrite.warnings;
                    warnings.extend(wrapped.warnings);
                    rewrite = Rewrite {
                        content: wrapped.content,
                        changed: import_changed || wrapped.changed,
                        warnings,
                    };
                }
                Resolved::Skip(reason) => return Ok(ActionOutcome::Skipped { reason }),
            }
        }

        if rewrite.changed {
            staging.write(path, rewrite.content);
        }
        Ok(ActionOutcome::Applied {
            path: path.clone(),
            changed: rewrite.changed,
            warnings: rewrite.warnings,
        })
    }

    /// Put a primitive result through the conflict policy, retrying where
    /// the policy says so, and stage the surviving content.
    fn resolve(
        &self,
        action: &Action,
        staging: &mut StagingFs<'_>,
        path: &RelativePath,
        result: Result<Rewrite, DomainError>,
        retry: RetryWith<'_>,
    ) -> Result<ActionOutcome, DomainError> {
        let rewrite = match result {
            Ok(rewrite) => rewrite,
            Err(error) => match action.conflict_strategy() {
                ConflictStrategy::Error => return Err(error),
                ConflictStrategy::Skip => {
                    return Ok(ActionOutcome::Skipped {
                        reason: error.to_string(),
                    });
                }
                ConflictStrategy::Replace => self.retry_replace(staging, path, &retry, error)?,
                ConflictStrategy::Merge => self.retry_merge(staging, path, &retry, error)?,
            },
        };

        if rewrite.changed {
            staging.write(path, rewrite.content);
        }
        Ok(ActionOutcome::Applied {
            path: path.clone(),
            changed: rewrite.changed,
            warnings: rewrite.warnings,
        })
    }

    /// `replace` re-runs the primitive in overwrite mode: create clobbers,
    /// append and prepend treat the missing file as empty. Primitives with
    /// no overwrite mode keep their original error.
    fn retry_replace(
        &self,
        staging: &mut StagingFs<'_>,
        path: &RelativePath,
        retry: &RetryWith<'_>,
        original: DomainError,
    ) -> Result<Rewrite, DomainError> {
        let state = staging.read(path)?;
        match retry {
            RetryWith::Create { content } => mutate::create(path.as_str(), &state, content, true),
            RetryWith::Append { content, prepend } => {
                if *prepend {
                    mutate::prepend(path.as_str(), &state, content, AppendFallback::Create)
                } else {
                    mutate::append(path.as_str(), &state, content, AppendFallback::Create)
                }
            }
            RetryWith::Merge {
                incoming,
                arrays,
                scalars,
            } => mutate::deep_merge(path.as_str(), &state, incoming, *arrays, *scalars, true),
            RetryWith::Nothing => Err(original),
        }
    }

    /// `merge` retries with the merge primitive even for simpler kinds; a
    /// create whose content is JSON merges into the existing document.
    fn retry_merge(
        &self,
        staging: &mut StagingFs<'_>,
        path: &RelativePath,
        retry: &RetryWith<'_>,
        original: DomainError,
    ) -> Result<Rewrite, DomainError> {
        let state = staging.read(path)?;
        match retry {
            RetryWith::Create { content } => {
                let incoming: Value =
                    serde_json::from_str(content).map_err(|e| DomainError::ParseError {
                        path: path.as_str().to_string(),
                        reason: format!("merge fallback needs JSON content: {e}"),
                    })?;
                mutate::deep_merge(
                    path.as_str(),
                    &state,
                    &incoming,
                    ArrayMergePolicy::default(),
                    ScalarPolicy::IncomingWins,
                    true,
                )
            }
            RetryWith::Merge {
                incoming,
                arrays,
                scalars,
            } => mutate::deep_merge(path.as_str(), &state, incoming, *arrays, *scalars, true),
            RetryWith::Append { content, prepend } => {
                if *prepend {
                    mutate::prepend(path.as_str(), &state, content, AppendFallback::Create)
                } else {
                    mutate::append(path.as_str(), &state, content, AppendFallback::Create)
                }
            }
            RetryWith::Nothing => Err(original),
        }
    }

    /// Like [`Self::resolve`] but for intermediate steps of a multi-step
    /// action, where the caller stages the final content itself.
    fn intercept(
        &self,
        action: &Action,
        result: Result<Rewrite, DomainError>,
    ) -> Result<Resolved, DomainError> {
        match result {
            Ok(rewrite) => Ok(Resolved::Rewrite(rewrite)),
            Err(error) => match action.conflict_strategy() {
                ConflictStrategy::Skip => Ok(Resolved::Skip(error.to_string())),
                // Source edits have no overwrite or merge mode to fall
                // back to.
                _ => Err(error),
            },
        }
    }
}

/// How to re-run an action's primitive when the policy asks for a retry.
enum RetryWith<'a> {
    Create {
        content: &'a str,
    },
    Append {
        content: &'a str,
        prepend: bool,
    },
    Merge {
        incoming: &'a Value,
        arrays: ArrayMergePolicy,
        scalars: ScalarPolicy,
    },
    Nothing,
}

enum Resolved {
    Rewrite(Rewrite),
    Skip(String),
}

/// A one-section manifest fragment, e.g. `{"scripts": {...}}`.
fn section_document(section: &str, body: Value) -> Value {
    let mut doc = serde_json::Map::new();
    doc.insert(section.to_string(), body);
    Value::Object(doc)
}

/// Substitute template placeholders in every string leaf of a JSON value.
fn substitute_value(value: &Value, ctx: &ExecutionContext) -> Result<Value, DomainError> {
    Ok(match value {
        Value::String(s) => Value::String(template::render(s, ctx)?),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| substitute_value(item, ctx))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key.clone(), substitute_value(item, ctx)?);
            }
            Value::Object(out)
        }
        other => other.clone(),
    })
}

// ═══════════════════════════════════════════════
//                    TESTS
// ═══════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::output::MockDiskIo;
    use crate::domain::entities::action::ConflictResolution;
    use serde_json::json;

    fn blank_disk() -> MockDiskIo {
        let mut disk = MockDiskIo::new();
        disk.expect_read().returning(|_| Ok(None));
        disk
    }

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(Duration::from_secs(60))
    }

    fn rp(path: &str) -> RelativePath {
        RelativePath::from(path)
    }

    fn applied_content(staging: &mut StagingFs<'_>, path: &str) -> String {
        staging
            .read(&rp(path))
            .unwrap()
            .content()
            .expect("file should be staged")
            .to_string()
    }

    // ── create ──

    #[test]
    fn create_stages_new_file() {
        let disk = blank_disk();
        let mut staging = StagingFs::new(&disk);
        let action = Action::new(ActionKind::CreateFile {
            path: rp("src/index.ts"),
            content: "export {};\n".into(),
            overwrite: false,
        });

        let outcome = orchestrator().apply(&action, &mut staging, &ExecutionContext::new());
        match outcome.unwrap() {
            ActionOutcome::Applied { path, changed, .. } => {
                assert_eq!(path, rp("src/index.ts"));
                assert!(changed);
            }
            other => panic!("expected Applied, got {other:?}"),
        }
        assert_eq!(applied_content(&mut staging, "src/index.ts"), "export {};\n");
    }

    #[test]
    fn create_conflict_defaults_to_error() {
        let disk = blank_disk();
        let mut staging = StagingFs::new(&disk);
        staging.write(&rp("a.txt"), "old".into());

        let action = Action::new(ActionKind::CreateFile {
            path: rp("a.txt"),
            content: "new".into(),
            overwrite: false,
        });
        let err = orchestrator()
            .apply(&action, &mut staging, &ExecutionContext::new())
            .unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists { .. }));
        assert_eq!(applied_content(&mut staging, "a.txt"), "old");
    }

    #[test]
    fn create_conflict_skip_keeps_existing() {
        let disk = blank_disk();
        let mut staging = StagingFs::new(&disk);
        staging.write(&rp("a.txt"), "old".into());

        let action = Action::new(ActionKind::CreateFile {
            path: rp("a.txt"),
            content: "new".into(),
            overwrite: false,
        })
        .with_conflict(ConflictResolution::from(ConflictStrategy::Skip));
        let outcome = orchestrator()
            .apply(&action, &mut staging, &ExecutionContext::new())
            .unwrap();
        assert!(matches!(outcome, ActionOutcome::Skipped { .. }));
        assert_eq!(applied_content(&mut staging, "a.txt"), "old");
    }

    #[test]
    fn create_conflict_replace_overwrites() {
        let disk = blank_disk();
        let mut staging = StagingFs::new(&disk);
        staging.write(&rp("a.txt"), "old".into());

        let action = Action::new(ActionKind::CreateFile {
            path: rp("a.txt"),
            content: "new".into(),
            overwrite: false,
        })
        .with_conflict(ConflictResolution::from(ConflictStrategy::Replace));
        orchestrator()
            .apply(&action, &mut staging, &ExecutionContext::new())
            .unwrap();
        assert_eq!(applied_content(&mut staging, "a.txt"), "new");
    }

    #[test]
    fn create_conflict_merge_merges_json_content() {
        let disk = blank_disk();
        let mut staging = StagingFs::new(&disk);
        staging.write(&rp("cfg.json"), "{\n  \"a\": 1\n}\n".into());

        let action = Action::new(ActionKind::CreateFile {
            path: rp("cfg.json"),
            content: "{\"b\": 2}".into(),
            overwrite: false,
        })
        .with_conflict(ConflictResolution::from(ConflictStrategy::Merge));
        orchestrator()
            .apply(&action, &mut staging, &ExecutionContext::new())
            .unwrap();
        let merged: Value =
            serde_json::from_str(&applied_content(&mut staging, "cfg.json")).unwrap();
        assert_eq!(merged, json!({"a": 1, "b": 2}));
    }

    // ── manifest kinds compile to merges ──

    #[test]
    fn install_packages_merges_into_manifest() {
        let disk = blank_disk();
        let mut staging = StagingFs::new(&disk);
        staging.write(&rp("package.json"), "{\"name\": \"app\"}".into());

        let action = Action::new(ActionKind::InstallPackages {
            manifest: rp("package.json"),
            packages: [("react".to_string(), "^19.0.0".to_string())].into(),
            dev: false,
        });
        orchestrator()
            .apply(&action, &mut staging, &ExecutionContext::new())
            .unwrap();
        let manifest: Value =
            serde_json::from_str(&applied_content(&mut staging, "package.json")).unwrap();
        assert_eq!(
            manifest,
            json!({"name": "app", "dependencies": {"react": "^19.0.0"}})
        );
    }

    #[test]
    fn dev_packages_land_in_dev_dependencies() {
        let disk = blank_disk();
        let mut staging = StagingFs::new(&disk);

        let action = Action::new(ActionKind::InstallPackages {
            manifest: rp("package.json"),
            packages: [("vitest".to_string(), "^3.0.0".to_string())].into(),
            dev: true,
        });
        orchestrator()
            .apply(&action, &mut staging, &ExecutionContext::new())
            .unwrap();
        let manifest: Value =
            serde_json::from_str(&applied_content(&mut staging, "package.json")).unwrap();
        assert_eq!(manifest, json!({"devDependencies": {"vitest": "^3.0.0"}}));
    }

    #[test]
    fn add_script_merges_scripts_section() {
        let disk = blank_disk();
        let mut staging = StagingFs::new(&disk);
        staging.write(
            &rp("package.json"),
            "{\"scripts\": {\"build\": \"vite build\"}}".into(),
        );

        let action = Action::new(ActionKind::AddScript {
            manifest: rp("package.json"),
            name: "test".into(),
            command: "vitest run".into(),
        });
        orchestrator()
            .apply(&action, &mut staging, &ExecutionContext::new())
            .unwrap();
        let manifest: Value =
            serde_json::from_str(&applied_content(&mut staging, "package.json")).unwrap();
        assert_eq!(
            manifest,
            json!({"scripts": {"build": "vite build", "test": "vitest run"}})
        );
    }

    // ── merge kinds ──

    #[test]
    fn merge_structured_data_requires_the_file() {
        let disk = blank_disk();
        let mut staging = StagingFs::new(&disk);
        let action = Action::new(ActionKind::MergeStructuredData {
            path: rp("tsconfig.json"),
            value: json!({"compilerOptions": {"strict": true}}),
            arrays: ArrayMergePolicy::Concat,
        });
        let err = orchestrator()
            .apply(&action, &mut staging, &ExecutionContext::new())
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[test]
    fn merge_config_creates_missing_file() {
        let disk = blank_disk();
        let mut staging = StagingFs::new(&disk);
        let action = Action::new(ActionKind::MergeConfig {
            path: rp(".prettierrc"),
            value: json!({"semi": false}),
            arrays: ArrayMergePolicy::Concat,
        });
        orchestrator()
            .apply(&action, &mut staging, &ExecutionContext::new())
            .unwrap();
        let config: Value =
            serde_json::from_str(&applied_content(&mut staging, ".prettierrc")).unwrap();
        assert_eq!(config, json!({"semi": false}));
    }

    #[test]
    fn skip_strategy_makes_existing_values_win_in_merges() {
        let disk = blank_disk();
        let mut staging = StagingFs::new(&disk);
        staging.write(&rp("cfg.json"), "{\"port\": 3000}".into());

        let action = Action::new(ActionKind::MergeConfig {
            path: rp("cfg.json"),
            value: json!({"port": 8080, "host": "0.0.0.0"}),
            arrays: ArrayMergePolicy::Concat,
        })
        .with_conflict(ConflictResolution::from(ConflictStrategy::Skip));
        orchestrator()
            .apply(&action, &mut staging, &ExecutionContext::new())
            .unwrap();
        let config: Value =
            serde_json::from_str(&applied_content(&mut staging, "cfg.json")).unwrap();
        assert_eq!(config, json!({"port": 3000, "host": "0.0.0.0"}));
    }

    // ── env vars ──

    #[test]
    fn add_env_var_dedups_by_key() {
        let disk = blank_disk();
        let mut staging = StagingFs::new(&disk);
        let ctx = ExecutionContext::new();

        let first = Action::new(ActionKind::AddEnvVar {
            file: rp(".env"),
            key: "API_URL".into(),
            value: "v1".into(),
        });
        let second = Action::new(ActionKind::AddEnvVar {
            file: rp(".env"),
            key: "API_URL".into(),
            value: "v2".into(),
        });
        let orch = orchestrator();
        orch.apply(&first, &mut staging, &ctx).unwrap();
        orch.apply(&second, &mut staging, &ctx).unwrap();
        assert_eq!(applied_content(&mut staging, ".env"), "API_URL=v2\n");
    }

    // ── enhance ──

    #[test]
    fn enhance_injects_imports_and_wraps() {
        let disk = blank_disk();
        let mut staging = StagingFs::new(&disk);
        staging.write(
            &rp("src/main.tsx"),
            "import React from \"react\";\n\nrender(<App />);\n".into(),
        );

        let action = Action::new(ActionKind::EnhanceSourceFile {
            path: rp("src/main.tsx"),
            imports: vec![ImportSpec::new("Suspense", "react")],
            wrap: Some(WrapSpec::new("App", "Suspense")),
        });
        let outcome = orchestrator()
            .apply(&action, &mut staging, &ExecutionContext::new())
            .unwrap();
        match outcome {
            ActionOutcome::Applied {
                changed, warnings, ..
            } => {
                assert!(changed);
                assert!(warnings.is_empty());
            }
            other => panic!("expected Applied, got {other:?}"),
        }
        assert_eq!(
            applied_content(&mut staging, "src/main.tsx"),
            "import React, { Suspense } from \"react\";\n\nrender(<Suspense><App /></Suspense>);\n"
        );
    }

    #[test]
    fn enhance_wrap_without_target_is_a_warning() {
        let disk = blank_disk();
        let mut staging = StagingFs::new(&disk);
        staging.write(&rp("src/main.tsx"), "console.log(1);\n".into());

        let action = Action::new(ActionKind::EnhanceSourceFile {
            path: rp("src/main.tsx"),
            imports: vec![ImportSpec::new("Suspense", "react")],
            wrap: Some(WrapSpec::new("App", "Suspense")),
        });
        let outcome = orchestrator()
            .apply(&action, &mut staging, &ExecutionContext::new())
            .unwrap();
        match outcome {
            ActionOutcome::Applied {
                changed, warnings, ..
            } => {
                // import landed, wrap warned
                assert!(changed);
                assert_eq!(warnings.len(), 1);
            }
            other => panic!("expected Applied, got {other:?}"),
        }
    }

    // ── run-command ──

    #[test]
    fn run_command_defers_with_default_timeout() {
        let disk = blank_disk();
        let mut staging = StagingFs::new(&disk);
        let ctx = ExecutionContext::new().with_value("project.name", json!("shop"));

        let action = Action::new(ActionKind::RunCommand {
            command: "npm install {{project.name}}".into(),
            cwd: Some(rp("web")),
            timeout_secs: None,
        });
        let outcome = orchestrator().apply(&action, &mut staging, &ctx).unwrap();
        match outcome {
            ActionOutcome::Deferred(request) => {
                assert_eq!(request.command, "npm install shop");
                assert_eq!(request.cwd, Some(rp("web")));
                assert_eq!(request.timeout, Duration::from_secs(60));
            }
            other => panic!("expected Deferred, got {other:?}"),
        }
    }

    #[test]
    fn run_command_timeout_override() {
        let disk = blank_disk();
        let mut staging = StagingFs::new(&disk);
        let action = Action::new(ActionKind::RunCommand {
            command: "cargo build".into(),
            cwd: None,
            timeout_secs: Some(900),
        });
        let outcome = orchestrator()
            .apply(&action, &mut staging, &ExecutionContext::new())
            .unwrap();
        match outcome {
            ActionOutcome::Deferred(request) => {
                assert_eq!(request.timeout, Duration::from_secs(900));
            }
            other => panic!("expected Deferred, got {other:?}"),
        }
    }

    // ── substitution ──

    #[test]
    fn template_substitution_covers_content_and_values() {
        let disk = blank_disk();
        let mut staging = StagingFs::new(&disk);
        let ctx = ExecutionContext::new()
            .with_value("project.name", json!("shop"))
            .with_value("versions.react", json!("^19.0.0"));

        let create = Action::new(ActionKind::CreateFile {
            path: rp("README.md"),
            content: "# {{project.name}}\n".into(),
            overwrite: false,
        });
        let install = Action::new(ActionKind::InstallPackages {
            manifest: rp("package.json"),
            packages: [("react".to_string(), "{{versions.react}}".to_string())].into(),
            dev: false,
        });
        let orch = orchestrator();
        orch.apply(&create, &mut staging, &ctx).unwrap();
        orch.apply(&install, &mut staging, &ctx).unwrap();

        assert_eq!(applied_content(&mut staging, "README.md"), "# shop\n");
        let manifest: Value =
            serde_json::from_str(&applied_content(&mut staging, "package.json")).unwrap();
        assert_eq!(manifest["dependencies"]["react"], json!("^19.0.0"));
    }

    #[test]
    fn malformed_template_fails_the_action() {
        let disk = blank_disk();
        let mut staging = StagingFs::new(&disk);
        let action = Action::new(ActionKind::CreateFile {
            path: rp("x.txt"),
            content: "{{#if project.name}}unclosed".into(),
            overwrite: false,
        });
        let err = orchestrator()
            .apply(&action, &mut staging, &ExecutionContext::new())
            .unwrap_err();
        assert!(matches!(err, DomainError::TemplateSyntax { .. }));
    }
}
