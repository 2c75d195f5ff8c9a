//! Blueprint Executor - the application's entry point.
//!
//! Drives one blueprint through the state machine
//! `Initialized -> Analyzing -> Staging -> Running(i) -> Committing ->
//! {Committed | Aborted}`:
//! 1. Validate the blueprint
//! 2. Analyze its footprint
//! 3. Preload the staging filesystem
//! 4. Run actions in order (condition gate, then orchestrator dispatch)
//! 5. Commit the staged writes, or abort with disk untouched
//!
//! It implements the driving port (incoming) and uses driven ports (outgoing).

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::application::error::ApplicationError;
use crate::application::ports::{CommandRequest, DiskIo, ProcessRunner};
use crate::application::services::orchestrator::{ActionOutcome, Orchestrator};
use crate::application::staging::StagingFs;
use crate::domain::entities::blueprint::Blueprint;
use crate::domain::value_objects::ConflictStrategy;
use crate::domain::{ExecutionContext, analyze, condition};
use crate::error::{GraftError, GraftResult};

/// Commands get this long unless the action or caller says otherwise.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

/// Knobs for one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Stage everything, commit nothing, run no commands.
    pub dry_run: bool,
    /// Timeout for run-command actions without their own `timeout_secs`.
    pub command_timeout: Duration,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

/// Where the execution state machine currently is (or stopped).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Initialized,
    Analyzing,
    Staging,
    Running(usize),
    Committing,
    Committed,
    Aborted,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized => write!(f, "initialized"),
            Self::Analyzing => write!(f, "analyzing"),
            Self::Staging => write!(f, "staging"),
            Self::Running(i) => write!(f, "running action {i}"),
            Self::Committing => write!(f, "committing"),
            Self::Committed => write!(f, "committed"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// The outcome of one blueprint execution.
///
/// `errors` is fatal and `warnings` is not; a partial commit is the one
/// state where `success: false` coexists with files on disk, and it is
/// distinguishable by `phase` staying at `Committing`.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    pub blueprint_id: String,
    pub success: bool,
    pub dry_run: bool,
    pub phase: Phase,
    /// One entry per successfully applied file action, in order, duplicates
    /// preserved.
    pub files_touched: Vec<PathBuf>,
    /// Paths actually written at commit (or that a commit would write,
    /// under dry-run).
    pub files_written: Vec<PathBuf>,
    /// Commands executed (or that would execute, under dry-run).
    pub commands: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub actions_applied: usize,
    pub actions_skipped: usize,
    /// Structured form of the first fatal error, for callers that need
    /// more than display text.
    #[serde(skip)]
    pub failure: Option<GraftError>,
}

impl ExecutionReport {
    fn new(blueprint_id: &str, dry_run: bool) -> Self {
        Self {
            blueprint_id: blueprint_id.to_string(),
            success: false,
            dry_run,
            phase: Phase::Initialized,
            files_touched: Vec::new(),
            files_written: Vec::new(),
            commands: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            actions_applied: 0,
            actions_skipped: 0,
            failure: None,
        }
    }

    fn abort(mut self, error: GraftError) -> Self {
        self.errors.push(error.to_string());
        self.failure = Some(error);
        self.phase = Phase::Aborted;
        self.success = false;
        self
    }

    /// Disk may hold a subset of the staged writes.
    pub fn is_partial_commit(&self) -> bool {
        matches!(
            self.failure,
            Some(GraftError::Application(
                ApplicationError::CommitPartialFailure { .. }
            ))
        )
    }
}

/// Main execution service.
///
/// Owns the driven ports; everything per-execution (staging, orchestrator)
/// is constructed inside [`Self::execute`] so state never leaks between
/// blueprints.
pub struct BlueprintExecutor {
    disk: Box<dyn DiskIo>,
    runner: Box<dyn ProcessRunner>,
}

impl BlueprintExecutor {
    /// Create a new executor with the given adapters.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use graft_core::prelude::*;
    ///
    /// let executor = BlueprintExecutor::new(
    ///     disk,   // impl DiskIo
    ///     runner, // impl ProcessRunner
    /// );
    /// ```
    pub fn new(disk: Box<dyn DiskIo>, runner: Box<dyn ProcessRunner>) -> Self {
        Self { disk, runner }
    }

    /// Execute a blueprint against the project.
    ///
    /// Fatal failures land in the returned report (`success: false`), not
    /// in `Err`; `Err` is reserved for a blueprint that fails validation
    /// before anything runs.
    #[instrument(
        skip_all,
        fields(
            blueprint = %blueprint.id,
            actions = blueprint.actions.len(),
            dry_run = options.dry_run
        )
    )]
    pub fn execute(
        &self,
        blueprint: &Blueprint,
        ctx: &ExecutionContext,
        options: ExecuteOptions,
    ) -> GraftResult<ExecutionReport> {
        blueprint.validate()?;
        info!(name = %blueprint.name, "executing blueprint");

        let mut report = ExecutionReport::new(&blueprint.id, options.dry_run);

        // 1. Analyze
        report.phase = Phase::Analyzing;
        let footprint = analyze(blueprint);
        debug!(files = footprint.len(), "footprint analyzed");

        // 2. Preload staging
        report.phase = Phase::Staging;
        let mut staging = StagingFs::new(self.disk.as_ref());
        if let Err(e) = staging.preload(&footprint) {
            warn!(error = %e, "preload failed");
            return Ok(report.abort(e));
        }

        // 3. Run actions
        let orchestrator = Orchestrator::new(options.command_timeout);
        for (index, action) in blueprint.actions.iter().enumerate() {
            report.phase = Phase::Running(index);

            if let Some(expr) = &action.condition {
                match condition::evaluate(expr, ctx) {
                    Ok(true) => {}
                    Ok(false) => {
                        debug!(index, expr, "condition false, action skipped");
                        report.actions_skipped += 1;
                        continue;
                    }
                    Err(e) => {
                        return Ok(report.abort(
                            ApplicationError::ActionFailed {
                                blueprint: blueprint.id.clone(),
                                index,
                                kind: action.kind.name().to_string(),
                                source: e,
                            }
                            .into(),
                        ));
                    }
                }
            }

            match orchestrator.apply(action, &mut staging, ctx) {
                Ok(ActionOutcome::Applied {
                    path,
                    changed,
                    warnings,
                }) => {
                    debug!(index, path = %path, changed, "action applied");
                    report.files_touched.push(path.into_path_buf());
                    report.warnings.extend(warnings);
                    report.actions_applied += 1;
                }
                Ok(ActionOutcome::Skipped { reason }) => {
                    report
                        .warnings
                        .push(format!("action {index} ({}) skipped: {reason}", action.kind.name()));
                    report.actions_skipped += 1;
                }
                Ok(ActionOutcome::Deferred(request)) => {
                    if options.dry_run {
                        report.commands.push(request.command);
                        report.actions_applied += 1;
                        continue;
                    }
                    match self.run_deferred(&request) {
                        Ok(()) => {
                            report.commands.push(request.command);
                            report.actions_applied += 1;
                        }
                        Err(e) => match action.conflict_strategy() {
                            ConflictStrategy::Error => {
                                report.errors.push(format!(
                                    "action {index} ({}): {e}",
                                    action.kind.name()
                                ));
                                report.failure = Some(e.into());
                                report.phase = Phase::Aborted;
                                return Ok(report);
                            }
                            // Commands have nothing to overwrite or merge;
                            // every non-error strategy degrades to skip.
                            _ => {
                                report.warnings.push(format!(
                                    "action {index} ({}) skipped: {e}",
                                    action.kind.name()
                                ));
                                report.actions_skipped += 1;
                            }
                        },
                    }
                }
                Err(e) => {
                    warn!(index, error = %e, "action failed, aborting");
                    return Ok(report.abort(
                        ApplicationError::ActionFailed {
                            blueprint: blueprint.id.clone(),
                            index,
                            kind: action.kind.name().to_string(),
                            source: e,
                        }
                        .into(),
                    ));
                }
            }
        }

        // 4. Commit
        report.phase = Phase::Committing;
        if options.dry_run {
            report.files_written = staging.dirty_paths();
            report.phase = Phase::Committed;
            report.success = true;
            info!(
                would_write = report.files_written.len(),
                "dry run complete"
            );
            return Ok(report);
        }
        match staging.commit() {
            Ok(written) => {
                info!(files = written.len(), "blueprint committed");
                report.files_written = written;
                report.phase = Phase::Committed;
                report.success = true;
            }
            Err(e) => {
                warn!(error = %e, "commit failed part-way");
                if let ApplicationError::CommitPartialFailure { written, .. } = &e {
                    report.files_written = written.clone();
                }
                report.errors.push(e.to_string());
                report.failure = Some(e.into());
                // phase stays at Committing: this is not a clean abort,
                // disk holds the written subset.
            }
        }
        Ok(report)
    }

    /// Forward a deferred command to the process runner and normalize the
    /// result: non-zero exit becomes an error here.
    fn run_deferred(&self, request: &CommandRequest) -> Result<(), ApplicationError> {
        info!(command = %request.command, "running command");
        let output = match self.runner.run(request) {
            Ok(output) => output,
            Err(GraftError::Application(e)) => return Err(e),
            Err(other) => {
                return Err(ApplicationError::ProcessSpawnFailed {
                    command: request.command.clone(),
                    reason: other.to_string(),
                });
            }
        };
        if output.success() {
            Ok(())
        } else {
            Err(ApplicationError::ProcessNonZeroExit {
                command: request.command.clone(),
                code: output.exit_code,
                stderr: output.stderr,
            })
        }
    }
}

// ═══════════════════════════════════════════════
//                    TESTS
// ═══════════════════════════════════════════════
