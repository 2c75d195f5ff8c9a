//! Application layer errors.
//!
//! These errors represent failures in orchestration, staging, and external
//! collaborators, not business logic. Business logic errors are
//! `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;
use crate::error::ErrorCategory;

/// Errors that occur while driving a blueprint execution.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// One action failed fatally; the execution aborted before commit.
    #[error("Action {index} ({kind}) of blueprint '{blueprint}' failed: {source}")]
    ActionFailed {
        blueprint: String,
        index: usize,
        kind: String,
        #[source]
        source: DomainError,
    },

    /// Commit wrote some files and failed on others. The only state in
    /// which disk may be inconsistent.
    #[error(
        "Commit partially failed: {} written, {} failed",
        written.len(),
        failed.len()
    )]
    CommitPartialFailure {
        written: Vec<PathBuf>,
        failed: Vec<(PathBuf, String)>,
    },

    /// Disk read or write failed outside of commit.
    #[error("Disk error at {path}: {reason}")]
    DiskError { path: PathBuf, reason: String },

    /// Shared in-memory disk state was poisoned.
    #[error("Disk state lock error")]
    DiskLockError,

    /// An external command exceeded its timeout.
    #[error("Command '{command}' timed out after {timeout_secs}s")]
    ProcessTimeout { command: String, timeout_secs: u64 },

    /// An external command exited non-zero.
    #[error("Command '{command}' exited with status {code}")]
    ProcessNonZeroExit {
        command: String,
        code: i32,
        stderr: String,
    },

    /// The process runner could not spawn the command at all.
    #[error("Failed to spawn '{command}': {reason}")]
    ProcessSpawnFailed { command: String, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ActionFailed {
                blueprint,
                index,
                kind,
                source,
            } => {
                let mut suggestions = vec![format!(
                    "Blueprint '{}' stopped at action {} ({})",
                    blueprint, index, kind
                )];
                suggestions.extend(source.suggestions());
                suggestions.push("No files were written; the project is unchanged".into());
                suggestions
            }
            Self::CommitPartialFailure { written, failed } => {
                let mut suggestions = vec![
                    "The project is partially modified".into(),
                    format!("Written: {}", join_paths(written)),
                ];
                for (path, reason) in failed {
                    suggestions.push(format!("Failed: {} ({})", path.display(), reason));
                }
                suggestions.push("Fix the failing paths and re-run".into());
                suggestions.push(
                    "Already-written files conflict with create actions unless their policy is 'skip'".into(),
                );
                suggestions
            }
            Self::DiskError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have read and write permissions".into(),
                "Ensure the project root exists".into(),
            ],
            Self::DiskLockError => vec![
                "The in-memory disk state is poisoned".into(),
                "Try again in a moment".into(),
            ],
            Self::ProcessTimeout { command, .. } => vec![
                format!("'{}' did not finish in time", command),
                "Increase the timeout with --timeout or timeout_secs on the action".into(),
                "Or re-run the command manually after this finishes".into(),
            ],
            Self::ProcessNonZeroExit { stderr, .. } => {
                let mut suggestions = vec!["The command failed; its stderr follows".into()];
                if !stderr.trim().is_empty() {
                    suggestions.push(stderr.trim().to_string());
                }
                suggestions
            }
            Self::ProcessSpawnFailed { command, .. } => vec![
                format!("Could not start '{}'", command),
                "Check that the program is installed and on PATH".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ActionFailed { source, .. } => match source.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Conflict => ErrorCategory::Conflict,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::CommitPartialFailure { .. } => ErrorCategory::Internal,
            Self::DiskError { .. } | Self::DiskLockError => ErrorCategory::Internal,
            Self::ProcessTimeout { .. }
            | Self::ProcessNonZeroExit { .. }
            | Self::ProcessSpawnFailed { .. } => ErrorCategory::Internal,
        }
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "none".into();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
