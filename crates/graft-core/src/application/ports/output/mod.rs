//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `graft-adapters` crate provides implementations.

use std::path::Path;
use std::time::Duration;

use crate::domain::RelativePath;
use crate::error::GraftResult;

/// Port for raw disk access.
///
/// Implemented by:
/// - `graft_adapters::disk::LocalDisk` (production)
/// - `graft_adapters::disk::MemoryDisk` (testing)
///
/// ## Design Notes
///
/// - The staging filesystem is the only component that calls this during
///   an execution; everything else sees staged state.
/// - `read` reports a missing file as `Ok(None)`, never as an error —
///   callers decide whether absence matters.
/// - Paths are resolved against the adapter's root, so the core only ever
///   hands over relative paths.
#[cfg_attr(test, mockall::automock)]
pub trait DiskIo: Send + Sync {
    /// Read a file as UTF-8 text. `Ok(None)` when the file does not exist.
    fn read(&self, path: &Path) -> GraftResult<Option<String>>;

    /// Write content, creating parent directories as needed.
    fn write(&self, path: &Path, content: &str) -> GraftResult<()>;

    /// Check if the path exists on disk.
    fn exists(&self, path: &Path) -> bool;
}

/// Port for executing external commands.
///
/// Implemented by:
/// - `graft_adapters::process::ShellRunner` (production)
/// - `graft_adapters::process::RecordingRunner` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait ProcessRunner: Send + Sync {
    /// Run a command to completion, or fail with `ProcessTimeout` /
    /// `ProcessSpawnFailed`. A non-zero exit is NOT an error here; the
    /// executor decides what to make of the exit code.
    fn run(&self, request: &CommandRequest) -> GraftResult<CommandOutput>;
}

/// A deferred side-effect request produced by a run-command action.
///
/// Sequenced like any other action but never staged: the executor forwards
/// it straight to the [`ProcessRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    /// Shell command line, already template-substituted.
    pub command: String,
    /// Working directory relative to the project root.
    pub cwd: Option<RelativePath>,
    pub timeout: Duration,
}

/// What came back from running a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
