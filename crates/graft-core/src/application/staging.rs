//! Virtual staging filesystem: a per-execution overlay over the real disk.
//!
//! All reads go through a load-once cache and all writes land in memory;
//! nothing touches disk until [`StagingFs::commit`]. Dropping the staging
//! instance discards every buffered write, which is what makes an aborted
//! execution side-effect-free.
//!
//! The cache is scoped to one instance and one instance serves exactly one
//! execution. It is never shared or reused; a stale cache across executions
//! would break the isolation guarantee.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, trace};

use crate::application::error::ApplicationError;
use crate::application::ports::DiskIo;
use crate::domain::analyzer::Footprint;
use crate::domain::entities::common::{FileState, RelativePath};
use crate::error::GraftResult;

/// One file in the overlay.
#[derive(Debug, Clone)]
struct StagedFile {
    state: FileState,
    dirty: bool,
    loaded_from_disk: bool,
}

/// The staging filesystem for a single blueprint execution.
pub struct StagingFs<'a> {
    disk: &'a dyn DiskIo,
    files: BTreeMap<RelativePath, StagedFile>,
}

impl<'a> StagingFs<'a> {
    pub fn new(disk: &'a dyn DiskIo) -> Self {
        Self {
            disk,
            files: BTreeMap::new(),
        }
    }

    /// Eagerly stage every path in the footprint so later mutation calls
    /// never wait on I/O.
    pub fn preload(&mut self, footprint: &Footprint) -> GraftResult<()> {
        for path in &footprint.required {
            self.read(path)?;
        }
        debug!(files = footprint.required.len(), "staging preloaded");
        Ok(())
    }

    /// Read the staged state of a file, loading from disk exactly once per
    /// execution. Absence is a value ([`FileState::Absent`]), not an error.
    pub fn read(&mut self, path: &RelativePath) -> GraftResult<FileState> {
        if let Some(staged) = self.files.get(path) {
            return Ok(staged.state.clone());
        }
        let state = match self.disk.read(path.as_path())? {
            Some(content) => FileState::Present(content),
            None => FileState::Absent,
        };
        trace!(path = %path, present = state.is_present(), "read-through");
        self.files.insert(
            path.clone(),
            StagedFile {
                state: state.clone(),
                dirty: false,
                loaded_from_disk: true,
            },
        );
        Ok(state)
    }

    /// Replace the staged content and mark it dirty. Does not touch disk.
    pub fn write(&mut self, path: &RelativePath, content: String) {
        let entry = self.files.entry(path.clone()).or_insert(StagedFile {
            state: FileState::Absent,
            dirty: false,
            loaded_from_disk: false,
        });
        entry.state = FileState::Present(content);
        entry.dirty = true;
    }

    /// Staged state first, disk only for paths never staged.
    pub fn exists(&self, path: &RelativePath) -> bool {
        match self.files.get(path) {
            Some(staged) => staged.state.is_present(),
            None => self.disk.exists(path.as_path()),
        }
    }

    /// Paths with buffered writes, in committed (sorted) order.
    pub fn dirty_paths(&self) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|(_, staged)| staged.dirty)
            .map(|(path, _)| path.as_path().to_path_buf())
            .collect()
    }

    /// How many staged files came from disk rather than from writes.
    pub fn loaded_count(&self) -> usize {
        self.files
            .values()
            .filter(|staged| staged.loaded_from_disk)
            .count()
    }

    /// Flush every dirty file to disk, best effort.
    ///
    /// Each write is attempted even when an earlier one failed; the error
    /// carries exactly which paths were written and which were not, since
    /// this is the one point where disk can end up partially modified.
    pub fn commit(&mut self) -> Result<Vec<PathBuf>, ApplicationError> {
        let mut written = Vec::new();
        let mut failed = Vec::new();

        for (path, staged) in &mut self.files {
            if !staged.dirty {
                continue;
            }
            let Some(content) = staged.state.content() else {
                continue;
            };
            match self.disk.write(path.as_path(), content) {
                Ok(()) => {
                    staged.dirty = false;
                    written.push(path.as_path().to_path_buf());
                }
                Err(e) => failed.push((path.as_path().to_path_buf(), e.to_string())),
            }
        }

        if failed.is_empty() {
            debug!(files = written.len(), "commit complete");
            Ok(written)
        } else {
            Err(ApplicationError::CommitPartialFailure { written, failed })
        }
    }
}

impl std::fmt::Debug for StagingFs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagingFs")
            .field("staged", &self.files.len())
            .field("dirty", &self.dirty_paths().len())
            .finish()
    }
}

// ═══════════════════════════════════════════════
//                    TESTS
// ═══════════════════════════════════════════════
