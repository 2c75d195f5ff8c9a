//! In-memory disk adapter for testing.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use graft_core::application::ports::DiskIo;

/// In-memory disk for testing.
///
/// Clones share state, so a test can hold one handle while the executor
/// owns another.
#[derive(Debug, Clone)]
pub struct MemoryDisk {
    inner: Arc<RwLock<MemoryDiskInner>>,
}

#[derive(Debug, Default)]
struct MemoryDiskInner {
    files: BTreeMap<PathBuf, String>,
    failing: BTreeSet<PathBuf>,
}

impl MemoryDisk {
    /// Create a new empty memory disk.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryDiskInner::default())),
        }
    }

    /// Put a file on the disk without going through the port.
    pub fn seed(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        let mut inner = self.inner.write().unwrap();
        inner.files.insert(path.into(), content.into());
    }

    /// Make every write to `path` fail, for commit failure tests.
    pub fn fail_writes_on(&self, path: impl Into<PathBuf>) {
        let mut inner = self.inner.write().unwrap();
        inner.failing.insert(path.into());
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: &Path) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path).cloned()
    }

    /// List all files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        let inner = self.inner.read().unwrap();
        inner.files.keys().cloned().collect()
    }

    /// Clear all contents.
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.files.clear();
        inner.failing.clear();
    }
}

impl Default for MemoryDisk {
    fn default() -> Self {
        Self::new()
    }
}

impl DiskIo for MemoryDisk {
    fn read(&self, path: &Path) -> graft_core::error::GraftResult<Option<String>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| graft_core::application::ApplicationError::DiskLockError)?;
        Ok(inner.files.get(path).cloned())
    }

    fn write(&self, path: &Path, content: &str) -> graft_core::error::GraftResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| graft_core::application::ApplicationError::DiskLockError)?;

        if inner.failing.contains(path) {
            return Err(graft_core::application::ApplicationError::DiskError {
                path: path.to_path_buf(),
                reason: "Write refused by test configuration".into(),
            }
            .into());
        }

        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let inner = self.inner.read().unwrap();
        inner.files.contains_key(path)
    }
}

// ═══════════════════════════════════════════════
//                    TESTS
// ═══════════════════════════════════════════════
