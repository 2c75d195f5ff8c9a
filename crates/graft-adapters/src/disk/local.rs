//! Local disk adapter using std::fs.

use std::io;
use std::path::{Path, PathBuf};

use graft_core::{application::ports::DiskIo, error::GraftResult};
use tracing::debug;

/// Production disk implementation rooted at the project directory.
///
/// All port paths are relative; this adapter joins them onto `root` so the
/// core never sees an absolute path.
#[derive(Debug, Clone)]
pub struct LocalDisk {
    root: PathBuf,
}

impl LocalDisk {
    /// Create a new local disk adapter rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl DiskIo for LocalDisk {
    fn read(&self, path: &Path) -> GraftResult<Option<String>> {
        let full = self.absolute(path);
        match std::fs::read_to_string(&full) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(map_io_error(&full, e, "read file")),
        }
    }

    fn write(&self, path: &Path, content: &str) -> GraftResult<()> {
        let full = self.absolute(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| map_io_error(parent, e, "create directory"))?;
        }
        debug!(path = %full.display(), bytes = content.len(), "writing file");
        std::fs::write(&full, content).map_err(|e| map_io_error(&full, e, "write file"))
    }

    fn exists(&self, path: &Path) -> bool {
        self.absolute(path).exists()
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> graft_core::error::GraftError {
    use graft_core::application::ApplicationError;

    ApplicationError::DiskError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

// ═══════════════════════════════════════════════
//                    TESTS
// ═══════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn disk() -> (tempfile::TempDir, LocalDisk) {
        let dir = tempfile::tempdir().unwrap();
        let disk = LocalDisk::new(dir.path());
        (dir, disk)
    }

    #[test]
    fn read_missing_file_is_none_not_error() {
        let (_dir, disk) = disk();
        assert_eq!(disk.read(Path::new("absent.txt")).unwrap(), None);
    }

    #[test]
    fn write_then_read_round_trips() {
        let (_dir, disk) = disk();
        disk.write(Path::new("file.txt"), "content\n").unwrap();
        assert_eq!(
            disk.read(Path::new("file.txt")).unwrap(),
            Some("content\n".to_string())
        );
        assert!(disk.exists(Path::new("file.txt")));
    }

    #[test]
    fn write_creates_missing_parent_directories() {
        let (dir, disk) = disk();
        disk.write(Path::new("src/app/layout.tsx"), "export {}\n")
            .unwrap();
        assert!(dir.path().join("src/app/layout.tsx").is_file());
    }

    #[test]
    fn paths_resolve_under_the_root() {
        let (dir, disk) = disk();
        disk.write(Path::new("a.txt"), "a").unwrap();
        assert!(dir.path().join("a.txt").is_file());
        assert!(!Path::new("a.txt").exists());
    }
}
