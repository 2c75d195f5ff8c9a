use super::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A filesystem path guaranteed to stay inside the project root.
///
/// Invariants: never absolute, never contains a `..` component. Enforced at
/// construction. Blueprints address files only through this type, so an
/// action can never write outside the directory it is applied to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "PathBuf", into = "PathBuf")]
pub struct RelativePath(PathBuf);

impl RelativePath {
    /// Create a new relative path.
    ///
    /// # Panics
    /// Panics if the path is absolute or escapes the root (use `try_new`
    /// for fallible).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::try_new(path).unwrap_or_else(|e| panic!("invalid RelativePath: {e}"))
    }

    /// Fallible constructor.
    pub fn try_new(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        if path.is_absolute() {
            return Err(DomainError::AbsolutePathNotAllowed {
                path: path.display().to_string(),
            });
        }
        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(DomainError::PathEscapesRoot {
                path: path.display().to_string(),
            });
        }
        Ok(Self(path))
    }

    /// Join a segment, maintaining the invariants.
    pub fn join(&self, segment: impl AsRef<Path>) -> Result<Self, DomainError> {
        Self::try_new(self.0.join(segment.as_ref()))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.to_str().unwrap_or("")
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl From<&str> for RelativePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl TryFrom<PathBuf> for RelativePath {
    type Error = DomainError;

    fn try_from(path: PathBuf) -> Result<Self, Self::Error> {
        Self::try_new(path)
    }
}

impl From<RelativePath> for PathBuf {
    fn from(path: RelativePath) -> Self {
        path.0
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// The content of a file as the mutation engine sees it.
///
/// Absence is a value, not an error: primitives decide for themselves
/// whether a missing file is acceptable (`create` requires it, `append`
/// with a create fallback tolerates it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileState {
    /// The file exists (staged or on disk) with this content.
    Present(String),
    /// The file does not exist.
    Absent,
}

impl FileState {
    /// Borrow the content, or `None` when absent.
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Present(text) => Some(text),
            Self::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Content if present, empty string otherwise.
    ///
    /// Used by primitives with a create fallback.
    pub fn content_or_empty(&self) -> &str {
        self.content().unwrap_or("")
    }
}

impl From<String> for FileState {
    fn from(text: String) -> Self {
        Self::Present(text)
    }
}

impl From<&str> for FileState {
    fn from(text: &str) -> Self {
        Self::Present(text.to_owned())
    }
}

impl From<Option<String>> for FileState {
    fn from(opt: Option<String>) -> Self {
        match opt {
            Some(text) => Self::Present(text),
            None => Self::Absent,
        }
    }
}
