//! Primitive mutation engine: pure content-in/content-out transforms.
//!
//! Every primitive takes the current [`FileState`] and produces a
//! [`Rewrite`] or a typed [`DomainError`]. Primitives know nothing about
//! blueprints, staging, or conflict policy — the orchestrator owns those.
//! Because they are pure, each one is unit-tested exhaustively right here
//! in the domain layer with no fixtures or I/O.
//!
//! [`FileState`]: crate::domain::entities::common::FileState
//! [`DomainError`]: crate::domain::error::DomainError

mod merge;
mod source;
mod text;

pub use merge::{ScalarPolicy, deep_merge};
pub use source::{inject_imports, wrap_element};
pub use text::{append, append_env_var, create, prepend};

/// The outcome of one primitive application.
///
/// `changed: false` means the primitive recognized its work as already done
/// (duplicate append, import already present, wrap target missing) and
/// returned the input untouched — byte-identical, so re-running a blueprint
/// cannot churn files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub content: String,
    pub changed: bool,
    pub warnings: Vec<String>,
}

impl Rewrite {
    pub fn changed(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            changed: true,
            warnings: Vec::new(),
        }
    }

    pub fn unchanged(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            changed: false,
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}
