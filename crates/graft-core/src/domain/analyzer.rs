//! Pre-flight analysis: which files will an execution touch?
//!
//! Works off the blueprint's static shape only. Conditions are not
//! evaluated here, so a conditionally skipped action still contributes its
//! target; staging a file that ends up untouched is harmless, the reverse
//! is not. Existence is not checked either — a read of a missing required
//! file surfaces later, from staging, with the action identified.

use std::collections::BTreeSet;

use crate::domain::entities::blueprint::Blueprint;
use crate::domain::entities::common::RelativePath;

/// The file set one blueprint execution can read or write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Footprint {
    /// Every path staging must know about: action targets plus the
    /// blueprint's declared contextual files.
    pub required: BTreeSet<RelativePath>,
    /// The declared contextual files alone, kept separate for reporting.
    pub contextual: BTreeSet<RelativePath>,
}

impl Footprint {
    pub fn contains(&self, path: &RelativePath) -> bool {
        self.required.contains(path)
    }

    pub fn len(&self) -> usize {
        self.required.len()
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }
}

/// Collect the deduplicated union of action target paths and contextual
/// files. Only filesystem targets count: module specifiers in import
/// injections and shell commands contribute nothing.
pub fn analyze(blueprint: &Blueprint) -> Footprint {
    let contextual: BTreeSet<RelativePath> = blueprint.contextual_files.iter().cloned().collect();

    let mut required = contextual.clone();
    required.extend(
        blueprint
            .actions
            .iter()
            .filter_map(|action| action.kind.target_path().cloned()),
    );

    Footprint {
        required,
        contextual,
    }
}

// ═══════════════════════════════════════════════
//                    TESTS
// ═══════════════════════════════════════════════
