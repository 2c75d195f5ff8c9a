// ============================================================================
// domain/errors.rs - COMPREHENSIVE ERROR DOMAIN
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (for retry logic)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Mutation Errors (raised by the primitive engine)
    // ========================================================================
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("File already exists: {path}")]
    AlreadyExists { path: String },

    #[error("Failed to parse '{path}' as structured data: {reason}")]
    ParseError { path: String, reason: String },

    #[error("No match for '{target}' in {path}")]
    NoMatch { target: String, path: String },

    // ========================================================================
    // Expression & Template Errors
    // ========================================================================
    #[error("Failed to evaluate condition '{expr}': {reason}")]
    ConditionEvalError { expr: String, reason: String },

    #[error("Template syntax error: {reason}")]
    TemplateSyntax { reason: String },

    // ========================================================================
    // Validation Errors (blueprint shape)
    // ========================================================================
    #[error("Invalid blueprint: {0}")]
    InvalidBlueprint(String),

    #[error("Blueprint '{blueprint_id}' has no actions")]
    EmptyBlueprint { blueprint_id: String },

    #[error("Invalid action #{index} ({kind}): {reason}")]
    InvalidAction {
        index: usize,
        kind: String,
        reason: String,
    },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("Path escapes the project root: {path}")]
    PathEscapesRoot { path: String },

    // ========================================================================
    // Constraint Violations
    // ========================================================================
    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NotFound { path } => vec![
                format!("The blueprint expects '{}' to exist in the project", path),
                "Run the blueprint against a project that has this file, or set a create fallback on the action".into(),
            ],
            Self::AlreadyExists { path } => vec![
                format!("'{}' already exists and the action does not allow overwriting", path),
                "Set the action's conflict strategy to 'skip', 'replace', or 'merge'".into(),
            ],
            Self::ParseError { path, .. } => vec![
                format!("'{}' could not be parsed as JSON", path),
                "Fix the file's syntax before applying the blueprint".into(),
            ],
            Self::ConditionEvalError { expr, .. } => vec![
                format!("Condition: {}", expr),
                "Conditions support dotted paths, !, ==, !=, && and ||".into(),
            ],
            Self::EmptyBlueprint { blueprint_id } => vec![
                format!("Blueprint '{}' declares no actions", blueprint_id),
                "A blueprint must contain at least one action".into(),
            ],
            Self::InvalidBlueprint(msg) => vec![
                "Check the blueprint file".into(),
                format!("Details: {}", msg),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidBlueprint(_)
            | Self::EmptyBlueprint { .. }
            | Self::InvalidAction { .. }
            | Self::AbsolutePathNotAllowed { .. }
            | Self::PathEscapesRoot { .. }
            | Self::ConditionEvalError { .. }
            | Self::TemplateSyntax { .. }
            | Self::MissingRequiredField { .. } => ErrorCategory::Validation,
            Self::AlreadyExists { .. } | Self::ParseError { .. } => ErrorCategory::Conflict,
            Self::NotFound { .. } | Self::NoMatch { .. } => ErrorCategory::NotFound,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Conflict,
    NotFound,
    Internal,
}
