//! Domain value objects: ConflictStrategy, ArrayMergePolicy, AppendFallback.
//!
//! # Design
//!
//! These are pure value types — `Copy`, equality-by-value, no identity.
//! They carry NO policy logic. How a strategy is applied lives in the
//! orchestrator; this file's only job is to define the types, their string
//! representations, and their `FromStr` parsers.
//!
//! # Adding New Variants
//!
//! 1. Add the enum variant here
//! 2. Add the `as_str` arm and the `FromStr` arm here
//! 3. Handle the variant where the policy is applied (the compiler will
//!    point at every non-exhaustive match)
//! 4. Done — nothing else changes

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── ConflictStrategy ─────────────────────────────────────────────────────────

/// What to do when a mutation primitive cannot apply cleanly.
///
/// Consulted by the orchestrator after a primitive failure; never inspected
/// by the primitives themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStrategy {
    /// Propagate the failure and abort the blueprint (default for mutations).
    #[default]
    Error,
    /// Record a warning and continue with the next action.
    Skip,
    /// Retry the primitive in overwrite mode.
    Replace,
    /// Retry with the structured-merge primitive.
    Merge,
}

impl ConflictStrategy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Skip => "skip",
            Self::Replace => "replace",
            Self::Merge => "merge",
        }
    }
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" | "abort" => Ok(Self::Error),
            "skip" | "ignore" => Ok(Self::Skip),
            "replace" | "overwrite" => Ok(Self::Replace),
            "merge" => Ok(Self::Merge),
            other => Err(DomainError::InvalidBlueprint(format!(
                "unknown conflict strategy: {other}"
            ))),
        }
    }
}

// ── ArrayMergePolicy ─────────────────────────────────────────────────────────

/// How array values combine during a structured deep merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayMergePolicy {
    /// Incoming elements are appended to the existing array (default).
    #[default]
    Concat,
    /// The incoming array replaces the existing one wholesale.
    Replace,
    /// Concatenate, then drop elements already present (first wins).
    Unique,
}

impl ArrayMergePolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Concat => "concat",
            Self::Replace => "replace",
            Self::Unique => "unique",
        }
    }
}

impl fmt::Display for ArrayMergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArrayMergePolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "concat" | "append" => Ok(Self::Concat),
            "replace" => Ok(Self::Replace),
            "unique" | "dedup" => Ok(Self::Unique),
            other => Err(DomainError::InvalidBlueprint(format!(
                "unknown array merge policy: {other}"
            ))),
        }
    }
}

// ── AppendFallback ───────────────────────────────────────────────────────────

/// What append/prepend do when the target file does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppendFallback {
    /// Missing file is an error (default).
    #[default]
    Error,
    /// Treat missing content as empty, creating the file on commit.
    Create,
}

impl AppendFallback {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Create => "create",
        }
    }
}

impl fmt::Display for AppendFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppendFallback {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "create" => Ok(Self::Create),
            other => Err(DomainError::InvalidBlueprint(format!(
                "unknown append fallback: {other}"
            ))),
        }
    }
}
