// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Graft.
//!
//! This module contains pure business logic with ZERO side effects.
//! All I/O (disk reads, writes, process spawning) happens behind ports
//! defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **No heavy crates**: std + thiserror + serde for the data model
//! - **Immutable entities**: All domain objects are Clone + PartialEq
//! - **Rich domain model**: Behavior lives in entities, not services
//!
// Public API - what the world sees
pub mod analyzer;
pub mod condition;
pub mod context;
pub mod entities;
pub mod error;
pub mod mutate;
pub mod template;
pub mod value_objects;

// Re-exports for convenience
pub use analyzer::{Footprint, analyze};
pub use context::ExecutionContext;
pub use entities::{
    action::{Action, ActionKind, ConflictResolution, ImportSpec, WrapSpec},
    blueprint::{Blueprint, BlueprintBuilder},
    common::{FileState, RelativePath},
};
pub use error::{DomainError, ErrorCategory};
pub use mutate::Rewrite;
pub use value_objects::{AppendFallback, ArrayMergePolicy, ConflictStrategy};
