//! Graft Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Graft
//! blueprint execution engine, following hexagonal (ports and adapters)
//! architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           graft-cli (CLI)               │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │   (BlueprintExecutor, Orchestrator)     │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │     (Driven: DiskIo, ProcessRunner)     │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     graft-adapters (Infrastructure)     │
//! │    (LocalDisk, MemoryDisk, ShellRunner) │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │  (Blueprint, Action, Mutation Engine)   │
//! │         No External Dependencies        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use graft_core::{
//!     application::{BlueprintExecutor, ExecuteOptions},
//!     domain::{Blueprint, ExecutionContext},
//! };
//!
//! // 1. Load or build a blueprint
//! let blueprint = Blueprint::builder()
//!     .id("react-query")
//!     .name("React Query")
//!     .action(action)
//!     .build()
//!     .unwrap();
//!
//! // 2. Execute it (with injected adapters)
//! let executor = BlueprintExecutor::new(disk, runner);
//! let report = executor
//!     .execute(&blueprint, &ExecutionContext::new(), ExecuteOptions::default())
//!     .unwrap();
//! assert!(report.success);
//! ```

// Re-export domain layer (stable, well-defined API)
pub mod domain;

// Re-export application layer (orchestration logic)
pub mod application;

// Re-export error types
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        BlueprintExecutor, ExecuteOptions, ExecutionReport, Orchestrator, StagingFs,
        ports::{CommandOutput, CommandRequest, DiskIo, ProcessRunner},
    };
    pub use crate::domain::{
        Action, ActionKind, Blueprint, BlueprintBuilder, ConflictResolution, ConflictStrategy,
        ExecutionContext, Footprint, RelativePath,
    };
    pub use crate::error::{GraftError, GraftResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
