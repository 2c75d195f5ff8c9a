//! Application layer for Graft.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (BlueprintExecutor, Orchestrator)
//! - **Staging**: The write-buffering virtual filesystem executions run against
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business logic itself. All business rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;
pub mod staging;

// Re-export main services
pub use services::{
    ActionOutcome,
    BlueprintExecutor,
    ExecuteOptions,
    ExecutionReport,
    Orchestrator,
    Phase,
};

pub use staging::StagingFs;

// Re-export port traits (for adapter implementation)
pub use ports::{CommandOutput, CommandRequest, DiskIo, ProcessRunner};

pub use error::ApplicationError;
