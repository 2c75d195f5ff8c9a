//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "execute a blueprint against a project".

pub mod executor;
pub mod orchestrator;

pub use executor::{BlueprintExecutor, ExecuteOptions, ExecutionReport, Phase};
pub use orchestrator::{ActionOutcome, Orchestrator};
