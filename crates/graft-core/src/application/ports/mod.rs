//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `graft-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `DiskIo`: Raw file reads and writes
//!   - `ProcessRunner`: External command execution
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by the executor)

pub mod output;

pub use output::{CommandOutput, CommandRequest, DiskIo, ProcessRunner};
