//! Infrastructure adapters for Graft.
//!
//! This crate implements the ports defined in `graft-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod blueprint_file;
pub mod disk;
pub mod process;

// Re-export commonly used adapters
pub use blueprint_file::{load_blueprint, load_blueprint_str};
pub use disk::{LocalDisk, MemoryDisk};
pub use process::{RecordingRunner, ShellRunner};
