//! Disk adapters.

mod local;
mod memory;

pub use local::LocalDisk;
pub use memory::MemoryDisk;
