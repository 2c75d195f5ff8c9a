pub mod action;
pub mod blueprint;
pub mod common;

pub use crate::domain::DomainError;
pub use action::{Action, ActionKind};
pub use blueprint::Blueprint;
pub use common::{FileState, RelativePath};
