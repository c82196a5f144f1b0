pub mod queue;
pub mod types;

pub use queue::{JobHandle, TaskQueue};
pub use types::*;
