//! Task execution engine
//!
//! This module holds the task model, the registry that owns tasks, and the
//! scheduler that resolves dependencies and runs tasks, plus the shell command
//! support used by moanfile tasks.

pub mod command;
pub mod context;
pub mod event;
pub mod interpolate;
pub mod registry;
pub mod scheduler;
pub mod stack;
pub mod task;

// Re-export main types
pub use command::*;
pub use context::*;
pub use event::*;
pub use interpolate::*;
pub use registry::*;
pub use scheduler::*;
pub use stack::*;
pub use task::*;
