//! Moan - a task runner with dependency resolution
//!
//! Tasks are registered with a [`runner::Scheduler`] under a name, with a list of
//! dependencies and a body. Running a task runs its dependencies first, depth first and
//! in declaration order, and every task body runs at most once per scheduler. Bodies may
//! be synchronous, callback based, or asynchronous.
//!
//! The `moan` binary reads tasks from a `moan.yml` file, where each task runs shell
//! commands and may clean up named sets of files.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod fileset;
pub mod runner;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use error::{MoanError, Result};

/// Current version of Moan
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
