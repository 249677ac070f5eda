//! CLI interface and argument parsing
//!
//! This module handles command-line parsing, task listing, shell completion, and
//! driving a run of the scheduler.

pub mod app;

// Re-export main types
pub use app::*;
