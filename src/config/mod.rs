//! Moanfile parsing, validation and registration
//!
//! This module reads moan.yml files, checks them, and turns their tasks into
//! scheduler tasks that run shell commands.

pub mod parse;
pub mod register;
pub mod schema;
pub mod types;

// Re-export main types
pub use parse::*;
pub use register::*;
pub use schema::*;
pub use types::*;
