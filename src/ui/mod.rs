//! Console output
//!
//! User-facing output of the `moan` binary: the colorized line logger and the
//! build summary printed when a run finishes.

pub mod logger;
pub mod report;

pub use logger::*;
pub use report::*;
