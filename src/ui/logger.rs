//! Colorized console logger
//!
//! Lines written while a task is running are prefixed with the task's name, read
//! from the scheduler's execution stack.

use crate::runner::ExecutionStack;
use colored::{ColoredString, Colorize};
use std::io::{self, Write};

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

/// Writes prefixed, optionally colored lines to stdout and stderr
#[derive(Debug, Clone)]
pub struct Logger {
    verbosity: Verbosity,
    color: bool,
    stack: Option<ExecutionStack>,
}

impl Logger {
    pub fn new(verbosity: Verbosity, color: bool) -> Self {
        Logger {
            verbosity,
            color,
            stack: None,
        }
    }

    /// Prefix lines with the task at the top of `stack`
    pub fn with_stack(mut self, stack: ExecutionStack) -> Self {
        self.stack = Some(stack);
        self
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn is_enabled(&self, level: Verbosity) -> bool {
        self.verbosity >= level
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Build a line: `[task] LABEL message`, skipping whichever parts are empty
    pub fn format_line(&self, label: &str, message: &str) -> String {
        let task = self
            .stack
            .as_ref()
            .and_then(ExecutionStack::current)
            .map(|name| self.paint(&format!("[{}]", name), |s| s.reversed()));

        let parts: Vec<String> = task
            .into_iter()
            .chain(Some(label.to_string()))
            .chain(Some(message.to_string()))
            .filter(|part| !part.is_empty())
            .collect();
        parts.join(" ")
    }

    fn emit(&self, level: Verbosity, to_stderr: bool, line: String) {
        if !self.is_enabled(level) {
            return;
        }
        // Console output is best effort; a closed pipe must not fail the build.
        if to_stderr {
            let _ = writeln!(io::stderr(), "{}", line);
        } else {
            let _ = writeln!(io::stdout(), "{}", line);
        }
    }

    /// Debug message, only in verbose mode
    pub fn debug(&self, message: &str) {
        let label = self.paint("DEBUG", |s| s.blue());
        self.emit(Verbosity::Verbose, false, self.format_line(&label, message));
    }

    pub fn ok(&self, message: &str) {
        let label = self.paint("OK", |s| s.green());
        self.emit(Verbosity::Normal, false, self.format_line(&label, message));
    }

    pub fn warn(&self, message: &str) {
        let label = self.paint("WARNING", |s| s.yellow());
        self.emit(Verbosity::Normal, false, self.format_line(&label, message));
    }

    /// Error message on stderr, shown unless silent
    pub fn error(&self, message: &str) {
        let label = self.paint("ERROR", |s| s.red());
        self.emit(Verbosity::Quiet, true, self.format_line(&label, message));
    }

    /// A shell command about to run
    pub fn command(&self, command: &str) {
        let label = self.paint("RUN", |s| s.cyan());
        self.emit(Verbosity::Normal, false, self.format_line(&label, command));
    }

    pub fn writeln(&self, message: &str) {
        self.emit(Verbosity::Normal, false, self.format_line("", message));
    }

    /// Plain text without a task prefix
    pub fn write(&self, message: &str) {
        if self.is_enabled(Verbosity::Normal) {
            let _ = write!(io::stdout(), "{}", message);
        }
    }

    /// Bold text without a task prefix
    pub fn banner(&self, message: &str) {
        let text = self.paint(message, |s| s.bold());
        self.emit(Verbosity::Normal, false, text);
    }

    pub fn separator(&self) {
        self.emit(Verbosity::Normal, false, "-".repeat(72));
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(Verbosity::Normal, true)
    }
}
