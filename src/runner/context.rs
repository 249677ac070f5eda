//! Command execution context
//!
//! Everything a moanfile task needs to run its shell commands: where to run them,
//! which interpreter to use and which variables to interpolate.

use crate::ui::Logger;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

/// Settings shared by every command a task runs
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Directory commands run in (the moanfile's directory)
    pub working_dir: PathBuf,

    /// Variables available for `${name}` interpolation
    pub vars: HashMap<String, String>,

    /// Interpreter prefix (e.g., ["bash", "-c"])
    pub interpreter: Vec<String>,

    /// Where to report the commands being run
    pub logger: Logger,
}

impl CommandContext {
    /// Create a new context with default settings
    pub fn new() -> Self {
        CommandContext {
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            vars: HashMap::new(),
            interpreter: vec!["sh".to_string(), "-c".to_string()],
            logger: Logger::default(),
        }
    }

    /// Create a context with a specific working directory
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    /// Set variables
    pub fn with_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.vars = vars;
        self
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Set a single variable
    pub fn set_var(&mut self, key: String, value: String) {
        self.vars.insert(key, value);
    }

    /// Get a variable value
    pub fn get_var(&self, key: &str) -> Option<&String> {
        self.vars.get(key)
    }
}

impl Default for CommandContext {
    fn default() -> Self {
        Self::new()
    }
}
