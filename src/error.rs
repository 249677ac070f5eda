//! Error types for Moan

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for Moan operations
pub type Result<T> = std::result::Result<T, MoanError>;

/// Main error type for Moan
#[derive(Error, Debug)]
pub enum MoanError {
    /// Task graph and task execution errors
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Command execution errors
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// Variable interpolation errors
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// File set errors
    #[error("File set error: {0}")]
    FileSet(#[from] FileSetError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The build failed and the failure has already been reported
    #[error("Build failed")]
    BuildFailed,
}

/// Errors raised by the scheduler while resolving and running tasks
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    #[error("Could not find task: {0}")]
    TaskNotFound(String),

    #[error("Could not find file set: {0}")]
    FileSetNotFound(String),

    #[error("Cyclic dependency found: {0}")]
    CyclicDependency(String),

    #[error(transparent)]
    Task(#[from] TaskFailure),
}

impl EngineError {
    /// Whether this error describes a misconfigured graph rather than a failing task body.
    ///
    /// Structural errors are never suppressed by force mode.
    pub fn is_structural(&self) -> bool {
        !matches!(self, EngineError::Task(_))
    }

    /// Name of the task that produced this error, if any
    pub fn task_name(&self) -> Option<&str> {
        match self {
            EngineError::TaskNotFound(name) | EngineError::CyclicDependency(name) => Some(name),
            EngineError::Task(failure) => Some(failure.task()),
            EngineError::FileSetNotFound(_) => None,
        }
    }
}

/// A task body threw, rejected or reported an error through its completion callback.
///
/// Cloneable so the memoized outcome can be handed to every dependent that asks for it.
#[derive(Clone)]
pub struct TaskFailure {
    task: String,
    cause: Arc<anyhow::Error>,
}

impl TaskFailure {
    pub fn new(task: impl Into<String>, cause: anyhow::Error) -> Self {
        TaskFailure {
            task: task.into(),
            cause: Arc::new(cause),
        }
    }

    /// Name of the failed task
    pub fn task(&self) -> &str {
        &self.task
    }

    /// The underlying error returned by the task body
    pub fn cause(&self) -> &anyhow::Error {
        &self.cause
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cause)
    }
}

impl fmt::Debug for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskFailure")
            .field("task", &self.task)
            .field("cause", &self.cause)
            .finish()
    }
}

impl std::error::Error for TaskFailure {}

/// Configuration parsing and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find config file (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Task '{task}' cleans undeclared file set '{file_set}'")]
    UnknownFileSet { task: String, file_set: String },

    #[error("Failed to include file '{path}': {error}")]
    IncludeFile { path: PathBuf, error: String },
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command failed with exit code {0:?}")]
    CommandFailed(Option<i32>),

    #[error("Failed to spawn '{program}': {error}")]
    Spawn { program: String, error: io::Error },

    #[error("Interpreter must name at least one program")]
    EmptyInterpreter,

    #[error("Invalid value for '{name}': {error}")]
    InvalidValue { name: String, error: String },
}

/// Variable interpolation errors
#[derive(Error, Debug)]
pub enum InterpolationError {
    #[error("Variable '{0}' is not defined")]
    UndefinedVariable(String),

    #[error("Recursive interpolation detected")]
    RecursiveInterpolation,
}

/// File set lookup and deletion errors
#[derive(Error, Debug)]
pub enum FileSetError {
    #[error("Invalid glob pattern '{pattern}': {error}")]
    Pattern { pattern: String, error: String },

    #[error("Failed to read '{path}': {error}")]
    Walk { path: PathBuf, error: io::Error },

    #[error("Failed to delete '{path}': {error}")]
    Delete { path: PathBuf, error: io::Error },
}

/// Specialized result type for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

/// Specialized result type for interpolation operations
pub type InterpolationResult<T> = std::result::Result<T, InterpolationError>;

/// Specialized result type for file set operations
pub type FileSetResult<T> = std::result::Result<T, FileSetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_errors() {
        assert!(EngineError::TaskNotFound("a".to_string()).is_structural());
        assert!(EngineError::CyclicDependency("a".to_string()).is_structural());

        let failure = TaskFailure::new("a", anyhow::anyhow!("boom"));
        assert!(!EngineError::Task(failure).is_structural());
    }

    #[test]
    fn test_task_failure_display() {
        let failure = TaskFailure::new("lint", anyhow::anyhow!("3 problems"));
        assert_eq!(failure.task(), "lint");
        assert_eq!(failure.to_string(), "3 problems");
        assert_eq!(EngineError::from(failure).task_name(), Some("lint"));
    }

    #[test]
    fn test_not_found_message() {
        let err = EngineError::TaskNotFound("missing".to_string());
        assert_eq!(err.to_string(), "Could not find task: missing");
    }
}
