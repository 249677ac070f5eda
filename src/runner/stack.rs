//! Execution stack
//!
//! Tracks the chain of tasks currently being resolved. The scheduler uses it to detect
//! cycles; loggers hold a clone to prefix output with the active task.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared handle to the ordered list of in-progress task names
#[derive(Debug, Clone, Default)]
pub struct ExecutionStack {
    names: Arc<Mutex<Vec<String>>>,
}

impl ExecutionStack {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.names.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Push a task onto the stack
    pub fn push(&self, task_name: impl Into<String>) {
        self.lock().push(task_name.into());
    }

    /// Pop the task at the top of the stack
    pub fn pop(&self) -> Option<String> {
        self.lock().pop()
    }

    /// Check if a task is on the stack (detects cycles)
    pub fn contains(&self, task_name: &str) -> bool {
        self.lock().iter().any(|t| t == task_name)
    }

    /// Name of the task at the top of the stack
    pub fn current(&self) -> Option<String> {
        self.lock().last().cloned()
    }

    /// Copy of the whole stack, bottom first
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }
}
