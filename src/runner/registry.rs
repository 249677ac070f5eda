//! Task registry
//!
//! Owns every registered task, keyed by name. Dependents refer to each other by
//! name only, so the registry is the single owner of all task state.

use crate::error::{EngineError, EngineResult};
use crate::runner::Task;
use crate::utils::NamedMap;

/// Insertion-ordered map from task name to task
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: NamedMap<Task>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a task, replacing (and discarding the state of) any task with the same name.
    ///
    /// A replaced name keeps its original position in [`TaskRegistry::names`].
    pub fn register(&mut self, task: Task) -> &mut Task {
        let name = task.name().to_string();
        self.tasks.set(name, task)
    }

    /// Look up a task by name
    pub fn get(&self, name: &str) -> EngineResult<&Task> {
        self.tasks
            .get(name)
            .ok_or_else(|| EngineError::TaskNotFound(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> EngineResult<&mut Task> {
        self.tasks
            .get_mut(name)
            .ok_or_else(|| EngineError::TaskNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains(name)
    }

    /// All task names in registration order
    pub fn names(&self) -> Vec<String> {
        self.tasks.names()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Whether any task that has run ended in failure
    pub fn has_failures(&self) -> bool {
        self.iter().any(Task::is_failed)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
