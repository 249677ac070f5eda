//! Dependency resolution and execution
//!
//! The scheduler walks the dependency graph depth-first, left to right. Each task is
//! pushed onto the execution stack before its dependencies are resolved and popped once
//! it has run, so a name showing up twice on the stack is a cycle. Nothing is
//! pre-sorted: shared dependencies are deduplicated by each task's own run-once
//! memoization, which yields a topological order for any acyclic graph.

use crate::error::{EngineError, EngineResult};
use crate::fileset::FileSet;
use crate::runner::{
    ExecutionStack, Listeners, Task, TaskBody, TaskEvent, TaskNames, TaskRegistry, TaskValue,
};
use crate::utils::NamedMap;
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tracing::{debug, warn};

/// Name run when no task names are requested
pub const DEFAULT_TASK: &str = "default";

/// Registers tasks and runs them in dependency order
#[derive(Debug, Default)]
pub struct Scheduler {
    registry: TaskRegistry,
    stack: ExecutionStack,
    listeners: Listeners,
    configs: NamedMap<TaskValue>,
    file_sets: NamedMap<FileSet>,
    force: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep running other tasks after a task body fails
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn set_force(&mut self, force: bool) {
        self.force = force;
    }

    pub fn force(&self) -> bool {
        self.force
    }

    /// Register a task, replacing any task already registered under `name`.
    ///
    /// The new task starts out pending; whatever the replaced task did is forgotten.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        dependencies: impl Into<TaskNames>,
        body: impl Into<Option<TaskBody>>,
    ) -> &mut Task {
        let mut task = Task::new(name, dependencies, body);
        debug!(task = task.name(), dependencies = ?task.dependencies(), "registering task");

        let listeners = self.listeners.clone();
        task.add_listener(Arc::new(move |event: &TaskEvent| listeners.emit(event)));

        self.registry.register(task)
    }

    /// Look up a registered task
    pub fn task(&self, name: &str) -> EngineResult<&Task> {
        self.registry.get(name)
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Names of all registered tasks, in registration order
    pub fn names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Whether any task that has run ended in failure
    pub fn has_failures(&self) -> bool {
        self.registry.has_failures()
    }

    pub fn is_failed(&self, name: &str) -> EngineResult<bool> {
        Ok(self.registry.get(name)?.is_failed())
    }

    /// Name of the task currently being resolved or run
    pub fn current_task(&self) -> Option<String> {
        self.stack.current()
    }

    /// Shared, read-only view of the execution stack
    pub fn stack(&self) -> ExecutionStack {
        self.stack.clone()
    }

    /// Observe the lifecycle events of every registered task
    pub fn on_event<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&TaskEvent) + Send + Sync + 'static,
    {
        self.listeners.add(Arc::new(listener));
        self
    }

    /// Store a shared configuration value, replacing any previous value for `key`
    pub fn set_config(&mut self, key: impl Into<String>, value: impl Into<TaskValue>) {
        let key = key.into();
        let value = value.into();
        debug!(key = %key, value = %value, "setting configuration");
        self.configs.insert(key, value);
    }

    pub fn config(&self, key: &str) -> Option<&TaskValue> {
        self.configs.get(key)
    }

    /// Configuration keys in the order they were first set
    pub fn configs(&self) -> Vec<String> {
        self.configs.names()
    }

    /// Register a file set under `id`, replacing any previous one
    pub fn file_set(&mut self, id: impl Into<String>, file_set: FileSet) -> &FileSet {
        let id = id.into();
        debug!(id = %id, patterns = ?file_set.patterns(), "registering file set");
        self.file_sets.set(id, file_set)
    }

    pub fn get_file_set(&self, id: &str) -> EngineResult<&FileSet> {
        self.file_sets
            .get(id)
            .ok_or_else(|| EngineError::FileSetNotFound(id.to_string()))
    }

    /// File set IDs in registration order
    pub fn file_sets(&self) -> Vec<String> {
        self.file_sets.names()
    }

    /// Run the named tasks, and everything they depend on, in order.
    ///
    /// Runs the `default` task when no names are given. Each requested task is resolved
    /// completely before the next one starts. Returns the result of the last requested
    /// task.
    ///
    /// A failing task body aborts the run unless force mode is on, in which case the
    /// failure is recorded on the task and the run carries on. Missing tasks and cycles
    /// always abort. After an abort the execution stack still holds the chain of tasks
    /// that was in progress.
    pub async fn run(&mut self, names: impl Into<TaskNames>) -> EngineResult<Option<TaskValue>> {
        let mut names = names.into().into_vec();
        if names.is_empty() {
            names.push(DEFAULT_TASK.to_string());
        }

        debug!(tasks = ?names, force = self.force, "running tasks");
        self.stack.clear();

        self.run_tasks(&names).await
    }

    /// Run a list of sibling tasks one after another.
    ///
    /// Every name is looked up before any of them runs.
    fn run_tasks<'a>(
        &'a mut self,
        names: &'a [String],
    ) -> BoxFuture<'a, EngineResult<Option<TaskValue>>> {
        async move {
            for name in names {
                self.registry.get(name)?;
            }

            let mut result = None;
            for name in names {
                result = self.run_task(name).await?;
            }
            Ok(result)
        }
        .boxed()
    }

    async fn run_task(&mut self, name: &str) -> EngineResult<Option<TaskValue>> {
        if self.stack.contains(name) {
            return Err(EngineError::CyclicDependency(name.to_string()));
        }
        self.stack.push(name);

        match self.resolve(name).await {
            Ok(result) => {
                self.stack.pop();
                Ok(result)
            }
            Err(EngineError::Task(failure)) if self.force => {
                warn!(task = name, error = %failure, "task failed, continuing");
                self.stack.pop();
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    async fn resolve(&mut self, name: &str) -> EngineResult<Option<TaskValue>> {
        let dependencies = self.registry.get(name)?.dependencies().to_vec();
        if !dependencies.is_empty() {
            self.run_tasks(&dependencies).await?;
        }

        let handle = self.registry.get_mut(name)?.run();
        Ok(handle.await?)
    }
}
