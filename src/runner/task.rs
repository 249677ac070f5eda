//! Task representation and run-once execution
//!
//! A task owns its body until the first call to [`Task::run`], which consumes the body and
//! memoizes the outcome behind a shared handle. Every later call hands out a clone of that
//! handle, so the body executes at most once no matter how many dependents ask for it.

use crate::error::TaskFailure;
use crate::runner::{Listener, TaskEvent};
use futures::channel::oneshot;
use futures::future::{self, BoxFuture, FutureExt, Shared};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Value produced by a successful task
pub type TaskValue = serde_json::Value;

/// Memoized outcome of a task
pub type TaskOutcome = Result<Option<TaskValue>, TaskFailure>;

/// Cloneable handle to a task's (possibly still running) outcome
pub type TaskHandle = Shared<BoxFuture<'static, TaskOutcome>>;

type BodyResult = anyhow::Result<Option<TaskValue>>;

/// Converts a body's output to a task value; `null` means "no value".
fn to_value<T: Serialize>(value: T) -> BodyResult {
    match serde_json::to_value(value)? {
        TaskValue::Null => Ok(None),
        value => Ok(Some(value)),
    }
}

/// The unit of work performed by a task
#[derive(Default)]
pub enum TaskBody {
    /// Succeeds immediately with no value
    #[default]
    Noop,

    /// Runs synchronously when the task starts
    Sync(Box<dyn FnOnce() -> BodyResult + Send>),

    /// Receives a [`Done`] handle and reports completion through it
    Callback(Box<dyn FnOnce(Done) + Send>),

    /// Returns a future that resolves to the outcome
    Async(Box<dyn FnOnce() -> BoxFuture<'static, BodyResult> + Send>),
}

impl TaskBody {
    pub fn sync<F, T>(body: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
        T: Serialize,
    {
        TaskBody::Sync(Box::new(move || body().and_then(to_value)))
    }

    pub fn callback<F>(body: F) -> Self
    where
        F: FnOnce(Done) + Send + 'static,
    {
        TaskBody::Callback(Box::new(body))
    }

    pub fn future<F, Fut, T>(body: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Serialize,
    {
        TaskBody::Async(Box::new(move || {
            body().map(|result| result.and_then(to_value)).boxed()
        }))
    }

    /// Start the body. Synchronous and callback bodies are called right away; the
    /// returned future only waits for their result.
    fn invoke(self) -> BoxFuture<'static, BodyResult> {
        match self {
            TaskBody::Noop => future::ready(Ok(None)).boxed(),
            TaskBody::Sync(body) => future::ready(body()).boxed(),
            TaskBody::Callback(body) => {
                let (sender, receiver) = oneshot::channel();
                body(Done { sender });
                async move {
                    receiver.await.unwrap_or_else(|_| {
                        Err(anyhow::anyhow!(
                            "completion callback was dropped without being called"
                        ))
                    })
                }
                .boxed()
            }
            TaskBody::Async(body) => body(),
        }
    }
}

impl fmt::Debug for TaskBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            TaskBody::Noop => "Noop",
            TaskBody::Sync(_) => "Sync",
            TaskBody::Callback(_) => "Callback",
            TaskBody::Async(_) => "Async",
        };
        f.write_str(kind)
    }
}

/// Completion handle passed to callback-style bodies.
///
/// Every method consumes the handle, so a body can complete at most once.
/// Dropping it without calling any of them fails the task.
pub struct Done {
    sender: oneshot::Sender<BodyResult>,
}

impl Done {
    /// Complete with an explicit result
    pub fn send(self, result: anyhow::Result<Option<TaskValue>>) {
        // The receiver only goes away when the task itself has been dropped.
        let _ = self.sender.send(result);
    }

    /// Succeed with a value
    pub fn ok<T: Serialize>(self, value: T) {
        self.send(to_value(value));
    }

    /// Succeed with no value
    pub fn finish(self) {
        self.send(Ok(None));
    }

    /// Fail with an error
    pub fn fail<E: Into<anyhow::Error>>(self, error: E) {
        self.send(Err(error.into()));
    }
}

impl fmt::Debug for Done {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Done").finish_non_exhaustive()
    }
}

/// Execution state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            TaskState::Pending => "pending",
            TaskState::Running => "running",
            TaskState::Succeeded => "succeeded",
            TaskState::Failed => "failed",
        };
        f.write_str(state)
    }
}

/// An ordered list of task names.
///
/// Accepts a single name, a list of names or nothing at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskNames(Vec<String>);

impl TaskNames {
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<()> for TaskNames {
    fn from(_: ()) -> Self {
        TaskNames::default()
    }
}

impl From<&str> for TaskNames {
    fn from(name: &str) -> Self {
        TaskNames(vec![name.to_string()])
    }
}

impl From<String> for TaskNames {
    fn from(name: String) -> Self {
        TaskNames(vec![name])
    }
}

impl From<Vec<String>> for TaskNames {
    fn from(names: Vec<String>) -> Self {
        TaskNames(names)
    }
}

impl From<Vec<&str>> for TaskNames {
    fn from(names: Vec<&str>) -> Self {
        TaskNames(names.into_iter().map(String::from).collect())
    }
}

impl From<&[String]> for TaskNames {
    fn from(names: &[String]) -> Self {
        TaskNames(names.to_vec())
    }
}

impl From<&[&str]> for TaskNames {
    fn from(names: &[&str]) -> Self {
        TaskNames(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for TaskNames {
    fn from(names: [&str; N]) -> Self {
        TaskNames(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<T: Into<TaskNames>> From<Option<T>> for TaskNames {
    fn from(names: Option<T>) -> Self {
        names.map(Into::into).unwrap_or_default()
    }
}

/// A named unit of work with dependencies and run-once execution
pub struct Task {
    name: String,
    dependencies: Vec<String>,
    body: Option<TaskBody>,
    handle: Option<TaskHandle>,
    listeners: Vec<Listener>,
}

impl Task {
    /// Create a pending task. A missing body becomes a no-op.
    pub fn new(
        name: impl Into<String>,
        dependencies: impl Into<TaskNames>,
        body: impl Into<Option<TaskBody>>,
    ) -> Self {
        Task {
            name: name.into(),
            dependencies: dependencies.into().into_vec(),
            body: Some(body.into().unwrap_or_default()),
            handle: None,
            listeners: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the tasks that must complete before this one runs
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Observe this task's lifecycle events
    pub fn on_event<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&TaskEvent) + Send + Sync + 'static,
    {
        self.listeners.push(Arc::new(listener));
        self
    }

    pub(crate) fn add_listener(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    /// Run the task body, or return the handle of the run already started.
    ///
    /// The body is invoked on the first call only. The returned handle resolves to the
    /// same outcome for every caller.
    pub fn run(&mut self) -> TaskHandle {
        if let Some(handle) = &self.handle {
            return handle.clone();
        }

        let body = self.body.take().unwrap_or_default();
        let name = self.name.clone();
        let listeners = self.listeners.clone();

        debug!(task = %name, body = ?body, "starting task");
        emit(&listeners, &TaskEvent::Start { task: name.clone() });

        let pending = body.invoke();
        let handle = async move {
            match pending.await {
                Ok(value) => {
                    emit(
                        &listeners,
                        &TaskEvent::Done {
                            task: name,
                            value: value.clone(),
                        },
                    );
                    Ok(value)
                }
                Err(cause) => {
                    let failure = TaskFailure::new(name.clone(), cause);
                    emit(
                        &listeners,
                        &TaskEvent::Error {
                            task: name,
                            error: failure.clone(),
                        },
                    );
                    Err(failure)
                }
            }
        }
        .boxed()
        .shared();

        self.handle = Some(handle.clone());
        handle
    }

    fn outcome(&self) -> Option<&TaskOutcome> {
        self.handle.as_ref().and_then(|handle| handle.peek())
    }

    pub fn state(&self) -> TaskState {
        match (&self.handle, self.outcome()) {
            (None, _) => TaskState::Pending,
            (Some(_), None) => TaskState::Running,
            (Some(_), Some(Ok(_))) => TaskState::Succeeded,
            (Some(_), Some(Err(_))) => TaskState::Failed,
        }
    }

    /// Whether the body has been invoked
    pub fn is_started(&self) -> bool {
        self.handle.is_some()
    }

    /// Whether the body has succeeded or failed
    pub fn is_finished(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn is_failed(&self) -> bool {
        self.state() == TaskState::Failed
    }

    /// Value produced by a succeeded task, if it produced one
    pub fn result(&self) -> Option<&TaskValue> {
        self.outcome()
            .and_then(|outcome| outcome.as_ref().ok())
            .and_then(Option::as_ref)
    }

    /// Failure recorded by a failed task
    pub fn error(&self) -> Option<&TaskFailure> {
        self.outcome().and_then(|outcome| outcome.as_ref().err())
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("state", &self.state())
            .finish()
    }
}

fn emit(listeners: &[Listener], event: &TaskEvent) {
    for listener in listeners {
        listener(event);
    }
}
