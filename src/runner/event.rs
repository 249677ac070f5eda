//! Task lifecycle notifications
//!
//! Observers are plain callbacks. A task holds its own observers; the scheduler
//! attaches one more to every registered task that forwards into its own list.

use crate::error::TaskFailure;
use crate::runner::TaskValue;
use std::sync::{Arc, PoisonError, RwLock};

/// A lifecycle transition of a single task
#[derive(Debug, Clone)]
pub enum TaskEvent {
    /// The task body was invoked
    Start { task: String },

    /// The task body succeeded, optionally with a value
    Done {
        task: String,
        value: Option<TaskValue>,
    },

    /// The task body failed
    Error { task: String, error: TaskFailure },
}

impl TaskEvent {
    /// Name of the task this event belongs to
    pub fn task(&self) -> &str {
        match self {
            TaskEvent::Start { task } | TaskEvent::Done { task, .. } | TaskEvent::Error { task, .. } => {
                task
            }
        }
    }
}

/// An observer callback
pub type Listener = Arc<dyn Fn(&TaskEvent) + Send + Sync>;

/// A shared list of observers.
///
/// Clones share the same list, so observers added later still see events emitted
/// by forwarders created earlier.
#[derive(Clone, Default)]
pub struct Listeners {
    inner: Arc<RwLock<Vec<Listener>>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Listener) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Deliver an event to every observer in registration order
    pub fn emit(&self, event: &TaskEvent) {
        let listeners = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}
