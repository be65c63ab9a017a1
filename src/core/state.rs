//! Shared agent state.
//!
//! [`Shared`] is what the public `Agent` handle and every queued update hold on
//! to. The mutable part ([`State`]) sits behind one lock that is held only for
//! snapshots and commits, never while user code runs.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::{
    executors::{ExecutorRef, SerialQueue},
    observers::ObserverSet,
    policies::{ReadTransform, RescuerChain, Validator},
};

/// Fields guarded by the agent lock.
pub(crate) struct State<T> {
    pub(crate) value: Arc<T>,
    pub(crate) validator: Validator<T>,
    pub(crate) rescuers: RescuerChain,
}

/// Everything an agent and its in-flight updates share.
pub(crate) struct Shared<T> {
    pub(crate) name: Cow<'static, str>,
    pub(crate) state: Mutex<State<T>>,
    pub(crate) observers: ObserverSet<T>,
    pub(crate) transform: ReadTransform<T>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) task_executor: ExecutorRef,
    pub(crate) blocking_executor: ExecutorRef,
    pub(crate) serializer: SerialQueue,
}

impl<T> Shared<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Current value and active validator, taken together under the lock.
    pub(crate) fn snapshot(&self) -> (Arc<T>, Validator<T>) {
        let state = self.state.lock();
        (Arc::clone(&state.value), state.validator.clone())
    }

    /// Replaces the value, returning the committed handle.
    pub(crate) fn commit(&self, next: T) -> Arc<T> {
        let next = Arc::new(next);
        self.state.lock().value = Arc::clone(&next);
        next
    }

    /// Rescuers registered so far.
    pub(crate) fn rescuers(&self) -> RescuerChain {
        self.state.lock().rescuers.clone()
    }

    /// Current value after the read transform.
    pub(crate) fn read(&self) -> Arc<T> {
        let value = Arc::clone(&self.state.lock().value);
        self.transform.apply(&value)
    }
}
