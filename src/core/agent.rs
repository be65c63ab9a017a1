//! # Agent: asynchronous single-value identity cell.
//!
//! An [`Agent`] holds one value. Readers get it without blocking; writers queue
//! update functions that run one at a time, in submission order, on an executor.
//!
//! ## Architecture
//! ```text
//! post(f) ──► SerialQueue (per agent, FIFO) ──► runner::run_update
//!                                                  ├─► executor: f(&value) + validator
//!                                                  ├─► commit under lock
//!                                                  ├─► ObserverSet::notify
//!                                                  └─► RescuerChain::dispatch on failure
//! value() ──► lock ─► clone Arc ─► unlock ─► ReadTransform::apply
//! ```
//!
//! ## Rules
//! - `post*`, `rescue`, `validate` and `value` never block on pending updates.
//! - `wait` blocks only the calling thread, bounded by its timeout.
//! - `rescue`/`validate` affect updates that have not started yet, including queued ones.
//! - Cloning an `Agent` yields another handle to the same cell.

use std::fmt;
use std::ops::Shl;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::{AgentError, BoxError, ErrorKind, UpdateError},
    executors::{ExecutorRef, Executors},
    observers::{Observe, ObserverId},
    policies::{RescueHandler, Rescuer, Validator},
    signal::CompletionSignal,
};

use super::{
    builder::AgentBuilder,
    runner::{Update, run_update},
    state::Shared,
};

/// Asynchronous mutable identity cell.
///
/// See the [module docs](self) for the update protocol.
pub struct Agent<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Agent<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates an agent with the default configuration.
    pub fn new(initial: T, executors: &Executors) -> Self {
        Self::builder(initial).build(executors)
    }

    /// Returns a builder to customize timeout, executors, read transform, etc.
    pub fn builder(initial: T) -> AgentBuilder<T> {
        AgentBuilder::new(initial)
    }

    pub(crate) fn from_shared(shared: Arc<Shared<T>>) -> Self {
        Self { shared }
    }

    /// Name used in logs.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Returns the current value after the read transform.
    ///
    /// Never waits for pending updates.
    pub fn value(&self) -> Arc<T> {
        self.shared.read()
    }

    /// Appends a rescuer for failures of kind `kind` (or any of its subkinds).
    ///
    /// Rescuers are tried in insertion order; the first match wins.
    pub fn rescue<F>(&self, kind: ErrorKind, handler: F) -> &Self
    where
        F: Fn(&UpdateError) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.rescue_opt(kind, Some(Arc::new(handler)))
    }

    /// Like [`Self::rescue`], but a missing handler is a no-op.
    pub fn rescue_opt(&self, kind: ErrorKind, handler: Option<RescueHandler>) -> &Self {
        if let Some(handler) = handler {
            self.shared
                .state
                .lock()
                .rescuers
                .push(Rescuer::new(kind, handler));
        }
        self
    }

    /// Replaces the active validator.
    ///
    /// Results the validator rejects are discarded silently.
    pub fn validate<F>(&self, predicate: F) -> &Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.shared.state.lock().validator = Validator::new(predicate);
        self
    }

    /// Queues `f` on the default executor (fast, or blocking if configured).
    ///
    /// Returns `true` once the update is enqueued.
    pub fn post<F>(&self, f: F) -> bool
    where
        F: FnOnce(&T) -> Result<T, UpdateError> + Send + 'static,
    {
        self.submit(Some(Box::new(f)), Arc::clone(&self.shared.task_executor))
    }

    /// Queues `f` on the blocking executor.
    pub fn post_blocking<F>(&self, f: F) -> bool
    where
        F: FnOnce(&T) -> Result<T, UpdateError> + Send + 'static,
    {
        self.submit(Some(Box::new(f)), Arc::clone(&self.shared.blocking_executor))
    }

    /// Queues `f` on an explicit executor.
    pub fn post_on<F>(&self, executor: ExecutorRef, f: F) -> bool
    where
        F: FnOnce(&T) -> Result<T, UpdateError> + Send + 'static,
    {
        self.submit(Some(Box::new(f)), executor)
    }

    /// Queues an optional, already boxed update on `executor`.
    ///
    /// Returns `false` if `update` is `None` or the queue is closed.
    pub fn submit(&self, update: Option<Update<T>>, executor: ExecutorRef) -> bool {
        let result = match update {
            Some(update) => {
                let job = run_update(Arc::clone(&self.shared), executor, update);
                self.shared.serializer.enqueue_job(Box::pin(job))
            }
            None => Err(AgentError::MissingUpdate),
        };
        match result {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(agent = %self.shared.name, label = err.as_label(), "update not enqueued");
                false
            }
        }
    }

    /// Queues `f` like [`Self::post`] and returns the agent for chaining.
    ///
    /// Also available as `&agent << f`.
    pub fn enqueue<F>(&self, f: F) -> &Self
    where
        F: FnOnce(&T) -> Result<T, UpdateError> + Send + 'static,
    {
        self.post(f);
        self
    }

    /// Blocks until every update posted before this call has completed.
    ///
    /// Returns `false` if that did not happen within `timeout` (`None` waits
    /// indefinitely). Must not be called from a runtime worker thread; use
    /// [`Self::settle`] in async code.
    pub fn wait(&self, timeout: Option<Duration>) -> bool {
        match self.barrier() {
            Some(signal) => signal.wait(timeout),
            None => false,
        }
    }

    /// Async counterpart of [`Self::wait`].
    ///
    /// The barrier is posted when the returned future is first polled.
    pub async fn settle(&self, timeout: Option<Duration>) -> bool {
        match self.barrier() {
            Some(signal) => signal.wait_async(timeout).await,
            None => false,
        }
    }

    /// Posts a pass-through update that sets the returned signal when it runs.
    fn barrier(&self) -> Option<Arc<CompletionSignal>> {
        let signal = Arc::new(CompletionSignal::new());
        let setter = Arc::clone(&signal);
        let posted = self.post(move |value: &T| {
            setter.set();
            Ok(value.clone())
        });
        posted.then_some(signal)
    }

    /// Subscribes `observer` to committed changes.
    pub fn subscribe(&self, observer: Arc<dyn Observe<T>>) -> ObserverId {
        self.shared.observers.subscribe(observer)
    }

    /// Unsubscribes the observer registered under `id`.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.shared.observers.unsubscribe(id)
    }

    /// Per-update time bound (`None` = unbounded).
    pub fn timeout(&self) -> Option<Duration> {
        self.shared.timeout
    }

    /// Number of updates enqueued and not yet completed.
    pub fn queued(&self) -> usize {
        self.shared.serializer.len()
    }
}

impl<T> Clone for Agent<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Agent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = Arc::clone(&self.shared.state.lock().value);
        f.debug_struct("Agent")
            .field("name", &self.shared.name)
            .field("value", &value)
            .field("timeout", &self.shared.timeout)
            .finish_non_exhaustive()
    }
}

impl<'a, T, F> Shl<F> for &'a Agent<T>
where
    T: Clone + Send + Sync + 'static,
    F: FnOnce(&T) -> Result<T, UpdateError> + Send + 'static,
{
    type Output = &'a Agent<T>;

    fn shl(self, f: F) -> Self::Output {
        self.enqueue(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executors::{Executor, Task};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts tasks, then forwards them to an inner executor.
    struct Counting {
        runs: AtomicUsize,
        inner: ExecutorRef,
    }

    impl Executor for Counting {
        fn execute(&self, task: Task) {
            self.runs.fetch_add(1, Ordering::SeqCst);
            self.inner.execute(task);
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    /// Drops every task without running it.
    struct Dropping;

    impl Executor for Dropping {
        fn execute(&self, _task: Task) {}
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap()
    }

    const WAIT: Option<Duration> = Some(Duration::from_secs(5));

    #[test]
    fn test_explicit_executor_overrides_both_selections() {
        let rt = runtime();
        let execs = Executors::new(rt.handle().clone());
        let counting = Arc::new(Counting {
            runs: AtomicUsize::new(0),
            inner: Arc::clone(execs.fast()),
        });
        let agent = Agent::builder(1u32)
            .executor(counting.clone())
            .build(&execs);

        agent.post(|x| Ok(x + 1));
        agent.post_blocking(|x| Ok(x + 1));
        assert!(agent.wait(WAIT));

        assert_eq!(*agent.value(), 3);
        // Two updates plus the wait barrier; no failures, so no rescue dispatch.
        assert_eq!(counting.runs.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_shl_operator_enqueues_in_order() {
        let rt = runtime();
        let agent = Agent::new(String::from("a"), &Executors::new(rt.handle().clone()));

        let append = |suffix: &'static str| {
            move |s: &String| -> Result<String, UpdateError> { Ok(format!("{s}{suffix}")) }
        };
        let _ = &agent << append("b") << append("c");
        assert!(agent.wait(WAIT));
        assert_eq!(agent.value().as_str(), "abc");
    }

    #[test]
    fn test_submit_without_update_returns_false() {
        let rt = runtime();
        let execs = Executors::new(rt.handle().clone());
        let agent = Agent::new(0u8, &execs);
        assert!(!agent.submit(None, Arc::clone(execs.fast())));
        assert!(agent.submit(Some(Box::new(|x| Ok(x + 1))), Arc::clone(execs.fast())));
        assert!(agent.wait(WAIT));
        assert_eq!(*agent.value(), 1);
    }

    #[test]
    fn test_dropped_update_is_a_runtime_failure() {
        let rt = runtime();
        let execs = Executors::new(rt.handle().clone());
        let agent = Agent::new(5i32, &execs);
        let kinds = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen = Arc::clone(&kinds);
        agent.rescue(ErrorKind::Any, move |err| {
            seen.lock().push(err.kind);
            Ok(())
        });

        // The rescue dispatch goes through the same dropping executor, so nothing is
        // recorded; only the value proves the update never committed.
        agent.post_on(Arc::new(Dropping), |_| Ok(99));
        assert!(agent.wait(WAIT));
        assert_eq!(*agent.value(), 5);
        assert!(kinds.lock().is_empty());
    }

    #[test]
    fn test_runtime_without_timers_still_applies_updates() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .build()
            .unwrap();
        let agent = Agent::builder(1i64)
            .timeout(Duration::from_secs(1))
            .build(&Executors::new(rt.handle().clone()));
        assert_eq!(agent.timeout(), None);

        assert!(agent.post(|x| Ok(x + 1)));
        assert!(agent.post_blocking(|x| Ok(x * 10)));
        assert!(agent.wait(WAIT));
        assert_eq!(*agent.value(), 20);
    }

    #[test]
    fn test_rescue_opt_none_is_noop() {
        let rt = runtime();
        let agent = Agent::new(0u8, &Executors::new(rt.handle().clone()));
        agent.rescue_opt(ErrorKind::Any, None);
        assert!(agent.shared.state.lock().rescuers.is_empty());
        agent.rescue(ErrorKind::Any, |_| Ok(())).rescue(ErrorKind::Type, |_| Ok(()));
        assert_eq!(agent.shared.state.lock().rescuers.len(), 2);
    }

    #[test]
    fn test_debug_shows_value() {
        let rt = runtime();
        let agent = Agent::builder(7u8)
            .name("counter")
            .build(&Executors::new(rt.handle().clone()));
        let dbg = format!("{agent:?}");
        assert!(dbg.contains("counter"));
        assert!(dbg.contains('7'));
    }
}
