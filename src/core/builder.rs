use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::{
    core::Config,
    error::{BoxError, ErrorKind, UpdateError},
    executors::{ExecutorRef, Executors, SerialQueue},
    observers::{Observe, ObserverSet},
    policies::{ReadTransform, Rescuer, RescuerChain, Validator},
};

use super::{
    agent::Agent,
    state::{Shared, State},
};

/// Custom read transform installed with [`AgentBuilder::copy_on_deref`].
type CopyOnDeref<T> = Box<dyn Fn(&T) -> T + Send + Sync>;

/// Builder for constructing an [`Agent`] with optional features.
pub struct AgentBuilder<T> {
    initial: T,
    name: Cow<'static, str>,
    cfg: Config,
    executor: Option<ExecutorRef>,
    copy: Option<CopyOnDeref<T>>,
    validator: Validator<T>,
    rescuers: RescuerChain,
    observers: Vec<Arc<dyn Observe<T>>>,
}

impl<T> AgentBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a new builder around the initial value, with [`Config::default`].
    pub fn new(initial: T) -> Self {
        Self {
            initial,
            name: Cow::Borrowed("agent"),
            cfg: Config::default(),
            executor: None,
            copy: None,
            validator: Validator::always(),
            rescuers: RescuerChain::new(),
            observers: Vec::new(),
        }
    }

    /// Sets the name used in logs.
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Replaces the whole option bundle.
    pub fn config(mut self, cfg: Config) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets the per-update time bound (`Duration::ZERO` = unbounded).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.cfg.timeout = timeout;
        self
    }

    /// Routes `post` to the blocking executor.
    pub fn blocking(mut self, blocking: bool) -> Self {
        self.cfg.blocking = blocking;
        self
    }

    /// Runs every update on `executor`, overriding both default selections.
    pub fn executor(mut self, executor: ExecutorRef) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Reads return a clone of the value.
    pub fn dup_on_deref(mut self, dup: bool) -> Self {
        self.cfg.dup_on_deref = dup;
        self
    }

    /// Accepted for configuration compatibility; see [`Config::freeze_on_deref`].
    pub fn freeze_on_deref(mut self, freeze: bool) -> Self {
        self.cfg.freeze_on_deref = freeze;
        self
    }

    /// Reads return `copy(&value)`; runs before dup.
    pub fn copy_on_deref<F>(mut self, copy: F) -> Self
    where
        F: Fn(&T) -> T + Send + Sync + 'static,
    {
        self.copy = Some(Box::new(copy));
        self
    }

    /// Installs the initial validator.
    pub fn validator<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.validator = Validator::new(predicate);
        self
    }

    /// Appends a rescuer for `kind`.
    pub fn rescue<F>(mut self, kind: ErrorKind, handler: F) -> Self
    where
        F: Fn(&UpdateError) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.rescuers.push(Rescuer::new(kind, Arc::new(handler)));
        self
    }

    /// Subscribes an observer from the start.
    pub fn observer(mut self, observer: Arc<dyn Observe<T>>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Builds and returns the agent.
    ///
    /// This consumes the builder and initializes:
    /// - the serial queue driver (spawned on the executors' runtime)
    /// - observer workers
    /// - executor selection (explicit override, else blocking/fast per config)
    /// - the update timeout (dropped if the runtime has no time driver)
    pub fn build(self, executors: &Executors) -> Agent<T> {
        let handle = executors.handle();

        let (task_executor, blocking_executor) = match self.executor {
            Some(exec) => (Arc::clone(&exec), exec),
            None => {
                let blocking = Arc::clone(executors.blocking());
                let task = if self.cfg.blocking {
                    Arc::clone(&blocking)
                } else {
                    Arc::clone(executors.fast())
                };
                (task, blocking)
            }
        };

        let mut transform = ReadTransform::identity().with_dup(self.cfg.dup_on_deref);
        if let Some(copy) = self.copy {
            transform = transform.with_copy(copy);
        }

        let observers = ObserverSet::new(handle.clone());
        for observer in self.observers {
            observers.subscribe(observer);
        }

        Agent::from_shared(Arc::new(Shared {
            name: self.name,
            state: Mutex::new(State {
                value: Arc::new(self.initial),
                validator: self.validator,
                rescuers: self.rescuers,
            }),
            observers,
            transform,
            timeout: self.cfg.update_timeout().filter(|_| executors.timers_enabled()),
            task_executor,
            blocking_executor,
            serializer: SerialQueue::new(handle),
        }))
    }
}
