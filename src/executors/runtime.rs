//! # Tokio-backed executors.
//!
//! [`RuntimeExecutor`] runs tasks on a tokio runtime in one of two flavours:
//!
//! ```text
//! Flavor::Fast     ──► Handle::spawn        (runtime worker threads; short, non-blocking work)
//! Flavor::Blocking ──► Handle::spawn_blocking (blocking pool; long or blocking work)
//! ```
//!
//! [`Executors`] bundles one executor of each flavour. Create it once per process
//! (or per runtime) and hand it to every agent; agents never look executors up
//! on their own.

use std::panic;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time;

use super::executor::{Executor, ExecutorRef, Task};

/// Where a [`RuntimeExecutor`] places its tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Runtime worker threads.
    Fast,
    /// The runtime's blocking thread pool.
    Blocking,
}

/// Executor over a tokio runtime [`Handle`].
#[derive(Debug, Clone)]
pub struct RuntimeExecutor {
    handle: Handle,
    flavor: Flavor,
}

impl RuntimeExecutor {
    /// Executor for short, non-blocking tasks.
    pub fn fast(handle: Handle) -> Self {
        Self {
            handle,
            flavor: Flavor::Fast,
        }
    }

    /// Executor for long-running or blocking tasks.
    pub fn blocking(handle: Handle) -> Self {
        Self {
            handle,
            flavor: Flavor::Blocking,
        }
    }

    /// Returns the flavour of this executor.
    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Wraps the executor into a shared [`ExecutorRef`].
    pub fn into_ref(self) -> ExecutorRef {
        Arc::new(self)
    }
}

impl Executor for RuntimeExecutor {
    fn execute(&self, task: Task) {
        match self.flavor {
            Flavor::Fast => {
                self.handle.spawn(async move { task() });
            }
            Flavor::Blocking => {
                self.handle.spawn_blocking(task);
            }
        }
    }

    fn name(&self) -> &'static str {
        match self.flavor {
            Flavor::Fast => "fast",
            Flavor::Blocking => "blocking",
        }
    }
}

/// Default executors shared by agents.
///
/// Holds the runtime handle (used for agent-internal drivers) plus one fast and
/// one blocking executor. Cheap to clone.
#[derive(Clone)]
pub struct Executors {
    handle: Handle,
    fast: ExecutorRef,
    blocking: ExecutorRef,
    timers: bool,
}

impl Executors {
    /// Builds the default pair on top of `handle`.
    ///
    /// Agent timeouts need the runtime's time driver (`enable_time` or
    /// `enable_all`). Without it an error is logged once here and agents built
    /// from these executors run their updates without a time bound.
    pub fn new(handle: Handle) -> Self {
        let timers = timers_enabled(&handle);
        if !timers {
            tracing::error!("runtime has no time driver; agent timeouts are disabled");
        }
        Self {
            fast: RuntimeExecutor::fast(handle.clone()).into_ref(),
            blocking: RuntimeExecutor::blocking(handle.clone()).into_ref(),
            handle,
            timers,
        }
    }

    /// Builds the default pair on the runtime the caller is running in.
    ///
    /// Returns `None` outside of a tokio runtime context.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }

    /// Replaces the executor used for short tasks.
    pub fn with_fast(mut self, fast: ExecutorRef) -> Self {
        self.fast = fast;
        self
    }

    /// Replaces the executor used for blocking tasks.
    pub fn with_blocking(mut self, blocking: ExecutorRef) -> Self {
        self.blocking = blocking;
        self
    }

    /// Runtime handle used to spawn agent-internal drivers.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Executor for short tasks.
    pub fn fast(&self) -> &ExecutorRef {
        &self.fast
    }

    /// Executor for blocking tasks.
    pub fn blocking(&self) -> &ExecutorRef {
        &self.blocking
    }

    /// Whether the runtime can drive agent timeouts.
    pub fn timers_enabled(&self) -> bool {
        self.timers
    }
}

/// Tokio panics when a timer is created on a runtime without a time driver.
fn timers_enabled(handle: &Handle) -> bool {
    let _entered = handle.enter();
    panic::catch_unwind(|| drop(time::sleep(Duration::ZERO))).is_ok()
}
