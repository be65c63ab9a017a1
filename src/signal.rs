//! # One-shot completion signal.
//!
//! [`CompletionSignal`] is a flag that flips from unset to set exactly once.
//! Waiters can block a thread ([`CompletionSignal::wait`]) or await it inside a
//! runtime ([`CompletionSignal::wait_async`]), both with an optional timeout.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use agentcell::CompletionSignal;
//!
//! let signal = Arc::new(CompletionSignal::new());
//! let setter = Arc::clone(&signal);
//! std::thread::spawn(move || setter.set());
//!
//! assert!(signal.wait(Some(Duration::from_secs(5))));
//! ```

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tokio::sync::Notify;
use tokio::time;

/// One-shot flag with blocking and async waits.
#[derive(Debug, Default)]
pub struct CompletionSignal {
    fired: Mutex<bool>,
    cond: Condvar,
    notify: Notify,
}

impl CompletionSignal {
    /// Creates an unset signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the signal and wakes every waiter. Later calls are no-ops.
    pub fn set(&self) {
        let mut fired = self.fired.lock();
        if *fired {
            return;
        }
        *fired = true;
        self.cond.notify_all();
        drop(fired);
        self.notify.notify_waiters();
    }

    /// Returns `true` once the signal has been set.
    #[must_use]
    pub fn is_set(&self) -> bool {
        *self.fired.lock()
    }

    /// Blocks the calling thread until the signal is set or `timeout` elapses.
    ///
    /// `None` waits indefinitely. Returns whether the signal was set.
    ///
    /// Do not call this from a runtime worker thread; use [`Self::wait_async`] there.
    pub fn wait(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let mut fired = self.fired.lock();
        while !*fired {
            match deadline {
                Some(deadline) => {
                    if self.cond.wait_until(&mut fired, deadline).timed_out() {
                        return *fired;
                    }
                }
                None => self.cond.wait(&mut fired),
            }
        }
        true
    }

    /// Awaits the signal or `timeout`, whichever comes first.
    ///
    /// `None` waits indefinitely. Returns whether the signal was set.
    pub async fn wait_async(&self, timeout: Option<Duration>) -> bool {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent `set` is not missed.
        notified.as_mut().enable();
        if self.is_set() {
            return true;
        }
        match timeout {
            Some(t) => time::timeout(t, notified).await.is_ok() || self.is_set(),
            None => {
                notified.await;
                true
            }
        }
    }
}
