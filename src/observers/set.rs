//! # ObserverSet: non-blocking fan-out over the observers of one agent
//!
//! [`ObserverSet`] maps each subscribed observer to a bounded queue drained by a
//! dedicated worker task, and distributes every [`Change`] **without awaiting**
//! the observers.
//!
//! ## What it guarantees
//! - `notify(thunk)` returns immediately.
//! - The payload thunk runs only if at least one observer is subscribed.
//! - Per-observer FIFO (queue order).
//! - Panics inside observers are caught and logged (isolation).
//!
//! ## What it does **not** guarantee
//! - No ordering across different observers.
//! - No retries on per-observer queue overflow (changes are dropped for that observer).
//!
//! ## Diagram
//! ```text
//!    notify(|| Change)
//!        │                        (Arc-clone per observer)
//!        ├────────────────► [queue O1] ─► worker O1 ─► on_change()
//!        ├────────────────► [queue O2] ─► worker O2 ─► on_change()
//!        └────────────────► [queue ON] ─► worker ON ─► on_change()
//! ```

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use parking_lot::RwLock;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::error::panic_message;

use super::{Change, Observe};

/// Identifier returned by [`ObserverSet::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Per-observer channel metadata.
struct ObserverChannel<T> {
    id: ObserverId,
    name: &'static str,
    sender: mpsc::Sender<Arc<Change<T>>>,
}

/// Fan-out with per-observer bounded queues and worker tasks.
pub struct ObserverSet<T> {
    handle: Handle,
    next_id: AtomicU64,
    channels: RwLock<Vec<ObserverChannel<T>>>,
}

impl<T> ObserverSet<T>
where
    T: Send + Sync + 'static,
{
    /// Creates an empty set; workers are spawned on `handle`.
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            next_id: AtomicU64::new(0),
            channels: RwLock::new(Vec::new()),
        }
    }

    /// Adds `observer` and spawns its worker.
    pub fn subscribe(&self, observer: Arc<dyn Observe<T>>) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let cap = observer.queue_capacity().max(1);
        let name = observer.name();
        let (tx, mut rx) = mpsc::channel::<Arc<Change<T>>>(cap);

        self.handle.spawn(async move {
            while let Some(change) = rx.recv().await {
                let fut = observer.on_change(change.as_ref());
                if let Err(panic_err) = AssertUnwindSafe(fut).catch_unwind().await {
                    tracing::warn!(
                        observer = observer.name(),
                        reason = %panic_message(&*panic_err),
                        "observer panicked"
                    );
                }
            }
        });

        self.channels.write().push(ObserverChannel {
            id,
            name,
            sender: tx,
        });
        id
    }

    /// Removes the observer registered under `id`.
    ///
    /// Its worker finishes the changes already queued, then exits.
    /// Returns `false` if `id` is unknown.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut channels = self.channels.write();
        let before = channels.len();
        channels.retain(|ch| ch.id != id);
        channels.len() != before
    }

    /// Fans out one change to all observers (non-blocking).
    ///
    /// `payload` is evaluated at most once, and only when the set is non-empty.
    /// If an observer's queue is **full** or **closed**, the change is dropped for
    /// it and a warning is logged with the observer's name.
    pub fn notify<F>(&self, payload: F)
    where
        F: FnOnce() -> Change<T>,
    {
        let channels = self.channels.read();
        if channels.is_empty() {
            return;
        }
        let change = Arc::new(payload());
        for channel in channels.iter() {
            match channel.sender.try_send(Arc::clone(&change)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(observer = channel.name, "change dropped: queue full");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::warn!(observer = channel.name, "change dropped: worker closed");
                }
            }
        }
    }

    /// True if there are no observers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.read().is_empty()
    }

    /// Number of observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.read().len()
    }
}
