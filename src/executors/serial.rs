//! # SerialQueue: one-at-a-time FIFO job driver
//!
//! Every agent owns exactly one [`SerialQueue`]. Jobs enqueued on the same queue
//! run strictly one at a time, in submission order; the next job starts only
//! after the previous one finished.
//!
//! ## Architecture
//! ```text
//! enqueue(job) ──► [unbounded mpsc] ──► driver task ──► job.await ──► next job
//!                                              └─► panic caught → logged, driver continues
//!
//! enqueue(executor, task):
//!   job = { executor.execute(task + done); done.await }
//! ```
//!
//! ## Rules
//! - **FIFO**: jobs run in the order the channel observed them.
//! - **Single flight**: the driver awaits each job to completion before the next.
//! - **Panic isolation**: a panicking job does not stop the driver.
//! - **Drain on drop**: dropping the queue closes the channel; already enqueued
//!   jobs still run, then the driver exits.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

use crate::error::{AgentError, panic_message};

use super::executor::{ExecutorRef, Task};

/// Unit of work accepted by the queue driver.
pub type Job = BoxFuture<'static, ()>;

/// FIFO, non-overlapping job driver.
pub struct SerialQueue {
    sender: mpsc::UnboundedSender<Job>,
    pending: Arc<AtomicUsize>,
}

impl SerialQueue {
    /// Creates the queue and spawns its driver on `handle`.
    #[must_use]
    pub fn new(handle: &Handle) -> Self {
        let (sender, mut rx) = mpsc::unbounded_channel::<Job>();
        let pending = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&pending);

        handle.spawn(async move {
            while let Some(job) = rx.recv().await {
                if let Err(panic_err) = AssertUnwindSafe(job).catch_unwind().await {
                    tracing::error!(
                        reason = %panic_message(&*panic_err),
                        "serial job panicked"
                    );
                }
                counter.fetch_sub(1, Ordering::AcqRel);
            }
        });

        Self { sender, pending }
    }

    /// Appends `job` to the queue.
    ///
    /// Fails with [`AgentError::QueueClosed`] if the driver is gone.
    pub fn enqueue_job(&self, job: Job) -> Result<(), AgentError> {
        self.pending.fetch_add(1, Ordering::AcqRel);
        self.sender.send(job).map_err(|_| {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            AgentError::QueueClosed
        })
    }

    /// Appends `task` to the queue, dispatching it through `executor` when its turn comes.
    ///
    /// The queue waits for the task to finish (or to be dropped by the executor)
    /// before starting the next job.
    pub fn enqueue(&self, executor: ExecutorRef, task: Task) -> Result<(), AgentError> {
        self.enqueue_job(Box::pin(async move {
            let (done_tx, done_rx) = oneshot::channel::<()>();
            executor.execute(Box::new(move || {
                task();
                let _ = done_tx.send(());
            }));
            let _ = done_rx.await;
        }))
    }

    /// Number of jobs enqueued and not yet finished.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// True if every enqueued job has finished.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
