//! # Run a single update of an agent.
//!
//! Executes one queued update with the agent's timeout, then commits or
//! discards its result, notifies observers and routes failures to rescuers.
//! Runs inside the agent's [`SerialQueue`](crate::SerialQueue) driver, so at
//! most one update per agent is in here at any time.
//!
//! ## Flow
//!
//! ```text
//! lock ─► snapshot (value, validator) ─► unlock
//!   │
//!   ├─► executor.execute( update(&snapshot) → validator(&result) )
//!   │       awaited under `timeout` (if configured)
//!   │
//!   ├─ Ok + valid   ──► lock ─► value = result ─► unlock ─► notify observers
//!   ├─ Ok + invalid ──► discard silently (no rescue, no notification)
//!   └─ Err / panic / timeout ──► rescuers.dispatch(err) on the same executor
//! ```
//!
//! ## Rules
//! - The lock is **never** held while the update function, the validator, a
//!   rescue handler or an observer runs.
//! - A timeout is a synthesized failure, not an interruption: the function keeps
//!   running on its executor and its late result is dropped.
//! - A panic in the update function or the validator becomes an
//!   [`ErrorKind::Panic`](crate::ErrorKind::Panic) failure.
//! - Rescue handler failures are contained by [`RescuerChain::dispatch`](crate::RescuerChain::dispatch).

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time;

use crate::{
    error::UpdateError,
    executors::{Executor, ExecutorRef},
    observers::Change,
    policies::Validator,
};

use super::state::Shared;

/// Update function queued on an agent: current value in, next value out.
pub type Update<T> = Box<dyn FnOnce(&T) -> Result<T, UpdateError> + Send + 'static>;

/// What one attempt produced.
enum Outcome<T> {
    Accepted(T),
    Rejected,
    Failed(UpdateError),
}

/// Runs `update` against the agent behind `shared`.
pub(crate) async fn run_update<T>(shared: Arc<Shared<T>>, executor: ExecutorRef, update: Update<T>)
where
    T: Clone + Send + Sync + 'static,
{
    let (snapshot, validator) = shared.snapshot();

    match attempt(executor.as_ref(), shared.timeout, snapshot, validator, update).await {
        Outcome::Accepted(next) => {
            let value = shared.commit(next);
            tracing::debug!(agent = %shared.name, executor = executor.name(), "update committed");
            shared
                .observers
                .notify(|| Change::now(shared.transform.apply(&value)));
        }
        Outcome::Rejected => {
            tracing::debug!(agent = %shared.name, "update rejected by validator");
        }
        Outcome::Failed(err) => {
            tracing::debug!(agent = %shared.name, kind = err.as_label(), error = %err, "update failed");
            let rescuers = shared.rescuers();
            if offload(executor.as_ref(), move || rescuers.dispatch(&err))
                .await
                .is_err()
            {
                tracing::warn!(
                    agent = %shared.name,
                    executor = executor.name(),
                    "rescue dispatch dropped by executor"
                );
            }
        }
    }
}

/// Runs the update function and the validator on `executor`, bounded by `timeout`.
async fn attempt<T>(
    executor: &dyn Executor,
    timeout: Option<Duration>,
    snapshot: Arc<T>,
    validator: Validator<T>,
    update: Update<T>,
) -> Outcome<T>
where
    T: Send + Sync + 'static,
{
    let work = offload(executor, move || {
        panic::catch_unwind(AssertUnwindSafe(|| -> Result<(T, bool), UpdateError> {
            let next = update(&snapshot)?;
            let valid = validator.check(&next);
            Ok((next, valid))
        }))
        .unwrap_or_else(|panic_err| Err(UpdateError::panicked(&*panic_err)))
    });

    let reply = match timeout {
        Some(dur) => match time::timeout(dur, work).await {
            Ok(reply) => reply,
            Err(_elapsed) => return Outcome::Failed(UpdateError::timeout(dur)),
        },
        None => work.await,
    };

    match reply {
        Ok(Ok((next, true))) => Outcome::Accepted(next),
        Ok(Ok((_, false))) => Outcome::Rejected,
        Ok(Err(err)) => Outcome::Failed(err),
        Err(_dropped) => Outcome::Failed(UpdateError::runtime(format!(
            "executor '{}' dropped the update before it ran",
            executor.name()
        ))),
    }
}

/// Runs `f` on `executor` and awaits its result.
///
/// Errors if the executor drops the task without running it.
async fn offload<F, R>(executor: &dyn Executor, f: F) -> Result<R, oneshot::error::RecvError>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    executor.execute(Box::new(move || {
        let _ = tx.send(f());
    }));
    rx.await
}
