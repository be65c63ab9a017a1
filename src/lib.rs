//! # agentcell
//!
//! **agentcell** provides [`Agent`]: an asynchronous identity cell holding one
//! value, updated exclusively by queued functions that run one at a time, in
//! submission order, on a background executor.
//!
//! Readers never block, writers never block, and the value never observes
//! interleaved writes even when many threads post concurrently.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   thread A        thread B        thread C
//!   post(f1)        post(f2)        value()
//!      │               │               │
//!      ▼               ▼               │  lock ─► Arc clone ─► unlock
//! ┌───────────────────────────────┐    │  ─► ReadTransform
//! │ SerialQueue (one per agent)   │    ▼
//! │  FIFO, one job at a time      │  Arc<T>
//! └──────────────┬────────────────┘
//!                ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │ runner::run_update                                            │
//! │  1. lock: snapshot value + validator                          │
//! │  2. executor (fast | blocking): f(&value), validator(&next)   │
//! │     bounded by Config::timeout                                │
//! │  3. lock: commit if Ok && valid                               │
//! │  4. ObserverSet::notify(Change)        (committed only)       │
//! │  5. RescuerChain::dispatch(err)        (failed only)          │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Outcomes
//! ```text
//! f Ok, valid      ─► commit ─► notify observers
//! f Ok, invalid    ─► discard silently (no error, no rescue, no notification)
//! f Err / panic    ─► discard ─► first matching rescuer
//! timeout exceeded ─► discard ─► first matching rescuer (ErrorKind::Timeout)
//! rescuer fails    ─► logged, contained
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                          |
//! |-------------------|----------------------------------------------------------------|---------------------------------------------|
//! | **Agent**         | Read, post, wait on a single-value cell.                        | [`Agent`], [`AgentBuilder`], [`Config`]     |
//! | **Policies**      | Validate results, route failures, transform reads.             | [`Validator`], [`RescuerChain`], [`ReadTransform`] |
//! | **Execution**     | Pluggable executors and the per-agent serial queue.            | [`Executor`], [`Executors`], [`SerialQueue`] |
//! | **Observers**     | React to committed changes.                                    | [`Observe`], [`ObserverSet`], [`Change`]    |
//! | **Errors**        | Kind hierarchy for update failures.                            | [`ErrorKind`], [`UpdateError`], [`AgentError`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogObserver`] _(demo/reference only)_.
//!
//! ## Limitations
//! Timeouts are best-effort. Executors cannot preempt arbitrary code, so an
//! update that overruns is reported as failed while the function itself keeps
//! running on its executor thread until it returns; its result is then dropped.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use agentcell::{Agent, ErrorKind, Executors, UpdateError};
//!
//! let rt = tokio::runtime::Runtime::new()?;
//! let executors = Executors::new(rt.handle().clone());
//!
//! let balance = Agent::builder(100i64)
//!     .name("balance")
//!     .validator(|v| *v >= 0)
//!     .build(&executors);
//!
//! balance.rescue(ErrorKind::Argument, |err| {
//!     eprintln!("rejected: {err}");
//!     Ok(())
//! });
//!
//! balance.post(|v| Ok(v - 30));
//! balance.post(|v| Ok(v - 500)); // rejected by the validator, silently
//! balance.post(|_| Err(UpdateError::argument("bad amount")));
//!
//! assert!(balance.wait(Some(Duration::from_secs(5))));
//! assert_eq!(*balance.value(), 70);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod core;
mod error;
mod executors;
mod observers;
mod policies;
mod signal;

// ---- Public re-exports ----

pub use crate::core::{Agent, AgentBuilder, Config, DEFAULT_TIMEOUT, Update};
pub use error::{AgentError, BoxError, CustomKind, ErrorKind, UpdateError};
pub use executors::{Executor, ExecutorRef, Executors, Flavor, Job, RuntimeExecutor, SerialQueue, Task};
pub use observers::{Change, Observe, ObserverId, ObserverSet};
pub use policies::{ReadTransform, RescueHandler, RescueOutcome, Rescuer, RescuerChain, Validator};
pub use signal::CompletionSignal;

// Optional: expose a simple built-in logging observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use observers::LogObserver;
