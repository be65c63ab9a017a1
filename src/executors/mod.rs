//! # Execution services used by agents.
//!
//! - [`Executor`] - trait for anything that runs a nullary [`Task`] asynchronously
//! - [`RuntimeExecutor`] - tokio-backed executor, fast or blocking flavour
//! - [`Executors`] - the pair of default executors shared by every agent
//! - [`SerialQueue`] - FIFO, one-at-a-time job driver owned by a single agent

mod executor;
mod runtime;
mod serial;

pub use executor::{Executor, ExecutorRef, Task};
pub use runtime::{Executors, Flavor, RuntimeExecutor};
pub use serial::{Job, SerialQueue};
