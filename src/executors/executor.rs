//! # Executor abstraction.
//!
//! An [`Executor`] accepts a nullary [`Task`] and runs it asynchronously. It makes
//! no ordering promise across unrelated submissions; ordering per agent comes from
//! the agent's [`SerialQueue`](crate::SerialQueue).
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use agentcell::{Executor, ExecutorRef, Task};
//!
//! /// Runs every task inline on the caller's thread.
//! struct Inline;
//!
//! impl Executor for Inline {
//!     fn execute(&self, task: Task) {
//!         task();
//!     }
//!
//!     fn name(&self) -> &'static str { "inline" }
//! }
//!
//! let exec: ExecutorRef = Arc::new(Inline);
//! exec.execute(Box::new(|| println!("ran")));
//! ```

use std::sync::Arc;

/// Unit of work accepted by an [`Executor`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Shared handle to an executor (`Arc<dyn Executor>`).
pub type ExecutorRef = Arc<dyn Executor>;

/// Runs submitted tasks asynchronously.
///
/// ### Implementation requirements
/// - `execute` must not block the caller until the task finishes.
/// - A task that is dropped without running is reported by the agent as a
///   runtime failure of the corresponding update.
pub trait Executor: Send + Sync + 'static {
    /// Schedules `task` for execution.
    fn execute(&self, task: Task);

    /// Returns the executor name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
