//! # Observer trait.
//!
//! [`Observe`] is the extension point for reacting to committed updates.
//!
//! Each observer gets:
//! - **Dedicated worker task** (runs independently of the agent)
//! - **Per-observer bounded queue** (capacity via [`Observe::queue_capacity`])
//! - **Panic isolation** (panics are caught and logged)
//!
//! ## Rules
//! - A slow observer only affects its own queue.
//! - Queue overflow drops the change **for this observer only**.
//! - Changes are processed sequentially (FIFO) per observer.
//! - Observers never block the agent or each other.

use async_trait::async_trait;

use super::Change;

/// Receiver of committed changes.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Observe<T>: Send + Sync + 'static {
    /// Processes a single change.
    ///
    /// Called from the observer's worker task, never while the agent holds its lock.
    async fn on_change(&self, change: &Change<T>);

    /// Returns the observer name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this observer.
    ///
    /// The set clamps capacity to a minimum of 1.
    ///
    /// Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
