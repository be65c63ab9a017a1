//! # Change notifications emitted by agents.
//!
//! A [`Change`] is published after every committed update. It carries the
//! read-transformed value, a wall-clock timestamp and a global sequence number.
//!
//! ## Ordering guarantees
//! `seq` increases monotonically across all agents in the process. Changes of one
//! agent are committed in update order, so their `seq` values follow that order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for change ordering.
static CHANGE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Committed value of an agent at a point in time.
#[derive(Debug)]
pub struct Change<T> {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock time of the commit.
    pub at: SystemTime,
    /// Value after the commit, as returned by the agent's read transform.
    pub value: Arc<T>,
}

impl<T> Change<T> {
    /// Creates a change stamped with the current time and the next sequence number.
    pub fn now(value: Arc<T>) -> Self {
        Self {
            seq: CHANGE_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            value,
        }
    }
}

impl<T> Clone for Change<T> {
    fn clone(&self) -> Self {
        Self {
            seq: self.seq,
            at: self.at,
            value: Arc::clone(&self.value),
        }
    }
}
