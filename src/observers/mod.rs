//! # Change observers for agents.
//!
//! Every committed update produces a [`Change`] that is fanned out to the
//! agent's observers through its [`ObserverSet`].
//!
//! ## Architecture
//! ```text
//! work protocol ── commit ──► ObserverSet::notify(|| Change)
//!                                   │  (payload built only if someone listens)
//!                                   ├──► [queue 1] ──► worker 1 ──► observer1.on_change()
//!                                   ├──► [queue 2] ──► worker 2 ──► observer2.on_change()
//!                                   └──► [queue N] ──► worker N ──► observerN.on_change()
//! ```
//!
//! ## Implementing custom observers
//! ```no_run
//! use agentcell::{Change, Observe};
//! use async_trait::async_trait;
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Observe<u64> for Audit {
//!     async fn on_change(&self, change: &Change<u64>) {
//!         println!("#{} -> {}", change.seq, change.value);
//!     }
//! }
//! ```

mod change;
#[cfg(feature = "logging")]
mod log;
mod observer;
mod set;

pub use change::Change;
#[cfg(feature = "logging")]
pub use log::LogObserver;
pub use observer::Observe;
pub use set::{ObserverId, ObserverSet};
