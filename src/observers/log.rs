//! # LogObserver - change logger
//!
//! A minimal observer that logs every committed change through `tracing`.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! INFO agentcell: [changed] seq=3 value=110
//! ```

use std::fmt::Debug;

use async_trait::async_trait;

use super::{Change, Observe};

/// Change logging observer.
#[derive(Default)]
pub struct LogObserver;

impl LogObserver {
    /// Construct a new [`LogObserver`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<T> Observe<T> for LogObserver
where
    T: Debug + Send + Sync + 'static,
{
    async fn on_change(&self, change: &Change<T>) {
        tracing::info!(seq = change.seq, value = ?change.value, "[changed]");
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
