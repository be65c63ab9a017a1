//! # Agent configuration.
//!
//! Provides [`Config`], the option bundle read once when an agent is built.
//!
//! Config is used in two ways:
//! 1. **Direct**: `Agent::builder(v).config(cfg).build(&executors)`
//! 2. **Piecewise**: builder setters (`timeout`, `blocking`, ...) edit the same fields
//!
//! ## Sentinel values
//! - `timeout = 0s` → no time bound on updates (treated as `None` by [`Config::update_timeout`])

use std::time::Duration;

/// Time bound applied to each update when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Construction-time options of an agent.
///
/// ## Field semantics
/// - `timeout`: bound on one update's function plus validation (`0s` = unbounded)
/// - `blocking`: route `post` to the blocking executor instead of the fast one
/// - `dup_on_deref`: reads return a clone of the value
/// - `freeze_on_deref`: no effect; reads always return a shared read-only handle
///
/// An explicit executor (see `AgentBuilder::executor`) overrides `blocking`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum wall-clock time for one update's function plus validation.
    ///
    /// An update exceeding it is treated as failed with a `Timeout` error. The
    /// function itself is not interrupted; its late result is discarded.
    pub timeout: Duration,

    /// Whether `post` runs updates on the blocking executor.
    pub blocking: bool,

    /// Whether reads duplicate the value before returning it.
    pub dup_on_deref: bool,

    /// Kept for configuration compatibility.
    ///
    /// Reads already hand out an immutable `Arc<T>`, so this changes nothing.
    pub freeze_on_deref: bool,
}

impl Config {
    /// Returns the per-update time bound as an `Option`.
    ///
    /// - `None` → updates are not time bounded
    /// - `Some(d)` → updates taking longer than `d` fail with a timeout
    #[inline]
    pub fn update_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `timeout = 5s` ([`DEFAULT_TIMEOUT`])
    /// - `blocking = false` (short updates on the fast executor)
    /// - `dup_on_deref = false`, `freeze_on_deref = false` (reads share the stored value)
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            blocking: false,
            dup_on_deref: false,
            freeze_on_deref: false,
        }
    }
}
