//! # Validator: commit gate for update results.
//!
//! An agent has exactly one active validator; setting a new one replaces the old.
//! A rejected result is discarded silently: no error, no rescue, no notification.

use std::fmt;
use std::sync::Arc;

/// Predicate `(candidate) -> bool` deciding whether a result is committed.
pub struct Validator<T> {
    check: Arc<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> Validator<T> {
    /// Wraps `predicate` into a validator.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            check: Arc::new(predicate),
        }
    }

    /// Validator accepting every value (the default).
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    /// Returns `true` if `candidate` may be committed.
    pub fn check(&self, candidate: &T) -> bool {
        (self.check)(candidate)
    }
}

impl<T> Default for Validator<T> {
    fn default() -> Self {
        Self::always()
    }
}

impl<T> Clone for Validator<T> {
    fn clone(&self) -> Self {
        Self {
            check: Arc::clone(&self.check),
        }
    }
}

impl<T> fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator").finish_non_exhaustive()
    }
}
