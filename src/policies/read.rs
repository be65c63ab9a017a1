//! # Read transform applied on every value read.
//!
//! Agents store their value behind an `Arc<T>`. A [`ReadTransform`] decides what a
//! reader gets back:
//!
//! ```text
//! stored Arc<T> ──► copy (custom fn, optional) ──► dup (clone, optional) ──► reader
//! ```
//!
//! Steps run in that order, each one only if enabled. Readers only ever get an
//! `Arc<T>`, which is immutable, so there is no separate freeze step.

use std::fmt;
use std::sync::Arc;

/// Copy function used by [`ReadTransform::with_copy`].
type CopyFn<T> = Arc<dyn Fn(&T) -> T + Send + Sync>;

/// Policy turning the stored value into the value handed to readers.
pub struct ReadTransform<T> {
    copy: Option<CopyFn<T>>,
    dup: bool,
}

impl<T> ReadTransform<T>
where
    T: Clone,
{
    /// Hands out the stored handle unchanged.
    pub fn identity() -> Self {
        Self {
            copy: None,
            dup: false,
        }
    }

    /// Enables or disables duplicating the value on each read.
    pub fn with_dup(mut self, dup: bool) -> Self {
        self.dup = dup;
        self
    }

    /// Installs a custom copy function, run before `dup`.
    pub fn with_copy<F>(mut self, copy: F) -> Self
    where
        F: Fn(&T) -> T + Send + Sync + 'static,
    {
        self.copy = Some(Arc::new(copy));
        self
    }

    /// Returns `true` when reads hand out the stored allocation itself.
    pub fn is_sharing(&self) -> bool {
        self.copy.is_none() && !self.dup
    }

    /// Applies the transform to `value`.
    pub fn apply(&self, value: &Arc<T>) -> Arc<T> {
        let mut out = Arc::clone(value);
        if let Some(copy) = &self.copy {
            out = Arc::new(copy(&out));
        }
        if self.dup {
            out = Arc::new(T::clone(&out));
        }
        out
    }
}

impl<T: Clone> Default for ReadTransform<T> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<T> fmt::Debug for ReadTransform<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadTransform")
            .field("copy", &self.copy.is_some())
            .field("dup", &self.dup)
            .finish()
    }
}
