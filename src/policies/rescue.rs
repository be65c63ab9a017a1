//! # Rescuers: routing update failures to handlers.
//!
//! A [`RescuerChain`] is an ordered list of `(kind, handler)` pairs. When an
//! update fails, the chain is scanned in insertion order and the **first**
//! rescuer whose kind is a super-kind of (or equal to) the error's kind handles it.
//!
//! ## Dispatch
//! ```text
//! UpdateError{kind}
//!   └─► for rescuer in chain (insertion order):
//!         kind.is_subkind_of(rescuer.kind)?
//!           ├─ yes ─► handler(&err)
//!           │           ├─ Ok(())  ─► Handled
//!           │           ├─ Err(e)  ─► logged ─► HandlerFailed
//!           │           └─ panic   ─► logged ─► HandlerFailed
//!           └─ no  ─► next
//!   none matched ─► logged at debug ─► Unmatched
//! ```
//!
//! Handler failures never propagate.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::{BoxError, ErrorKind, UpdateError, panic_message};

/// Handler invoked with the failure of an update.
pub type RescueHandler = Arc<dyn Fn(&UpdateError) -> Result<(), BoxError> + Send + Sync>;

/// One `(kind, handler)` entry of a [`RescuerChain`].
#[derive(Clone)]
pub struct Rescuer {
    kind: ErrorKind,
    handler: RescueHandler,
}

impl Rescuer {
    /// Creates a rescuer for `kind` and all of its subkinds.
    pub fn new(kind: ErrorKind, handler: RescueHandler) -> Self {
        Self { kind, handler }
    }

    /// Kind this rescuer was registered for.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns `true` if this rescuer handles `err`.
    pub fn matches(&self, err: &UpdateError) -> bool {
        err.kind.is_subkind_of(&self.kind)
    }
}

impl fmt::Debug for Rescuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rescuer").field("kind", &self.kind).finish()
    }
}

/// Result of [`RescuerChain::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RescueOutcome {
    /// The first matching handler ran and returned `Ok`.
    Handled,
    /// The first matching handler returned `Err` or panicked.
    HandlerFailed,
    /// No rescuer matched; the error was swallowed.
    Unmatched,
}

/// Ordered, append-only list of rescuers.
#[derive(Clone, Default, Debug)]
pub struct RescuerChain {
    rescuers: Vec<Rescuer>,
}

impl RescuerChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rescuer; it is tried after every rescuer already present.
    pub fn push(&mut self, rescuer: Rescuer) {
        self.rescuers.push(rescuer);
    }

    /// Number of rescuers.
    pub fn len(&self) -> usize {
        self.rescuers.len()
    }

    /// True if the chain has no rescuers.
    pub fn is_empty(&self) -> bool {
        self.rescuers.is_empty()
    }

    /// Returns the first rescuer matching `err`.
    pub fn find(&self, err: &UpdateError) -> Option<&Rescuer> {
        self.rescuers.iter().find(|r| r.matches(err))
    }

    /// Runs the first matching handler for `err`, containing any failure it raises.
    pub fn dispatch(&self, err: &UpdateError) -> RescueOutcome {
        let Some(rescuer) = self.find(err) else {
            tracing::debug!(kind = err.as_label(), error = %err, "update failed, no rescuer matched");
            return RescueOutcome::Unmatched;
        };

        match panic::catch_unwind(AssertUnwindSafe(|| (rescuer.handler)(err))) {
            Ok(Ok(())) => RescueOutcome::Handled,
            Ok(Err(handler_err)) => {
                tracing::warn!(
                    kind = err.as_label(),
                    rescuer = rescuer.kind.as_label(),
                    error = %handler_err,
                    "rescue handler failed"
                );
                RescueOutcome::HandlerFailed
            }
            Err(panic_err) => {
                tracing::warn!(
                    kind = err.as_label(),
                    rescuer = rescuer.kind.as_label(),
                    reason = %panic_message(&*panic_err),
                    "rescue handler panicked"
                );
                RescueOutcome::HandlerFailed
            }
        }
    }
}
