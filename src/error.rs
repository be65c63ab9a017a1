//! Error types used by agents and their updates.
//!
//! This module defines:
//!
//! - [`ErrorKind`]: an explicit kind hierarchy used to route failures to rescuers.
//! - [`UpdateError`]: the failure of a single update (raised, panicked or timed out).
//! - [`AgentError`]: failures of the agent plumbing itself (closed queue, missing update).
//!
//! The types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//!
//! ## Kind hierarchy
//! ```text
//! Any
//!  └─ Standard
//!      ├─ Argument
//!      ├─ Type
//!      ├─ Runtime
//!      │   └─ Timeout
//!      ├─ Panic
//!      └─ Custom(kind)   (parent chosen by the application, any kind above)
//! ```

use std::any::Any;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Boxed error returned by rescue handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// # Kind of an update failure.
///
/// Kinds form a tree rooted at [`ErrorKind::Any`]. A rescuer registered for a kind
/// matches every error whose kind [is a subkind of](ErrorKind::is_subkind_of) it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Root of the hierarchy; matches every failure.
    Any,
    /// Every ordinary failure (all kinds below `Any`).
    Standard,
    /// The update received an argument it cannot work with.
    Argument,
    /// The update received a value of the wrong shape.
    Type,
    /// Generic runtime failure.
    Runtime,
    /// The update did not finish within the agent's timeout.
    Timeout,
    /// The update function or the validator panicked.
    Panic,
    /// Application-defined kind; its place in the tree is [`CustomKind::parent`].
    Custom(&'static CustomKind),
}

/// # Application-defined error kind.
///
/// Declared as a `static` so kinds can refer to each other and form their own
/// subtree below any built-in kind.
///
/// # Example
/// ```
/// use agentcell::{CustomKind, ErrorKind};
///
/// static DB: CustomKind = CustomKind::new("db", ErrorKind::Runtime);
/// static DB_TIMEOUT: CustomKind = CustomKind::new("db_timeout", ErrorKind::Custom(&DB));
///
/// let kind = ErrorKind::Custom(&DB_TIMEOUT);
/// assert!(kind.is_subkind_of(&ErrorKind::Custom(&DB)));
/// assert!(kind.is_subkind_of(&ErrorKind::Runtime));
/// assert!(!kind.is_subkind_of(&ErrorKind::Argument));
/// ```
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct CustomKind {
    /// Label used in logs and for equality.
    pub name: &'static str,
    /// Direct parent in the kind hierarchy.
    pub parent: ErrorKind,
}

impl CustomKind {
    /// Declares a kind named `name` directly below `parent`.
    pub const fn new(name: &'static str, parent: ErrorKind) -> Self {
        Self { name, parent }
    }
}

impl ErrorKind {
    /// Returns the direct parent of this kind, `None` for [`ErrorKind::Any`].
    pub fn parent(&self) -> Option<ErrorKind> {
        match self {
            ErrorKind::Any => None,
            ErrorKind::Standard => Some(ErrorKind::Any),
            ErrorKind::Timeout => Some(ErrorKind::Runtime),
            ErrorKind::Custom(custom) => Some(custom.parent),
            ErrorKind::Argument | ErrorKind::Type | ErrorKind::Runtime | ErrorKind::Panic => {
                Some(ErrorKind::Standard)
            }
        }
    }

    /// Returns `true` if `self` equals `other` or descends from it.
    ///
    /// # Example
    /// ```
    /// use agentcell::ErrorKind;
    ///
    /// assert!(ErrorKind::Timeout.is_subkind_of(&ErrorKind::Runtime));
    /// assert!(ErrorKind::Type.is_subkind_of(&ErrorKind::Any));
    /// assert!(!ErrorKind::Type.is_subkind_of(&ErrorKind::Argument));
    /// ```
    pub fn is_subkind_of(&self, other: &ErrorKind) -> bool {
        let mut current = Some(*self);
        while let Some(kind) = current {
            if kind == *other {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// Custom kinds return their own name.
    pub fn as_label(&self) -> &'static str {
        match self {
            ErrorKind::Any => "any",
            ErrorKind::Standard => "standard",
            ErrorKind::Argument => "argument",
            ErrorKind::Type => "type",
            ErrorKind::Runtime => "runtime",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Panic => "panic",
            ErrorKind::Custom(custom) => custom.name,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// # Failure of a single update.
///
/// Returned by update functions, synthesized by the agent on timeout or panic,
/// and handed to the first matching rescuer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} error: {message}")]
pub struct UpdateError {
    /// Kind used for rescuer matching.
    pub kind: ErrorKind,
    /// Human-readable detail.
    pub message: String,
}

impl UpdateError {
    /// Creates an error of an arbitrary kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for [`ErrorKind::Argument`].
    pub fn argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Argument, message)
    }

    /// Shorthand for [`ErrorKind::Type`].
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, message)
    }

    /// Shorthand for [`ErrorKind::Runtime`].
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Runtime, message)
    }

    /// Shorthand for [`ErrorKind::Custom`].
    pub fn custom(kind: &'static CustomKind, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Custom(kind), message)
    }

    /// Error synthesized when an update exceeds its time bound.
    pub fn timeout(after: Duration) -> Self {
        Self::new(ErrorKind::Timeout, format!("timed out after {after:?}"))
    }

    /// Error synthesized from a caught panic payload.
    pub fn panicked(payload: &(dyn Any + Send)) -> Self {
        Self::new(ErrorKind::Panic, panic_message(payload))
    }

    /// Returns `true` if this error's kind is `kind` or one of its subkinds.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind.is_subkind_of(&kind)
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use agentcell::UpdateError;
    /// use std::time::Duration;
    ///
    /// let err = UpdateError::timeout(Duration::from_millis(10));
    /// assert_eq!(err.as_label(), "timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        self.kind.as_label()
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        format!("{}: {}", self.kind, self.message)
    }
}

/// # Errors produced by the agent plumbing.
///
/// These never describe the outcome of an update; they report that an update
/// could not be scheduled at all.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// The serial driver is gone (its runtime shut down), nothing can be enqueued.
    #[error("update queue closed")]
    QueueClosed,

    /// No update function was supplied.
    #[error("no update function supplied")]
    MissingUpdate,
}

impl AgentError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use agentcell::AgentError;
    ///
    /// assert_eq!(AgentError::QueueClosed.as_label(), "agent_queue_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            AgentError::QueueClosed => "agent_queue_closed",
            AgentError::MissingUpdate => "agent_missing_update",
        }
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
