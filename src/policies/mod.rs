//! # Per-agent update policies.
//!
//! - [`Validator`] - predicate gating whether an update's result is committed
//! - [`RescuerChain`] / [`Rescuer`] - ordered routing of update failures to handlers
//! - [`ReadTransform`] - transform applied to the value whenever it is read

mod read;
mod rescue;
mod validator;

pub use read::ReadTransform;
pub use rescue::{RescueHandler, RescueOutcome, Rescuer, RescuerChain};
pub use validator::Validator;
