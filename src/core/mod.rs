//! Agent core: update serialization, validation and error routing.
//!
//! The public API from this module is [`Agent`], its [`AgentBuilder`] and the
//! [`Config`] bundle.
//!
//! Internal modules:
//! - [`agent`]: public handle; read, post, rescue/validate, wait;
//! - [`builder`]: resolves configuration and executors into a running agent;
//! - [`config`]: construction-time options and defaults;
//! - [`runner`]: executes one update (timeout, commit/discard, notify, rescue);
//! - [`state`]: shared state and the snapshot/commit critical sections.

mod agent;
mod builder;
mod config;
mod runner;
mod state;

pub use agent::Agent;
pub use builder::AgentBuilder;
pub use config::{Config, DEFAULT_TIMEOUT};
pub use runner::Update;
