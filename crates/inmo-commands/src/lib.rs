//! Command execution: the static catalog, the role-gated dispatcher, and
//! per-type / per-user usage counters.
//!
//! The dispatcher validates and runs exactly one command per call; message
//! delivery stays with the caller (the gateway), which is why handlers
//! return a [`inmo_core::command::CommandResult`] instead of sending.

pub mod dispatcher;
pub mod registry;
pub mod stats;

mod handlers;


pub use dispatcher::Dispatcher;
pub use stats::UsageSnapshot;
