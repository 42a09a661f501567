//! # inmo-engine
//!
//! The conversational session engine: per-user volatile sessions with idle
//! timeout, a static menu tree, and one small state machine per guided
//! data-collection flow. Consumes one inbound text at a time and yields a
//! display message plus, sometimes, an executable command descriptor.
//!
//! The engine never talks to the transport or the dispatcher itself; the
//! gateway owns delivery and execution, so no layer can double-reply to the
//! same event.

pub mod actions;
mod engine;
pub mod menu;
mod navigator;
pub mod outcome;
pub mod session;
pub mod validate;

pub use engine::Engine;
pub use outcome::EngineReply;
