//! # inmo-core
//!
//! Core types, traits, configuration, and error handling for the inmo
//! back-office engine.

pub mod command;
pub mod config;
pub mod error;
pub mod message;
pub mod model;
pub mod role;
pub mod traits;
