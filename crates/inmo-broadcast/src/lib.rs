//! Bulk-send scheduler.
//!
//! Recipient order, send spacing and batch pauses are all randomized so a
//! job never produces a mechanical send pattern. Within one job sends are
//! serial; independent jobs may run concurrently.

pub mod pacing;
pub mod scheduler;

pub use scheduler::{Audience, BroadcastJob, BroadcastReport, BroadcastScheduler, CancelFlag};
