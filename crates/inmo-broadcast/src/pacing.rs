//! Delay computation for bulk sends.
//!
//! All delays take the RNG as a parameter so tests can pin a seed.

use inmo_core::config::BroadcastConfig;
use rand::Rng;
use std::time::Duration;

/// Base inter-send delay for a regular job, stepped by recipient count.
/// Bigger jobs slow down per message instead of speeding up.
pub fn base_delay(recipients: usize) -> Duration {
    let secs = match recipients {
        0..=10 => 3,
        11..=20 => 4,
        21..=30 => 5,
        _ => 6,
    };
    Duration::from_secs(secs)
}

/// Inter-send delay for a managerial job: a floor, scaled up with size.
pub fn managerial_delay(config: &BroadcastConfig, recipients: usize) -> Duration {
    let scaled = recipients as u64 * config.managerial_per_recipient_ms;
    Duration::from_millis(scaled.max(config.managerial_floor_ms))
}

/// Full inter-send delay: the profile's base plus uniform jitter.
pub fn send_delay<R: Rng>(
    config: &BroadcastConfig,
    recipients: usize,
    managerial: bool,
    rng: &mut R,
) -> Duration {
    let base = if managerial {
        managerial_delay(config, recipients)
    } else {
        base_delay(recipients)
    };
    base + jitter(config.send_jitter_ms, rng)
}

/// Pause between batches: fixed component plus uniform jitter.
pub fn batch_pause<R: Rng>(config: &BroadcastConfig, rng: &mut R) -> Duration {
    Duration::from_millis(config.batch_pause_ms) + jitter(config.batch_jitter_ms, rng)
}

fn jitter<R: Rng>(max_ms: u64, rng: &mut R) -> Duration {
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rng.gen_range(0..max_ms))
}
