//! In-memory usage counters, reset on restart.

use inmo_core::command::CommandKind;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;

/// Point-in-time copy of the counters, for the status surface.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UsageSnapshot {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    pub by_type: HashMap<String, u64>,
    pub by_user: HashMap<String, u64>,
}

/// Counters for every dispatch attempt that reached execution. Authorization
/// rejections and unrecognized command types count as failures; requests
/// rejected for missing parameters do not. The per-type and per-user buckets
/// only track successes.
#[derive(Debug, Default)]
pub struct UsageStats {
    inner: Mutex<UsageSnapshot>,
}

impl UsageStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, kind: CommandKind, user_id: &str, success: bool) {
        let mut counters = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        counters.total += 1;
        if success {
            counters.successful += 1;
            *counters.by_type.entry(kind.as_str().to_string()).or_insert(0) += 1;
            *counters.by_user.entry(user_id.to_string()).or_insert(0) += 1;
        } else {
            counters.failed += 1;
        }
    }

    /// Count an attempt whose command type is not in the catalog. There is no
    /// per-type bucket to credit, so only the totals move.
    pub fn record_unrecognized(&self) {
        let mut counters = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        counters.total += 1;
        counters.failed += 1;
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        match self.inner.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
