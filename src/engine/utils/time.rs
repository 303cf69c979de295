// src/engine/utils/time.rs
use crate::models::common::Timestamp;
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock time as seconds since the Unix epoch.
pub fn now_ts() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
