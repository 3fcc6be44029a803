use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::B256;

/// `{base}/{hash}`, tolerating a trailing slash on `base`
pub fn explorer_link(base: &str, hash: &B256) -> String {
    format!("{}/{hash}", base.trim_end_matches('/'))
}

/// Current Unix time in seconds, zero if the clock is before the epoch
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
