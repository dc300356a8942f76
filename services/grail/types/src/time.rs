//! GRAIL time: signed milliseconds since the Unix epoch.

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since 1970-01-01 UTC.
pub type GrailTime = i64;

/// Sentinel meaning "no expiration".
pub const MAX_GRAIL_TIME: GrailTime = i64::MAX;

/// The current wall-clock time as GRAIL time.
#[must_use]
pub fn now_grail_time() -> GrailTime {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
