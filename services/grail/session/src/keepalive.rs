//! Keep-alive scheduling for idle connections.
//!
//! Any endpoint may send a `keep_alive` at any time; receipt proves
//! liveness and needs no reply. The timer here tracks the last traffic on
//! a connection so callers send keep-alives only when the line has been
//! quiet for a full interval.

use std::time::{Duration, Instant};

/// Decides when an idle connection is due for a keep-alive.
#[derive(Debug, Clone)]
pub struct KeepaliveTimer {
    interval: Duration,
    last_activity: Instant,
}

impl KeepaliveTimer {
    /// Creates a timer that considers the connection active now.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_activity: Instant::now(),
        }
    }

    /// Records traffic in either direction; sending the keep-alive itself
    /// counts.
    pub fn record_activity(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Returns true once a full interval has passed without traffic.
    #[must_use]
    pub fn due(&self) -> bool {
        self.last_activity.elapsed() >= self.interval
    }

    /// Time until the next keep-alive would be due, zero if already due.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.interval.saturating_sub(self.last_activity.elapsed())
    }
}
