//! Progress throttling.
//!
//! Rate-limits progress callbacks per job so a chatty fetcher cannot flood
//! subscribers.

use std::time::{Duration, Instant};

/// Rate-limiter for progress fan-out.
///
/// The first report always passes, as does a report of full completion, so
/// subscribers never miss the start or the end of a transfer. A zero interval
/// disables throttling.
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    last_emit: Option<Instant>,
    min_interval: Duration,
}

impl ProgressThrottle {
    /// Create a throttle with the specified minimum interval.
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            last_emit: None,
            min_interval,
        }
    }

    /// A throttle that admits every report.
    pub const fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Decide whether a report of `fraction` observed at `now` is forwarded.
    pub fn admit(&mut self, fraction: f32, now: Instant) -> bool {
        let due = match self.last_emit {
            _ if self.min_interval.is_zero() || fraction >= 1.0 => true,
            Some(last) => now.saturating_duration_since(last) >= self.min_interval,
            None => true,
        };
        if due {
            self.last_emit = Some(now);
        }
        due
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::new(Duration::from_millis(filesvc_core::DEFAULT_PROGRESS_INTERVAL_MS))
    }
}
