use std::time::{Duration, Instant};

/// Minimum interval between accepted actions.
///
/// A dial spun quickly emits a burst of detents; only the first one inside
/// each interval is let through. A zero interval accepts everything.
#[derive(Debug, Clone)]
pub struct DeadTime {
    interval: Duration,
    last_action: Instant,
}

impl DeadTime {
    /// Start the clock at `now`: actions inside the first interval are dropped too.
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_action: now,
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, Instant::now())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true and restarts the clock if `now` is outside the dead time.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if self.interval.is_zero() {
            return true;
        }
        if now.saturating_duration_since(self.last_action) < self.interval {
            return false;
        }
        self.last_action = now;
        true
    }
}
