use std::time::{Duration, Instant};

/// Fixed-interval tick scheduler for real-time drivers. Reports at most one
/// due tick per poll and reschedules from the poll time, so a stalled host
/// never produces a burst of catch-up ticks and ticks never overlap.
#[derive(Clone, Debug)]
pub struct TickClock {
    interval: Duration,
    next_due: Instant,
}

impl TickClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: Instant::now() + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True when a tick is due at `now`; consuming the tick reschedules the
    /// next one a full interval after `now`.
    pub fn tick_due(&mut self, now: Instant) -> bool {
        if now >= self.next_due {
            self.next_due = now + self.interval;
            true
        } else {
            false
        }
    }

    /// Restarts the interval from `now`, e.g. when resuming from pause.
    pub fn restart(&mut self, now: Instant) {
        self.next_due = now + self.interval;
    }

    /// How long a driver may sleep before the next tick is due.
    pub fn time_until_due(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }
}
