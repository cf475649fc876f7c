//! Time source used by the polling loops.

use std::thread;
use std::time::{Duration, Instant};

/// Monotonic time and blocking sleeps, swappable for deterministic tests.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Tracks one wait phase against its time budget.
#[derive(Debug, Clone, Copy)]
pub(super) struct PhaseTimer {
    started: Instant,
    budget: Duration,
}

impl PhaseTimer {
    pub(super) fn start(clock: &dyn Clock, budget: Duration) -> Self {
        Self {
            started: clock.now(),
            budget,
        }
    }

    /// True once strictly more than the budget has elapsed.
    pub(super) fn expired(&self, clock: &dyn Clock) -> bool {
        self.elapsed(clock) > self.budget
    }

    pub(super) fn remaining(&self, clock: &dyn Clock) -> Duration {
        self.budget.saturating_sub(self.elapsed(clock))
    }

    fn elapsed(&self, clock: &dyn Clock) -> Duration {
        clock.now().saturating_duration_since(self.started)
    }
}

/// Per-call network timeout: the configured cap, shortened to what is left
/// of the phase budget, but never below one second.
pub(super) fn call_timeout(cap: Duration, remaining: Duration) -> Duration {
    const FLOOR: Duration = Duration::from_secs(1);
    cap.min(remaining).max(FLOOR)
}
