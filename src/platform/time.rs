//! Wall-clock time
//!
//! Frame pacing and fire cooldowns read real time, not the simulation's dt.
//! A slowed or paused frame unit therefore still lets cooldowns expire.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Monotonic time source that can also block the thread
pub trait Clock {
    /// Time elapsed since the clock started
    fn now(&self) -> Duration;

    fn sleep(&self, duration: Duration);

    fn now_millis(&self) -> u64 {
        self.now().as_millis() as u64
    }
}

/// Real time, backed by `Instant` and `thread::sleep`
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Hand-driven clock; sleeping advances it instantly
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
    slept: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_millis(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Total time spent in `sleep`
    pub fn slept(&self) -> Duration {
        self.slept.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.slept.set(self.slept.get() + duration);
        self.advance(duration);
    }
}

/// Fires at most once per `period_ms` of wall-clock time.
/// The first request is always granted.
#[derive(Debug, Clone, Copy)]
pub struct Cooldown {
    period_ms: u64,
    last: Option<u64>,
}

impl Cooldown {
    pub const fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            last: None,
        }
    }

    /// Claim the cooldown at `now_ms`; returns false while it is still running
    pub fn try_fire(&mut self, now_ms: u64) -> bool {
        let ready = match self.last {
            None => true,
            Some(last) => now_ms.saturating_sub(last) > self.period_ms,
        };
        if ready {
            self.last = Some(now_ms);
        }
        ready
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
