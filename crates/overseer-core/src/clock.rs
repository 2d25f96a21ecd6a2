//! Time source and fixed-period tickers.
//!
//! The engine reads one clock once per `update` and hands that instant to
//! every subsystem, so nothing keeps its own timer handles. Tests swap in a
//! [`ManualClock`] and move time by hand.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since an arbitrary epoch.
pub type Millis = u64;

pub const SECOND: Millis = 1000;
pub const MINUTE: Millis = 60 * SECOND;

/// Source of the current time.
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

/// Wall clock, milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as Millis)
            .unwrap_or(0)
    }
}

/// Hand-driven clock. Clones share the same instant.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    pub fn advance(&self, ms: Millis) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: Millis) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.load(Ordering::SeqCst)
    }
}

/// Fires once per whole `period` of elapsed time.
#[derive(Debug, Clone, Copy)]
pub struct IntervalTimer {
    period: Millis,
    last: Millis,
}

impl IntervalTimer {
    pub fn new(period: Millis, now: Millis) -> Self {
        Self {
            period: period.max(1),
            last: now,
        }
    }

    /// Number of whole periods since the last call, consuming them.
    pub fn periods_elapsed(&mut self, now: Millis) -> u64 {
        if now <= self.last {
            return 0;
        }
        let periods = (now - self.last) / self.period;
        self.last += periods * self.period;
        periods
    }

    pub fn reset(&mut self, now: Millis) {
        self.last = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new(100);
        let other = clock.clone();
        clock.advance(50);
        assert_eq!(other.now_ms(), 150);
        other.set(10);
        assert_eq!(clock.now_ms(), 10);
    }

    #[test]
    fn test_interval_timer_consumes_periods() {
        let mut timer = IntervalTimer::new(SECOND, 0);
        assert_eq!(timer.periods_elapsed(999), 0);
        assert_eq!(timer.periods_elapsed(1000), 1);
        assert_eq!(timer.periods_elapsed(1500), 0);
        assert_eq!(timer.periods_elapsed(4200), 3);
        assert_eq!(timer.periods_elapsed(4999), 0);
        assert_eq!(timer.periods_elapsed(5000), 1);
    }

    #[test]
    fn test_interval_timer_ignores_time_going_backwards() {
        let mut timer = IntervalTimer::new(SECOND, 5000);
        assert_eq!(timer.periods_elapsed(1000), 0);
    }

    #[test]
    fn test_system_clock_moves() {
        assert!(SystemClock.now_ms() > 0);
    }
}
