//! Randomized event timers for hacks and verdicts

use overseer_logic::utils::random_range;
use rand::Rng;

use crate::clock::{Millis, MINUTE};

/// Fires once a randomly drawn interval has elapsed.
///
/// Each (re)start draws a fresh interval, uniform in whole minutes over
/// `[min, max)`. A stopped timer never fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTimer {
    interval_minutes: (u64, u64),
    started_at: Millis,
    interval: Millis,
    running: bool,
}

impl EventTimer {
    /// A stopped timer; call [`start`](Self::start) to arm it.
    pub fn new(interval_minutes: (u64, u64)) -> Self {
        Self {
            interval_minutes,
            started_at: 0,
            interval: 0,
            running: false,
        }
    }

    pub fn start(&mut self, now: Millis, rng: &mut impl Rng) {
        let (min, max) = self.interval_minutes;
        self.interval = random_range(rng, min, max) * MINUTE;
        self.started_at = now;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval(&self) -> Millis {
        self.interval
    }

    /// Whether the drawn interval has passed.
    pub fn is_due(&self, now: Millis) -> bool {
        self.running && now.saturating_sub(self.started_at) >= self.interval
    }

    /// Time left before the timer is due, if running.
    pub fn remaining(&self, now: Millis) -> Option<Millis> {
        self.running
            .then(|| self.interval.saturating_sub(now.saturating_sub(self.started_at)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_interval_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut timer = EventTimer::new((5, 10));
        for _ in 0..50 {
            timer.start(0, &mut rng);
            assert!(timer.interval() >= 5 * MINUTE);
            assert!(timer.interval() < 10 * MINUTE);
        }
    }

    #[test]
    fn test_due_after_interval() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut timer = EventTimer::new((3, 4));
        assert!(!timer.is_due(u64::MAX));
        timer.start(1000, &mut rng);
        assert!(!timer.is_due(1000 + 3 * MINUTE - 1));
        assert!(timer.is_due(1000 + 3 * MINUTE));
        assert_eq!(timer.remaining(1000 + MINUTE), Some(2 * MINUTE));
    }

    #[test]
    fn test_stopped_timer_never_due() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut timer = EventTimer::new((1, 2));
        timer.start(0, &mut rng);
        timer.stop();
        assert!(!timer.is_due(10 * MINUTE));
        assert_eq!(timer.remaining(0), None);
    }
}
