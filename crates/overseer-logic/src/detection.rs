//! Channel detection odds.
//!
//! Detection is a 0-100 percentage. Idle channels cool down over time,
//! finished siphon sessions heat them up, and a hot channel is more likely
//! to attract a hack. All chances are percentages rolled with
//! [`roll_percent`](crate::utils::roll_percent).

use serde::{Deserialize, Serialize};

/// Highest detection a channel can reach.
pub const MAX_DETECTION: u32 = 100;

/// Tunable detection odds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionModel {
    /// Flat part of the per-second cool-down chance.
    pub decrease_base: f64,
    /// Extra cool-down chance per detection point.
    pub decrease_per_point: f64,
    /// Hack chance per detection point when a session ends.
    pub hack_per_point: f64,
}

impl Default for DetectionModel {
    fn default() -> Self {
        Self {
            decrease_base: 10.0,
            decrease_per_point: 0.5,
            hack_per_point: 0.5,
        }
    }
}

impl DetectionModel {
    /// Chance (%) that an idle channel loses one point this second.
    pub fn decrease_chance(&self, detection: u32) -> f64 {
        self.decrease_base + detection.min(MAX_DETECTION) as f64 * self.decrease_per_point
    }

    /// Chance (%) that a finished session raises detection by one point.
    /// Gets harder the closer the channel is to fully detected.
    pub fn increase_chance(&self, detection: u32) -> f64 {
        (MAX_DETECTION - detection.min(MAX_DETECTION)) as f64
    }

    /// Chance (%) that a finished session draws a hack.
    pub fn hack_chance(&self, detection: u32) -> f64 {
        detection.min(MAX_DETECTION) as f64 * self.hack_per_point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let model = DetectionModel::default();
        assert_eq!(model.decrease_chance(0), 10.0);
        assert_eq!(model.decrease_chance(40), 30.0);
        assert_eq!(model.increase_chance(0), 100.0);
        assert_eq!(model.increase_chance(100), 0.0);
        assert_eq!(model.hack_chance(0), 0.0);
        assert_eq!(model.hack_chance(60), 30.0);
    }

    #[test]
    fn test_out_of_range_detection_is_clamped() {
        let model = DetectionModel::default();
        assert_eq!(model.increase_chance(250), 0.0);
        assert_eq!(model.hack_chance(250), 50.0);
    }
}
