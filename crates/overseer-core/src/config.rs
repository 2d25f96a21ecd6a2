//! Engine configuration.
//!
//! Every section has sensible defaults, so a config file only needs the
//! values it wants to change:
//!
//! ```
//! use overseer_core::config::OverseerConfig;
//!
//! let config = OverseerConfig::from_json_str(r#"{ "tasks": { "search_cost": 800.0 } }"#).unwrap();
//! assert_eq!(config.tasks.search_cost, 800.0);
//! assert_eq!(config.tasks.crack_cost, 15_000.0);
//! ```

use std::path::Path;

use overseer_logic::detection::DetectionModel;
use serde::{Deserialize, Serialize};

/// Task costs and core limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    /// Divisor in `progress = power / (cost * K) * elapsed_ms`.
    pub progress_constant: f64,
    /// Overclock cost per point of core power.
    pub overclock_cost_per_power: f64,
    pub search_cost: f64,
    pub crack_cost: f64,
    pub siphon_cost: f64,
    /// Overclocks allowed per core before research raises the ceiling.
    pub max_upgrades: u32,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            progress_constant: 2.0,
            overclock_cost_per_power: 1000.0,
            search_cost: 5000.0,
            crack_cost: 15_000.0,
            siphon_cost: 2500.0,
            max_upgrades: 3,
        }
    }
}

/// Disk capacities and file generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskConfig {
    /// Capacity of a regular disk in KB.
    pub disk_size: u64,
    /// Capacity of a quarantine disk in KB.
    pub quarantine_size: u64,
    /// Factor applied by the disk-size research.
    pub size_multiplier: u64,
    /// Side of the name pool; the pool holds `side * side` names.
    pub name_pool_side: usize,
    /// Smallest generated file in KB.
    pub min_file_size: u64,
    /// File size range grows by this many KB per threat level.
    pub file_size_per_threat: u64,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            disk_size: 250,
            quarantine_size: 100,
            size_multiplier: 2,
            name_pool_side: 4,
            min_file_size: 1,
            file_size_per_threat: 6,
        }
    }
}

/// Research pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    pub base_cost: f64,
    pub cost_exponent: f64,
    /// Multiplier for the visibility threshold; lower than `base_cost`.
    pub base_display: f64,
    /// Added to the cost exponent by each `increment_exponent` call.
    pub exponent_step: f64,
    pub max_displayed: usize,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            base_cost: 0.75,
            cost_exponent: 3.25,
            base_display: 0.5,
            exponent_step: 0.25,
            max_displayed: 3,
        }
    }
}

/// Channel generation and detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Siphonable data for a new channel, `[min, max)`.
    pub data_range: (u32, u32),
    /// Detection for a new channel, `[min, max)`.
    pub detection_range: (u32, u32),
    /// Octets in a channel name.
    pub name_octets: usize,
    pub detection: DetectionModel,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            data_range: (10, 40),
            detection_range: (0, 30),
            name_octets: 6,
            detection: DetectionModel::default(),
        }
    }
}

/// Hack spawning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HackConfig {
    /// Minutes between hacks, `[min, max)`.
    pub interval_minutes: (u64, u64),
    /// How long a resolved hack stays on screen, in ms.
    pub teardown_delay_ms: u64,
    /// Show a lead-in screen before the countdown starts.
    pub pretext: bool,
}

impl Default for HackConfig {
    fn default() -> Self {
        Self {
            interval_minutes: (5, 10),
            teardown_delay_ms: 3000,
            pretext: true,
        }
    }
}

/// Verdict spawning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerdictConfig {
    /// Minutes between verdicts, `[min, max)`.
    pub interval_minutes: (u64, u64),
}

impl Default for VerdictConfig {
    fn default() -> Self {
        Self {
            interval_minutes: (8, 15),
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverseerConfig {
    pub tasks: TaskConfig,
    pub disks: DiskConfig,
    pub research: ResearchConfig,
    pub channels: ChannelConfig,
    pub hacks: HackConfig,
    pub verdicts: VerdictConfig,
    /// Messages kept in the rolling log.
    pub message_capacity: usize,
    /// Fixed RNG seed; entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for OverseerConfig {
    fn default() -> Self {
        Self {
            tasks: TaskConfig::default(),
            disks: DiskConfig::default(),
            research: ResearchConfig::default(),
            channels: ChannelConfig::default(),
            hacks: HackConfig::default(),
            verdicts: VerdictConfig::default(),
            message_capacity: 15,
            seed: None,
        }
    }
}

impl OverseerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&text)?)
    }
}

/// Errors from reading a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
