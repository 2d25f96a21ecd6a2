//! File and channel generation.

use overseer_logic::utils::random_range;
use rand::Rng;

use super::names::{generate_channel_name, generate_file_name};
use crate::components::{Channel, ChannelId, DiskFile};
use crate::config::{ChannelConfig, DiskConfig};

/// Odds that a new file is a threat: one in `1 + 5 * threat_level`.
pub fn threat_odds(threat_level: u32) -> u32 {
    1 + 5 * threat_level
}

/// Generates a file found by a search at `threat_level`.
///
/// Sizes are uniform in `[min, min + 3 + per_threat * threat_level)` so
/// the range widens as the threat level climbs.
pub fn generate_file(threat_level: u32, config: &DiskConfig, rng: &mut impl Rng) -> DiskFile {
    let (name, extension) = generate_file_name(rng);
    let min = config.min_file_size.max(1);
    let max = min + 3 + config.file_size_per_threat * threat_level as u64;
    let size = random_range(rng, min, max);
    let is_threat = rng.gen_range(0..threat_odds(threat_level)) == 0;
    DiskFile::new(name, extension, size, is_threat, threat_level)
}

/// Generates a fresh, uncracked channel.
pub fn generate_channel(id: ChannelId, config: &ChannelConfig, rng: &mut impl Rng) -> Channel {
    let name = generate_channel_name(config.name_octets, rng);
    let detection = random_range(rng, config.detection_range.0, config.detection_range.1);
    let remaining = random_range(rng, config.data_range.0, config.data_range.1).max(1);
    Channel::new(id, name, detection, remaining)
}
