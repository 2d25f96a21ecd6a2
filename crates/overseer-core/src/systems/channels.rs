//! Channels - cracking, siphoning and detection

use overseer_logic::detection::DetectionModel;
use overseer_logic::utils::roll_percent;
use rand::Rng;

use crate::components::{Channel, ChannelId};
use crate::config::ChannelConfig;
use crate::error::Rejection;
use crate::generation::generate_channel;

/// Result of one siphon cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiphonOutcome {
    /// Data left; the task keeps running.
    Continue { remaining: u32 },
    /// The channel ran dry; the task must cancel itself.
    Depleted,
}

/// Owns every channel. Channels are only ever added, never removed.
#[derive(Debug, Clone)]
pub struct ChannelManager {
    channels: Vec<Channel>,
    config: ChannelConfig,
}

impl ChannelManager {
    /// One fresh channel.
    pub fn new(config: &ChannelConfig, rng: &mut impl Rng) -> Self {
        let mut manager = Self::from_channels(Vec::new(), config);
        manager.add_channel(rng);
        manager
    }

    pub fn from_channels(channels: Vec<Channel>, config: &ChannelConfig) -> Self {
        Self {
            channels,
            config: config.clone(),
        }
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == id)
    }

    fn channel_mut(&mut self, id: ChannelId) -> Result<&mut Channel, Rejection> {
        self.channels
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(Rejection::UnknownChannel(id))
    }

    pub fn add_channel(&mut self, rng: &mut impl Rng) -> ChannelId {
        let id = ChannelId(self.channels.len() as u32);
        let channel = generate_channel(id, &self.config, rng);
        log::debug!("channel {} opened with detection {}", channel.name, channel.detection);
        self.channels.push(channel);
        id
    }

    pub fn check_crack(&self, id: ChannelId) -> Result<(), Rejection> {
        let channel = self.channel(id).ok_or(Rejection::UnknownChannel(id))?;
        if channel.is_busy {
            return Err(Rejection::ChannelBusy(id));
        }
        if channel.is_cracked {
            return Err(Rejection::ChannelCracked(id));
        }
        Ok(())
    }

    pub fn check_siphon(&self, id: ChannelId) -> Result<(), Rejection> {
        let channel = self.channel(id).ok_or(Rejection::UnknownChannel(id))?;
        if channel.is_busy {
            return Err(Rejection::ChannelBusy(id));
        }
        if !channel.is_cracked {
            return Err(Rejection::ChannelLocked(id));
        }
        if channel.is_depleted() {
            return Err(Rejection::ChannelDepleted(id));
        }
        Ok(())
    }

    pub fn set_busy(&mut self, id: ChannelId, busy: bool) -> Result<(), Rejection> {
        self.channel_mut(id)?.is_busy = busy;
        Ok(())
    }

    pub fn finish_crack(&mut self, id: ChannelId) -> Result<(), Rejection> {
        let channel = self.channel_mut(id)?;
        channel.is_cracked = true;
        channel.is_busy = false;
        Ok(())
    }

    /// Takes one unit of data.
    pub fn siphon_cycle(&mut self, id: ChannelId) -> Result<SiphonOutcome, Rejection> {
        let channel = self.channel_mut(id)?;
        channel.remaining = channel.remaining.saturating_sub(1);
        if channel.is_depleted() {
            Ok(SiphonOutcome::Depleted)
        } else {
            Ok(SiphonOutcome::Continue {
                remaining: channel.remaining,
            })
        }
    }

    /// Clears busy flags on channels that no running task refers to.
    pub fn reconcile_busy(&mut self, in_use: &[ChannelId]) {
        for channel in &mut self.channels {
            if channel.is_busy && !in_use.contains(&channel.id) {
                log::warn!("channel {} was busy with no task, releasing", channel.name);
                channel.is_busy = false;
            }
        }
    }
}

/// Detection drift for idle channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelDetection {
    model: DetectionModel,
}

impl ChannelDetection {
    pub fn new(model: DetectionModel) -> Self {
        Self { model }
    }

    /// One-second tick: each idle channel independently may cool down.
    pub fn tick(&self, channels: &mut ChannelManager, rng: &mut impl Rng) {
        for channel in channels.channels.iter_mut() {
            if channel.is_busy || channel.detection == 0 {
                continue;
            }
            if roll_percent(rng, self.model.decrease_chance(channel.detection)) {
                channel.cool_down();
            }
        }
    }

    /// Called once a siphon session ends. May heat the channel up, then
    /// rolls whether its detection level provokes a hack.
    pub fn session_ended(
        &self,
        channels: &mut ChannelManager,
        id: ChannelId,
        rng: &mut impl Rng,
    ) -> Result<bool, Rejection> {
        let channel = channels.channel_mut(id)?;
        if roll_percent(rng, self.model.increase_chance(channel.detection)) {
            channel.heat_up();
        }
        Ok(roll_percent(rng, self.model.hack_chance(channel.detection)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn manager_with(channel: Channel) -> ChannelManager {
        ChannelManager::from_channels(vec![channel], &ChannelConfig::default())
    }

    #[test]
    fn test_crack_then_siphon() {
        let mut channels = manager_with(Channel::new(ChannelId(0), "aa:bb", 10, 3));
        let id = ChannelId(0);
        assert_eq!(channels.check_siphon(id), Err(Rejection::ChannelLocked(id)));
        channels.check_crack(id).unwrap();
        channels.set_busy(id, true).unwrap();
        assert_eq!(channels.check_crack(id), Err(Rejection::ChannelBusy(id)));
        channels.finish_crack(id).unwrap();
        assert_eq!(channels.check_crack(id), Err(Rejection::ChannelCracked(id)));
        assert!(channels.check_siphon(id).is_ok());
    }

    #[test]
    fn test_siphon_until_depleted() {
        let mut channel = Channel::new(ChannelId(0), "aa:bb", 10, 3);
        channel.is_cracked = true;
        let mut channels = manager_with(channel);
        let id = ChannelId(0);
        assert_eq!(channels.siphon_cycle(id), Ok(SiphonOutcome::Continue { remaining: 2 }));
        assert_eq!(channels.siphon_cycle(id), Ok(SiphonOutcome::Continue { remaining: 1 }));
        assert_eq!(channels.siphon_cycle(id), Ok(SiphonOutcome::Depleted));
        assert_eq!(channels.check_siphon(id), Err(Rejection::ChannelDepleted(id)));
    }

    #[test]
    fn test_detection_decays_only_when_idle() {
        let mut rng = StdRng::seed_from_u64(1);
        let detection = ChannelDetection::default();
        let mut channels = ChannelManager::from_channels(
            vec![
                Channel::new(ChannelId(0), "aa", 50, 5),
                Channel::new(ChannelId(1), "bb", 50, 5),
            ],
            &ChannelConfig::default(),
        );
        channels.set_busy(ChannelId(1), true).unwrap();
        for _ in 0..200 {
            detection.tick(&mut channels, &mut rng);
        }
        assert!(channels.channels()[0].detection < 50);
        assert_eq!(channels.channels()[1].detection, 50);
    }

    #[test]
    fn test_decay_stops_at_zero() {
        let mut rng = StdRng::seed_from_u64(2);
        let detection = ChannelDetection::default();
        let mut channels = manager_with(Channel::new(ChannelId(0), "aa", 3, 5));
        for _ in 0..500 {
            detection.tick(&mut channels, &mut rng);
        }
        assert_eq!(channels.channels()[0].detection, 0);
    }

    #[test]
    fn test_session_end_heats_cold_channel() {
        let mut rng = StdRng::seed_from_u64(3);
        let detection = ChannelDetection::new(DetectionModel {
            hack_per_point: 0.0,
            ..DetectionModel::default()
        });
        let mut channels = manager_with(Channel::new(ChannelId(0), "aa", 0, 5));
        // At detection 0 the increase chance is 100%.
        let hack = detection.session_ended(&mut channels, ChannelId(0), &mut rng).unwrap();
        assert!(!hack);
        assert_eq!(channels.channels()[0].detection, 1);
    }

    #[test]
    fn test_new_manager_has_one_channel() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut channels = ChannelManager::new(&ChannelConfig::default(), &mut rng);
        assert_eq!(channels.channels().len(), 1);
        let id = channels.add_channel(&mut rng);
        assert_eq!(id, ChannelId(1));
        assert_ne!(channels.channels()[0].name, channels.channels()[1].name);
    }
}
