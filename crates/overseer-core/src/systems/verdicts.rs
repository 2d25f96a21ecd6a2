//! Verdicts - narrative choices with probabilistic outcomes
//!
//! A verdict is presented, the player picks an option, and the option's
//! odds decide between its success and failure rewards. There is no timer
//! and no way back once resolved.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Rejection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerdictKind {
    SuspiciousPackage,
    InsiderTip,
    RogueProcess,
    DataBroker,
}

/// Consequence applied when a verdict resolves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reward {
    /// Reliability delta; may be negative.
    Reliability(f64),
    /// Attempt to add this many random files to regular disks.
    AddFiles(u32),
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerdictOption {
    pub label: &'static str,
    /// Success odds as `numerator / denominator`.
    pub chance: (u32, u32),
    pub success: Reward,
    pub failure: Reward,
    pub success_text: &'static str,
    pub failure_text: &'static str,
}

impl VerdictOption {
    fn roll(&self, rng: &mut impl Rng) -> bool {
        let (num, den) = self.chance;
        den > 0 && rng.gen_range(0..den) < num
    }
}

impl VerdictKind {
    pub const ALL: [VerdictKind; 4] = [
        VerdictKind::SuspiciousPackage,
        VerdictKind::InsiderTip,
        VerdictKind::RogueProcess,
        VerdictKind::DataBroker,
    ];

    /// Stable index used for the persisted `verdict-type` marker.
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&k| k == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            VerdictKind::SuspiciousPackage => "Suspicious Package",
            VerdictKind::InsiderTip => "Insider Tip",
            VerdictKind::RogueProcess => "Rogue Process",
            VerdictKind::DataBroker => "Data Broker",
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            VerdictKind::SuspiciousPackage => {
                "An unsigned package is waiting at the edge of the network. Its origin is unknown."
            }
            VerdictKind::InsiderTip => {
                "An anonymous message claims to know where a cache of infected files is hiding."
            }
            VerdictKind::RogueProcess => {
                "A process nobody started is consuming cycles on a backup node."
            }
            VerdictKind::DataBroker => {
                "A broker offers to buy diagnostic logs. The price is good. The buyer is not."
            }
        }
    }

    pub fn options(self) -> &'static [VerdictOption] {
        match self {
            VerdictKind::SuspiciousPackage => &SUSPICIOUS_PACKAGE,
            VerdictKind::InsiderTip => &INSIDER_TIP,
            VerdictKind::RogueProcess => &ROGUE_PROCESS,
            VerdictKind::DataBroker => &DATA_BROKER,
        }
    }
}

static SUSPICIOUS_PACKAGE: [VerdictOption; 2] = [
    VerdictOption {
        label: "Open it",
        chance: (1, 2),
        success: Reward::Reliability(2.0),
        failure: Reward::AddFiles(5),
        success_text: "The package held a cache of patch notes. Reliability improved.",
        failure_text: "The package unpacked itself across the disks.",
    },
    VerdictOption {
        label: "Discard it",
        chance: (1, 1),
        success: Reward::Nothing,
        failure: Reward::Nothing,
        success_text: "The package was deleted unopened.",
        failure_text: "The package was deleted unopened.",
    },
];

static INSIDER_TIP: [VerdictOption; 2] = [
    VerdictOption {
        label: "Follow the tip",
        chance: (3, 4),
        success: Reward::Reliability(1.5),
        failure: Reward::Reliability(-1.0),
        success_text: "The tip was genuine. The cache was cleaned.",
        failure_text: "The tip was bait. Cleanup cost more than it saved.",
    },
    VerdictOption {
        label: "Ignore it",
        chance: (1, 1),
        success: Reward::Nothing,
        failure: Reward::Nothing,
        success_text: "The message was archived.",
        failure_text: "The message was archived.",
    },
];

static ROGUE_PROCESS: [VerdictOption; 3] = [
    VerdictOption {
        label: "Kill it",
        chance: (1, 2),
        success: Reward::Reliability(1.0),
        failure: Reward::AddFiles(8),
        success_text: "The process died quietly.",
        failure_text: "The process forked before it died. Its children scattered files everywhere.",
    },
    VerdictOption {
        label: "Trace it",
        chance: (1, 4),
        success: Reward::Reliability(4.0),
        failure: Reward::Reliability(-2.0),
        success_text: "The trace led back to a dormant intrusion. It has been removed.",
        failure_text: "The trace went cold and burned time on the way.",
    },
    VerdictOption {
        label: "Let it run",
        chance: (1, 1),
        success: Reward::AddFiles(3),
        failure: Reward::Nothing,
        success_text: "The process finished whatever it was doing and left files behind.",
        failure_text: "The process finished whatever it was doing.",
    },
];

static DATA_BROKER: [VerdictOption; 2] = [
    VerdictOption {
        label: "Sell the logs",
        chance: (2, 3),
        success: Reward::Reliability(3.0),
        failure: Reward::Reliability(-3.0),
        success_text: "The sale went through without incident.",
        failure_text: "The logs were used against the network. Reliability suffered.",
    },
    VerdictOption {
        label: "Refuse",
        chance: (1, 1),
        success: Reward::Nothing,
        failure: Reward::Nothing,
        success_text: "The broker disconnected.",
        failure_text: "The broker disconnected.",
    },
];

/// A resolved choice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerdictResolution {
    pub success: bool,
    pub reward: Reward,
    pub text: &'static str,
}

/// A verdict on screen, waiting for or showing its resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    kind: VerdictKind,
    resolution: Option<VerdictResolution>,
}

impl Verdict {
    pub fn new(kind: VerdictKind) -> Self {
        Self {
            kind,
            resolution: None,
        }
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::new(VerdictKind::ALL[rng.gen_range(0..VerdictKind::ALL.len())])
    }

    pub fn kind(&self) -> VerdictKind {
        self.kind
    }

    pub fn resolution(&self) -> Option<&VerdictResolution> {
        self.resolution.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    /// Resolves with the option at `index`. A second choice is refused.
    pub fn choose(&mut self, index: usize, rng: &mut impl Rng) -> Result<VerdictResolution, Rejection> {
        if self.resolution.is_some() {
            return Err(Rejection::NoVerdict);
        }
        let option = self
            .kind
            .options()
            .get(index)
            .ok_or(Rejection::InvalidChoice(index as u32))?;
        let success = option.roll(rng);
        let resolution = if success {
            VerdictResolution {
                success,
                reward: option.success,
                text: option.success_text,
            }
        } else {
            VerdictResolution {
                success,
                reward: option.failure,
                text: option.failure_text,
            }
        };
        self.resolution = Some(resolution);
        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_every_verdict_has_options() {
        for kind in VerdictKind::ALL {
            assert!((2..=3).contains(&kind.options().len()));
            for option in kind.options() {
                assert!(option.chance.0 <= option.chance.1);
                assert!(option.chance.1 > 0);
            }
            assert_eq!(VerdictKind::from_index(kind.index()), Some(kind));
        }
    }

    #[test]
    fn test_certain_option_always_succeeds() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let mut verdict = Verdict::new(VerdictKind::DataBroker);
            let resolution = verdict.choose(1, &mut rng).unwrap();
            assert!(resolution.success);
            assert_eq!(resolution.reward, Reward::Nothing);
        }
    }

    #[test]
    fn test_odds_are_respected() {
        let mut rng = StdRng::seed_from_u64(2);
        let wins = (0..4000)
            .filter(|_| {
                let mut verdict = Verdict::new(VerdictKind::InsiderTip);
                verdict.choose(0, &mut rng).unwrap().success
            })
            .count();
        // 3 in 4
        assert!((2800..3200).contains(&wins), "wins = {wins}");
    }

    #[test]
    fn test_resolves_once() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut verdict = Verdict::new(VerdictKind::RogueProcess);
        assert_eq!(verdict.choose(7, &mut rng), Err(Rejection::InvalidChoice(7)));
        assert!(!verdict.is_resolved());
        verdict.choose(2, &mut rng).unwrap();
        assert!(verdict.is_resolved());
        assert_eq!(verdict.choose(0, &mut rng), Err(Rejection::NoVerdict));
    }
}
