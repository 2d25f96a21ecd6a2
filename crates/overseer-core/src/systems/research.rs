//! Research - spends reliability on new capabilities
//!
//! The catalog is fixed and ordered; an option's price depends only on its
//! position and the current cost exponent. At most `max_displayed` options
//! are offered at once, and each stays on offer until it is bought.

use overseer_logic::research::{display_threshold, option_cost};
use serde::{Deserialize, Serialize};

use crate::config::ResearchConfig;
use crate::error::Rejection;
use crate::state::PersistentState;

/// What a purchase unlocks. The engine routes each effect to its manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResearchEffect {
    AddCore,
    CoreSpeeds,
    AddDisk { quarantine: bool },
    DiskSize,
    ThreatLevel,
    AddChannel,
}

impl ResearchEffect {
    /// Tag naming the manager the effect is dispatched to.
    pub fn tag(self) -> &'static str {
        match self {
            ResearchEffect::AddCore => "add-core",
            ResearchEffect::CoreSpeeds => "core-speeds",
            ResearchEffect::AddDisk { .. } => "add-disk",
            ResearchEffect::DiskSize => "disk-size",
            ResearchEffect::ThreatLevel => "threat-level",
            ResearchEffect::AddChannel => "add-channel",
        }
    }
}

/// One selectable effect with its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResearchChoice {
    pub label: &'static str,
    pub effect: ResearchEffect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResearchShape {
    Singular(ResearchEffect),
    /// Mutually exclusive pair; buying applies only the selected side.
    Choice([ResearchChoice; 2]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResearchOption {
    /// 1-based position in the catalog.
    pub index: u32,
    pub title: &'static str,
    pub shape: ResearchShape,
    /// Lowest threat level at which the option may appear.
    pub min_threat: u32,
}

const fn singular(index: u32, title: &'static str, effect: ResearchEffect, min_threat: u32) -> ResearchOption {
    ResearchOption {
        index,
        title,
        shape: ResearchShape::Singular(effect),
        min_threat,
    }
}

const fn choice(
    index: u32,
    title: &'static str,
    a: (&'static str, ResearchEffect),
    b: (&'static str, ResearchEffect),
    min_threat: u32,
) -> ResearchOption {
    ResearchOption {
        index,
        title,
        shape: ResearchShape::Choice([
            ResearchChoice { label: a.0, effect: a.1 },
            ResearchChoice { label: b.0, effect: b.1 },
        ]),
        min_threat,
    }
}

pub static CATALOG: [ResearchOption; 14] = [
    singular(1, "Secondary Core", ResearchEffect::AddCore, 1),
    singular(2, "Storage Array", ResearchEffect::AddDisk { quarantine: false }, 1),
    singular(3, "Isolation Vault", ResearchEffect::AddDisk { quarantine: true }, 1),
    singular(4, "Threat Analysis", ResearchEffect::ThreatLevel, 1),
    singular(5, "Thermal Tolerance", ResearchEffect::CoreSpeeds, 1),
    choice(
        6,
        "Network Expansion",
        ("Signal Tap", ResearchEffect::AddChannel),
        ("Block Compression", ResearchEffect::DiskSize),
        1,
    ),
    singular(7, "Tertiary Core", ResearchEffect::AddCore, 2),
    singular(8, "Threat Modelling", ResearchEffect::ThreatLevel, 2),
    choice(
        9,
        "Storage Strategy",
        ("Isolation Vault II", ResearchEffect::AddDisk { quarantine: true }),
        ("Storage Array II", ResearchEffect::AddDisk { quarantine: false }),
        2,
    ),
    singular(10, "Signal Relay", ResearchEffect::AddChannel, 3),
    singular(11, "Liquid Cooling", ResearchEffect::CoreSpeeds, 3),
    singular(12, "Deep Compression", ResearchEffect::DiskSize, 3),
    choice(
        13,
        "Scale Out",
        ("Core Cluster", ResearchEffect::AddCore),
        ("Signal Array", ResearchEffect::AddChannel),
        4,
    ),
    singular(14, "Threat Forecasting", ResearchEffect::ThreatLevel, 4),
];

pub fn catalog_option(index: u32) -> Option<&'static ResearchOption> {
    CATALOG.iter().find(|o| o.index == index)
}

/// An option currently offered to the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayedOption {
    pub index: u32,
    pub cost: f64,
    /// Affordable right now.
    pub enabled: bool,
}

/// Persisted research state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchRecord {
    pub reliability: f64,
    pub threat_level: u32,
    pub cost_exponent: f64,
    pub purchased: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct Research {
    config: ResearchConfig,
    reliability: f64,
    threat_level: u32,
    cost_exponent: f64,
    /// Append-only.
    purchased: Vec<u32>,
    displayed: Vec<DisplayedOption>,
}

impl Research {
    pub fn new(config: &ResearchConfig) -> Self {
        let mut research = Self {
            config: config.clone(),
            reliability: 0.0,
            threat_level: 1,
            cost_exponent: config.cost_exponent,
            purchased: Vec::new(),
            displayed: Vec::new(),
        };
        research.refresh();
        research
    }

    pub fn from_record(record: ResearchRecord, config: &ResearchConfig) -> Self {
        let mut research = Self {
            config: config.clone(),
            reliability: record.reliability.max(0.0),
            threat_level: record.threat_level.max(1),
            cost_exponent: record.cost_exponent,
            purchased: Vec::new(),
            displayed: Vec::new(),
        };
        for index in record.purchased {
            if !research.purchased.contains(&index) {
                research.purchased.push(index);
            }
        }
        research.refresh();
        research
    }

    pub fn to_record(&self) -> ResearchRecord {
        ResearchRecord {
            reliability: self.reliability,
            threat_level: self.threat_level,
            cost_exponent: self.cost_exponent,
            purchased: self.purchased.clone(),
        }
    }

    /// Reads `research.*`, falling back to defaults per key.
    pub fn load(state: &PersistentState, config: &ResearchConfig) -> Self {
        let record = ResearchRecord {
            reliability: state.get("research.reliability").unwrap_or(0.0),
            threat_level: state.get("research.threat-level").unwrap_or(1),
            cost_exponent: state
                .get("research.cost-exponent")
                .unwrap_or(config.cost_exponent),
            purchased: state.get("research.purchased").unwrap_or_default(),
        };
        Self::from_record(record, config)
    }

    pub fn store(&self, state: &mut PersistentState) {
        state.set_value("research.reliability", self.reliability.into());
        state.set_value("research.threat-level", self.threat_level.into());
        state.set_value("research.cost-exponent", self.cost_exponent.into());
        state.set_value("research.purchased", self.purchased.clone().into());
    }

    pub fn reliability(&self) -> f64 {
        self.reliability
    }

    pub fn threat_level(&self) -> u32 {
        self.threat_level
    }

    pub fn cost_exponent(&self) -> f64 {
        self.cost_exponent
    }

    pub fn purchased(&self) -> &[u32] {
        &self.purchased
    }

    pub fn displayed(&self) -> &[DisplayedOption] {
        &self.displayed
    }

    pub fn is_purchased(&self, index: u32) -> bool {
        self.purchased.contains(&index)
    }

    /// Adds (or with a negative delta, removes) reliability. Never below 0.
    pub fn add_reliability(&mut self, delta: f64) {
        self.reliability = (self.reliability + delta).max(0.0);
        self.refresh();
    }

    pub fn raise_threat_level(&mut self) {
        self.threat_level += 1;
        log::info!("threat level raised to {}", self.threat_level);
        self.refresh();
    }

    /// Raises every future price.
    pub fn increment_exponent(&mut self) {
        self.cost_exponent += self.config.exponent_step;
        self.refresh();
    }

    pub fn cost(&self, index: u32) -> f64 {
        option_cost(index, self.config.base_cost, self.cost_exponent)
    }

    pub fn threshold(&self, index: u32) -> f64 {
        display_threshold(index, self.config.base_display, self.cost_exponent)
    }

    fn is_eligible(&self, option: &ResearchOption) -> bool {
        !self.is_purchased(option.index)
            && self.threat_level >= option.min_threat
            && self.reliability >= self.threshold(option.index)
    }

    /// Drops bought options, updates the rest in place and fills free
    /// slots with newly eligible options in catalog order.
    pub fn refresh(&mut self) {
        let purchased = &self.purchased;
        self.displayed.retain(|d| !purchased.contains(&d.index));

        let reliability = self.reliability;
        let costs: Vec<f64> = self.displayed.iter().map(|d| self.cost(d.index)).collect();
        for (shown, cost) in self.displayed.iter_mut().zip(costs) {
            shown.cost = cost;
            shown.enabled = reliability >= cost;
        }

        for option in CATALOG.iter() {
            if self.displayed.len() >= self.config.max_displayed {
                break;
            }
            if self.displayed.iter().any(|d| d.index == option.index) || !self.is_eligible(option) {
                continue;
            }
            let cost = self.cost(option.index);
            self.displayed.push(DisplayedOption {
                index: option.index,
                cost,
                enabled: reliability >= cost,
            });
        }
    }

    /// Buys a displayed option and returns the effect to apply.
    ///
    /// `choice` selects a side of a choice option and is ignored for
    /// singular ones.
    pub fn purchase(&mut self, index: u32, choice: Option<usize>) -> Result<ResearchEffect, Rejection> {
        let shown = self
            .displayed
            .iter()
            .find(|d| d.index == index)
            .copied()
            .ok_or(Rejection::ResearchUnavailable(index))?;
        let option = catalog_option(index).ok_or(Rejection::ResearchUnavailable(index))?;

        let effect = match option.shape {
            ResearchShape::Singular(effect) => effect,
            ResearchShape::Choice(choices) => choice
                .and_then(|c| choices.get(c))
                .map(|c| c.effect)
                .ok_or(Rejection::InvalidChoice(index))?,
        };

        if self.reliability < shown.cost {
            return Err(Rejection::InsufficientReliability {
                needed: shown.cost,
                available: self.reliability,
            });
        }

        self.reliability -= shown.cost;
        self.purchased.push(index);
        log::info!("research '{}' purchased ({})", option.title, effect.tag());
        if effect == ResearchEffect::ThreatLevel {
            self.raise_threat_level();
        } else {
            self.refresh();
        }
        Ok(effect)
    }
}
