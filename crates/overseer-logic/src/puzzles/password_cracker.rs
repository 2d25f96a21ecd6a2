//! Password cracker: rotate character wheels until they spell the target.
//!
//! Cells are wheel indices; each click advances that wheel by one slot.
//! There is no wrong click, only the clock.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{scaled, ClickOutcome, Puzzle};
use crate::utils::{random_choice, random_range, unique_sample, ALPHANUMERIC};

const RING_SIZE: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wheel {
    pub ring: Vec<char>,
    pub position: usize,
    pub target: usize,
}

impl Wheel {
    pub fn current(&self) -> char {
        self.ring.get(self.position).copied().unwrap_or(' ')
    }

    pub fn is_aligned(&self) -> bool {
        self.position == self.target
    }

    fn rotate(&mut self) {
        if !self.ring.is_empty() {
            self.position = (self.position + 1) % self.ring.len();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordCracker {
    wheels: Vec<Wheel>,
}

impl PasswordCracker {
    pub fn new(wheels: Vec<Wheel>) -> Self {
        Self { wheels }
    }

    fn wheel_count(threat_level: u32) -> usize {
        scaled(3, threat_level, 6)
    }

    pub fn wheels(&self) -> &[Wheel] {
        &self.wheels
    }

    /// The password the wheels must spell.
    pub fn target(&self) -> String {
        self.wheels
            .iter()
            .map(|w| w.ring.get(w.target).copied().unwrap_or(' '))
            .collect()
    }

    /// What the wheels currently spell.
    pub fn current(&self) -> String {
        self.wheels.iter().map(Wheel::current).collect()
    }

    /// Clicks wheel `index` needs before it is aligned.
    pub fn turns_needed(&self, index: usize) -> Option<usize> {
        let wheel = self.wheels.get(index)?;
        let len = wheel.ring.len().max(1);
        Some((wheel.target + len - wheel.position) % len)
    }
}

impl Puzzle for PasswordCracker {
    fn time_limit(threat_level: u32) -> u32 {
        10 + 6 * Self::wheel_count(threat_level) as u32
    }

    fn generate<R: Rng + ?Sized>(threat_level: u32, rng: &mut R) -> Self {
        let wheels = (0..Self::wheel_count(threat_level))
            .map(|_| {
                let ring = unique_sample(rng, RING_SIZE, 200, |r| {
                    random_choice(r, ALPHANUMERIC).map_or('0', |&b| b as char)
                });
                let len = ring.len();
                let position = random_range(rng, 0usize, len);
                let offset = random_range(rng, 1usize, len.max(2));
                Wheel {
                    target: (position + offset) % len.max(1),
                    ring,
                    position,
                }
            })
            .collect();
        Self { wheels }
    }

    fn click(&mut self, cell: usize) -> ClickOutcome {
        if cell >= self.wheels.len() || self.is_solved() {
            return ClickOutcome::Ignored;
        }
        self.wheels[cell].rotate();
        if self.is_solved() {
            ClickOutcome::Solved
        } else {
            ClickOutcome::Progress
        }
    }

    fn is_solved(&self) -> bool {
        self.wheels.iter().all(Wheel::is_aligned)
    }

    fn cell_count(&self) -> usize {
        self.wheels.len()
    }
}
