//! Hack minigame boards.
//!
//! Every hack shares one countdown/lock state machine (in the engine); what
//! differs is the board. A board knows how to generate itself for a threat
//! level, how long the player gets, how to judge a click on one of its
//! cells, and whether it is solved. [`Board`] is the tagged variant the
//! engine stores, dispatching to the eight concrete boards.
//!
//! Cells are addressed by a flat index. Each board documents how its index
//! space maps onto what the player sees.

mod cryptogram;
mod data_corruption;
mod hex_matcher;
mod hidden_passwords;
mod log_mismatch;
mod number_multiples;
mod ordered_numbers;
mod password_cracker;

pub use cryptogram::*;
pub use data_corruption::*;
pub use hex_matcher::*;
pub use hidden_passwords::*;
pub use log_mismatch::*;
pub use number_multiples::*;
pub use ordered_numbers::*;
pub use password_cracker::*;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// How a board judged a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickOutcome {
    /// Click had no effect (out of range, already used, filler).
    Ignored,
    /// Valid step; the board is not finished yet.
    Progress,
    /// Valid step that completed the board.
    Solved,
    /// Wrong click; the hack is lost.
    Failed,
}

/// Capability every hack board provides.
pub trait Puzzle {
    /// Countdown length in seconds at `threat_level`.
    fn time_limit(threat_level: u32) -> u32
    where
        Self: Sized;

    /// Builds a fresh board sized for `threat_level`.
    fn generate<R: Rng + ?Sized>(threat_level: u32, rng: &mut R) -> Self
    where
        Self: Sized;

    /// Judges a click on `cell`.
    fn click(&mut self, cell: usize) -> ClickOutcome;

    fn is_solved(&self) -> bool;

    /// Size of the cell index space.
    fn cell_count(&self) -> usize;
}

/// The hack variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HackKind {
    Cryptogram,
    HiddenPasswords,
    NumberMultiples,
    OrderedNumbers,
    HexMatcher,
    LogMismatch,
    DataCorruption,
    PasswordCracker,
}

impl HackKind {
    pub const ALL: [HackKind; 8] = [
        HackKind::Cryptogram,
        HackKind::HiddenPasswords,
        HackKind::NumberMultiples,
        HackKind::OrderedNumbers,
        HackKind::HexMatcher,
        HackKind::LogMismatch,
        HackKind::DataCorruption,
        HackKind::PasswordCracker,
    ];

    /// Stable index used for the persisted `hack-type` marker.
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&k| k == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            HackKind::Cryptogram => "Cryptogram",
            HackKind::HiddenPasswords => "Hidden Passwords",
            HackKind::NumberMultiples => "Number Multiples",
            HackKind::OrderedNumbers => "Ordered Numbers",
            HackKind::HexMatcher => "Hex Matcher",
            HackKind::LogMismatch => "Log Mismatch",
            HackKind::DataCorruption => "Data Corruption",
            HackKind::PasswordCracker => "Password Cracker",
        }
    }

    /// Countdown length for this kind at `threat_level`.
    pub fn time_limit(self, threat_level: u32) -> u32 {
        match self {
            HackKind::Cryptogram => Cryptogram::time_limit(threat_level),
            HackKind::HiddenPasswords => HiddenPasswords::time_limit(threat_level),
            HackKind::NumberMultiples => NumberMultiples::time_limit(threat_level),
            HackKind::OrderedNumbers => OrderedNumbers::time_limit(threat_level),
            HackKind::HexMatcher => HexMatcher::time_limit(threat_level),
            HackKind::LogMismatch => LogMismatch::time_limit(threat_level),
            HackKind::DataCorruption => DataCorruption::time_limit(threat_level),
            HackKind::PasswordCracker => PasswordCracker::time_limit(threat_level),
        }
    }
}

/// A generated board of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Board {
    Cryptogram(Cryptogram),
    HiddenPasswords(HiddenPasswords),
    NumberMultiples(NumberMultiples),
    OrderedNumbers(OrderedNumbers),
    HexMatcher(HexMatcher),
    LogMismatch(LogMismatch),
    DataCorruption(DataCorruption),
    PasswordCracker(PasswordCracker),
}

impl Board {
    pub fn generate<R: Rng + ?Sized>(kind: HackKind, threat_level: u32, rng: &mut R) -> Self {
        match kind {
            HackKind::Cryptogram => Board::Cryptogram(Cryptogram::generate(threat_level, rng)),
            HackKind::HiddenPasswords => {
                Board::HiddenPasswords(HiddenPasswords::generate(threat_level, rng))
            }
            HackKind::NumberMultiples => {
                Board::NumberMultiples(NumberMultiples::generate(threat_level, rng))
            }
            HackKind::OrderedNumbers => {
                Board::OrderedNumbers(OrderedNumbers::generate(threat_level, rng))
            }
            HackKind::HexMatcher => Board::HexMatcher(HexMatcher::generate(threat_level, rng)),
            HackKind::LogMismatch => Board::LogMismatch(LogMismatch::generate(threat_level, rng)),
            HackKind::DataCorruption => {
                Board::DataCorruption(DataCorruption::generate(threat_level, rng))
            }
            HackKind::PasswordCracker => {
                Board::PasswordCracker(PasswordCracker::generate(threat_level, rng))
            }
        }
    }

    pub fn kind(&self) -> HackKind {
        match self {
            Board::Cryptogram(_) => HackKind::Cryptogram,
            Board::HiddenPasswords(_) => HackKind::HiddenPasswords,
            Board::NumberMultiples(_) => HackKind::NumberMultiples,
            Board::OrderedNumbers(_) => HackKind::OrderedNumbers,
            Board::HexMatcher(_) => HackKind::HexMatcher,
            Board::LogMismatch(_) => HackKind::LogMismatch,
            Board::DataCorruption(_) => HackKind::DataCorruption,
            Board::PasswordCracker(_) => HackKind::PasswordCracker,
        }
    }

    fn as_puzzle_mut(&mut self) -> &mut dyn PuzzleDyn {
        match self {
            Board::Cryptogram(b) => b,
            Board::HiddenPasswords(b) => b,
            Board::NumberMultiples(b) => b,
            Board::OrderedNumbers(b) => b,
            Board::HexMatcher(b) => b,
            Board::LogMismatch(b) => b,
            Board::DataCorruption(b) => b,
            Board::PasswordCracker(b) => b,
        }
    }

    fn as_puzzle(&self) -> &dyn PuzzleDyn {
        match self {
            Board::Cryptogram(b) => b,
            Board::HiddenPasswords(b) => b,
            Board::NumberMultiples(b) => b,
            Board::OrderedNumbers(b) => b,
            Board::HexMatcher(b) => b,
            Board::LogMismatch(b) => b,
            Board::DataCorruption(b) => b,
            Board::PasswordCracker(b) => b,
        }
    }

    pub fn click(&mut self, cell: usize) -> ClickOutcome {
        self.as_puzzle_mut().click_dyn(cell)
    }

    pub fn is_solved(&self) -> bool {
        self.as_puzzle().is_solved_dyn()
    }

    pub fn cell_count(&self) -> usize {
        self.as_puzzle().cell_count_dyn()
    }
}

/// Object-safe slice of [`Puzzle`] used for dispatch inside [`Board`].
trait PuzzleDyn {
    fn click_dyn(&mut self, cell: usize) -> ClickOutcome;
    fn is_solved_dyn(&self) -> bool;
    fn cell_count_dyn(&self) -> usize;
}

impl<P: Puzzle> PuzzleDyn for P {
    fn click_dyn(&mut self, cell: usize) -> ClickOutcome {
        self.click(cell)
    }

    fn is_solved_dyn(&self) -> bool {
        self.is_solved()
    }

    fn cell_count_dyn(&self) -> usize {
        self.cell_count()
    }
}

/// Threat-scaled size: `base + threat_level / 2`, capped at `max`.
pub(crate) fn scaled(base: usize, threat_level: u32, max: usize) -> usize {
    (base + threat_level as usize / 2).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_kind_index_roundtrip() {
        for kind in HackKind::ALL {
            assert_eq!(HackKind::from_index(kind.index()), Some(kind));
        }
        assert_eq!(HackKind::from_index(8), None);
    }

    #[test]
    fn test_generated_boards_start_unsolved() {
        let mut rng = StdRng::seed_from_u64(42);
        for threat in 1..6 {
            for kind in HackKind::ALL {
                let board = Board::generate(kind, threat, &mut rng);
                assert_eq!(board.kind(), kind);
                assert!(!board.is_solved(), "{kind:?} solved at generation");
                assert!(board.cell_count() > 0);
                assert!(kind.time_limit(threat) > 0);
            }
        }
    }

    #[test]
    fn test_out_of_range_click_is_ignored() {
        let mut rng = StdRng::seed_from_u64(42);
        for kind in HackKind::ALL {
            let mut board = Board::generate(kind, 1, &mut rng);
            let count = board.cell_count();
            assert_eq!(board.click(count + 10), ClickOutcome::Ignored);
        }
    }

    #[test]
    fn test_time_limits_grow_with_threat() {
        for kind in HackKind::ALL {
            assert!(kind.time_limit(8) >= kind.time_limit(1));
        }
    }
}
