//! Data corruption: spot the corrupted segments in a hex dump.
//!
//! Cells are the dump's four-character segments. A segment is corrupted
//! when it holds any non-hex character. Clicking a clean segment loses the
//! hack.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{scaled, ClickOutcome, Puzzle};
use crate::utils::{random_choice, random_range, random_string, shuffle, HEX_DIGITS};

const SEGMENT_LEN: usize = 4;
const CORRUPT_CHARS: &[u8] = b"GHJKMNPQRTVWXYZ#%&?";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataCorruption {
    segments: Vec<String>,
    found: Vec<bool>,
}

impl DataCorruption {
    pub fn new(segments: Vec<String>) -> Self {
        Self {
            found: vec![false; segments.len()],
            segments,
        }
    }

    fn segment_count(threat_level: u32) -> usize {
        (16 + 4 * threat_level as usize).min(40)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_corrupted(&self, cell: usize) -> bool {
        self.segments
            .get(cell)
            .is_some_and(|s| s.chars().any(|c| !c.is_ascii_hexdigit()))
    }

    pub fn corrupted_cells(&self) -> Vec<usize> {
        (0..self.segments.len())
            .filter(|&c| self.is_corrupted(c))
            .collect()
    }
}

impl Puzzle for DataCorruption {
    fn time_limit(threat_level: u32) -> u32 {
        15 + Self::segment_count(threat_level) as u32 / 2
    }

    fn generate<R: Rng + ?Sized>(threat_level: u32, rng: &mut R) -> Self {
        let count = Self::segment_count(threat_level);
        let mut segments: Vec<String> = (0..count)
            .map(|_| random_string(rng, SEGMENT_LEN, HEX_DIGITS))
            .collect();

        let corrupt = scaled(2, threat_level, 6);
        let mut order: Vec<usize> = (0..count).collect();
        shuffle(rng, &mut order);
        for &idx in order.iter().take(corrupt) {
            let mut chars: Vec<char> = segments[idx].chars().collect();
            let pos = random_range(rng, 0usize, SEGMENT_LEN);
            chars[pos] = random_choice(rng, CORRUPT_CHARS).map_or('#', |&b| b as char);
            segments[idx] = chars.into_iter().collect();
        }
        Self::new(segments)
    }

    fn click(&mut self, cell: usize) -> ClickOutcome {
        if cell >= self.segments.len() || self.found[cell] {
            return ClickOutcome::Ignored;
        }
        if !self.is_corrupted(cell) {
            return ClickOutcome::Failed;
        }
        self.found[cell] = true;
        if self.is_solved() {
            ClickOutcome::Solved
        } else {
            ClickOutcome::Progress
        }
    }

    fn is_solved(&self) -> bool {
        (0..self.segments.len()).all(|c| self.found[c] || !self.is_corrupted(c))
    }

    fn cell_count(&self) -> usize {
        self.segments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_corruption_count() {
        let mut rng = StdRng::seed_from_u64(77);
        let board = DataCorruption::generate(2, &mut rng);
        assert_eq!(board.segments().len(), 24);
        assert_eq!(board.corrupted_cells().len(), 3);
    }

    #[test]
    fn test_clean_segment_fails() {
        let mut board = DataCorruption::new(vec!["AB12".into(), "ZZ00".into()]);
        assert!(!board.is_corrupted(0));
        assert_eq!(board.click(0), ClickOutcome::Failed);
    }

    #[test]
    fn test_find_all_corruption() {
        let mut board = DataCorruption::new(vec!["AB12".into(), "Z100".into(), "00#F".into()]);
        assert_eq!(board.click(1), ClickOutcome::Progress);
        assert_eq!(board.click(1), ClickOutcome::Ignored);
        assert_eq!(board.click(2), ClickOutcome::Solved);
    }
}
