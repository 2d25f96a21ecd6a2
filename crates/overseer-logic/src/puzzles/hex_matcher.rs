//! Hex matcher: pair each hex key with its decimal value.
//!
//! Cells `0..n` are the keys (`0x3F`), cells `n..2n` the shuffled decimal
//! values (`63`). Click a key to select it, then its value. A wrong value
//! loses the hack; a value clicked with no key selected does nothing.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{scaled, ClickOutcome, Puzzle};
use crate::utils::{random_range, shuffle, unique_sample};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexMatcher {
    keys: Vec<u8>,
    values: Vec<u8>,
    key_matched: Vec<bool>,
    value_matched: Vec<bool>,
    selected: Option<usize>,
}

impl HexMatcher {
    /// Board from keys and a permutation of them as values.
    pub fn new(keys: Vec<u8>, values: Vec<u8>) -> Self {
        Self {
            key_matched: vec![false; keys.len()],
            value_matched: vec![false; values.len()],
            keys,
            values,
            selected: None,
        }
    }

    fn pair_count(threat_level: u32) -> usize {
        scaled(3, threat_level, 6)
    }

    pub fn pairs(&self) -> usize {
        self.keys.len()
    }

    pub fn key_label(&self, index: usize) -> Option<String> {
        self.keys.get(index).map(|k| format!("0x{k:02X}"))
    }

    pub fn value_label(&self, index: usize) -> Option<String> {
        self.values.get(index).map(|v| v.to_string())
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Cell index of the value matching key `index`.
    pub fn value_cell_for_key(&self, index: usize) -> Option<usize> {
        let key = *self.keys.get(index)?;
        self.values
            .iter()
            .position(|&v| v == key)
            .map(|pos| self.keys.len() + pos)
    }
}

impl Puzzle for HexMatcher {
    fn time_limit(threat_level: u32) -> u32 {
        15 + 5 * Self::pair_count(threat_level) as u32
    }

    fn generate<R: Rng + ?Sized>(threat_level: u32, rng: &mut R) -> Self {
        let count = Self::pair_count(threat_level);
        let keys = unique_sample(rng, count, 100, |r| random_range(r, 16u8, 255u8));
        let mut values = keys.clone();
        shuffle(rng, &mut values);
        Self::new(keys, values)
    }

    fn click(&mut self, cell: usize) -> ClickOutcome {
        let n = self.keys.len();
        if cell < n {
            if self.key_matched[cell] {
                return ClickOutcome::Ignored;
            }
            self.selected = Some(cell);
            return ClickOutcome::Progress;
        }
        let value_idx = cell - n;
        if value_idx >= self.values.len() || self.value_matched[value_idx] {
            return ClickOutcome::Ignored;
        }
        let Some(key_idx) = self.selected else {
            return ClickOutcome::Ignored;
        };
        if self.values[value_idx] != self.keys[key_idx] {
            return ClickOutcome::Failed;
        }
        self.key_matched[key_idx] = true;
        self.value_matched[value_idx] = true;
        self.selected = None;
        if self.is_solved() {
            ClickOutcome::Solved
        } else {
            ClickOutcome::Progress
        }
    }

    fn is_solved(&self) -> bool {
        self.key_matched.iter().all(|&m| m)
    }

    fn cell_count(&self) -> usize {
        self.keys.len() + self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_labels() {
        let board = HexMatcher::new(vec![0x3F, 0x10], vec![0x10, 0x3F]);
        assert_eq!(board.key_label(0).as_deref(), Some("0x3F"));
        assert_eq!(board.value_label(0).as_deref(), Some("16"));
    }

    #[test]
    fn test_match_all_pairs() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut board = HexMatcher::generate(2, &mut rng);
        let n = board.pairs();
        assert_eq!(n, 4);
        for key in 0..n {
            assert_eq!(board.click(key), ClickOutcome::Progress);
            let value_cell = board.value_cell_for_key(key).unwrap();
            let expected = if key + 1 == n {
                ClickOutcome::Solved
            } else {
                ClickOutcome::Progress
            };
            assert_eq!(board.click(value_cell), expected);
        }
    }

    #[test]
    fn test_wrong_value_fails() {
        let mut board = HexMatcher::new(vec![0x3F, 0x10], vec![0x10, 0x3F]);
        assert_eq!(board.click(0), ClickOutcome::Progress);
        assert_eq!(board.click(2), ClickOutcome::Failed);
    }

    #[test]
    fn test_value_without_selection_ignored() {
        let mut board = HexMatcher::new(vec![0x3F, 0x10], vec![0x10, 0x3F]);
        assert_eq!(board.click(3), ClickOutcome::Ignored);
        assert_eq!(board.selected(), None);
    }
}
