//! Ordered numbers: click 1, 2, 3 ... N on a shuffled grid.
//!
//! Cells are the grid in row-major order. Numbers already cleared ignore
//! further clicks; any number other than the next one loses the hack.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{scaled, ClickOutcome, Puzzle};
use crate::utils::shuffle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedNumbers {
    cells: Vec<u32>,
    next: u32,
}

impl OrderedNumbers {
    /// Board over the given permutation of `1..=cells.len()`.
    pub fn new(cells: Vec<u32>) -> Self {
        Self { cells, next: 1 }
    }

    fn side_for(threat_level: u32) -> usize {
        scaled(3, threat_level, 6)
    }

    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    /// The number the player must click next.
    pub fn next(&self) -> u32 {
        self.next
    }

    pub fn cell_of(&self, value: u32) -> Option<usize> {
        self.cells.iter().position(|&v| v == value)
    }
}

impl Puzzle for OrderedNumbers {
    fn time_limit(threat_level: u32) -> u32 {
        let side = Self::side_for(threat_level) as u32;
        10 + side * side
    }

    fn generate<R: Rng + ?Sized>(threat_level: u32, rng: &mut R) -> Self {
        let side = Self::side_for(threat_level) as u32;
        let mut cells: Vec<u32> = (1..=side * side).collect();
        shuffle(rng, &mut cells);
        Self::new(cells)
    }

    fn click(&mut self, cell: usize) -> ClickOutcome {
        let Some(&value) = self.cells.get(cell) else {
            return ClickOutcome::Ignored;
        };
        if value < self.next {
            return ClickOutcome::Ignored;
        }
        if value != self.next {
            return ClickOutcome::Failed;
        }
        self.next += 1;
        if self.is_solved() {
            ClickOutcome::Solved
        } else {
            ClickOutcome::Progress
        }
    }

    fn is_solved(&self) -> bool {
        self.next as usize > self.cells.len()
    }

    fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_ascending_solves() {
        let mut rng = StdRng::seed_from_u64(31);
        let mut board = OrderedNumbers::generate(1, &mut rng);
        let n = board.cell_count() as u32;
        assert_eq!(n, 9);
        for value in 1..n {
            assert_eq!(board.click(board.cell_of(value).unwrap()), ClickOutcome::Progress);
        }
        assert_eq!(board.click(board.cell_of(n).unwrap()), ClickOutcome::Solved);
    }

    #[test]
    fn test_wrong_order_fails() {
        let mut board = OrderedNumbers::new(vec![3, 1, 4, 2]);
        assert_eq!(board.click(1), ClickOutcome::Progress);
        assert_eq!(board.click(0), ClickOutcome::Failed);
    }

    #[test]
    fn test_cleared_number_ignored() {
        let mut board = OrderedNumbers::new(vec![3, 1, 4, 2]);
        assert_eq!(board.click(1), ClickOutcome::Progress);
        assert_eq!(board.click(1), ClickOutcome::Ignored);
        assert_eq!(board.next(), 2);
    }
}
