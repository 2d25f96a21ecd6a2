//! Number multiples: pick every grid number divisible by a multiplier.
//!
//! Cells are the grid in row-major order. A multiple is a cell divisible by
//! at least one of the board's multipliers. Clicking a non-multiple loses
//! the hack.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{scaled, ClickOutcome, Puzzle};
use crate::utils::{random_range, shuffle, unique_sample};

const MIN_VALUE: u32 = 2;
const MAX_VALUE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberMultiples {
    side: usize,
    cells: Vec<u32>,
    multipliers: Vec<u32>,
    found: Vec<bool>,
}

impl NumberMultiples {
    pub fn new(side: usize, cells: Vec<u32>, multipliers: Vec<u32>) -> Self {
        Self {
            side,
            found: vec![false; cells.len()],
            cells,
            multipliers,
        }
    }

    fn side_for(threat_level: u32) -> usize {
        scaled(4, threat_level, 7)
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    pub fn multipliers(&self) -> &[u32] {
        &self.multipliers
    }

    pub fn is_multiple(&self, value: u32) -> bool {
        self.multipliers.iter().any(|&m| m != 0 && value % m == 0)
    }

    /// Multiples not yet clicked.
    pub fn remaining(&self) -> usize {
        self.cells
            .iter()
            .zip(&self.found)
            .filter(|&(&v, &f)| !f && self.is_multiple(v))
            .count()
    }
}

impl Puzzle for NumberMultiples {
    fn time_limit(threat_level: u32) -> u32 {
        20 + 2 * Self::side_for(threat_level) as u32
    }

    fn generate<R: Rng + ?Sized>(threat_level: u32, rng: &mut R) -> Self {
        let side = Self::side_for(threat_level);
        let mut pool: Vec<u32> = (MIN_VALUE..MAX_VALUE).collect();
        shuffle(rng, &mut pool);
        pool.truncate(side * side);

        let multiplier_count = if threat_level >= 3 { 2 } else { 1 };
        let multipliers = unique_sample(rng, multiplier_count, 50, |r| random_range(r, 3u32, 10u32));

        let mut board = Self::new(side, pool, multipliers);
        if board.remaining() == 0 {
            // Guarantee something to find: swap in an unused multiple.
            let m = board.multipliers[0];
            let unused = (m..MAX_VALUE)
                .step_by(m as usize)
                .find(|v| !board.cells.contains(v));
            if let Some(value) = unused {
                let idx = random_range(rng, 0usize, board.cells.len());
                board.cells[idx] = value;
            }
        }
        board
    }

    fn click(&mut self, cell: usize) -> ClickOutcome {
        let Some(&value) = self.cells.get(cell) else {
            return ClickOutcome::Ignored;
        };
        if self.found[cell] {
            return ClickOutcome::Ignored;
        }
        if !self.is_multiple(value) {
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
        self.remaining() == 0
    }

    fn cell_count(&self) -> usize {
        self.cells.len()
    }
}
