//! Cryptogram: click the characters of a hidden password in order.
//!
//! Cells are the character buttons: every distinct password character
//! plus a set of decoys, shuffled. The revealed prefix grows with each
//! correct click; any other click loses the hack.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{scaled, ClickOutcome, Puzzle};
use crate::utils::{random_choice, shuffle, unique_sample, ALPHANUMERIC};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cryptogram {
    password: Vec<char>,
    cells: Vec<char>,
    progress: usize,
}

impl Cryptogram {
    /// Board with a known password. Cells are the password's distinct
    /// characters followed by `decoys`, unshuffled.
    pub fn new(password: &str, decoys: &[char]) -> Self {
        let password: Vec<char> = password.chars().collect();
        let mut cells: Vec<char> = Vec::new();
        for &c in password.iter().chain(decoys) {
            if !cells.contains(&c) {
                cells.push(c);
            }
        }
        Self {
            password,
            cells,
            progress: 0,
        }
    }

    fn length(threat_level: u32) -> usize {
        scaled(3, threat_level * 2, 8)
    }

    pub fn cells(&self) -> &[char] {
        &self.cells
    }

    /// Cell index showing `c`.
    pub fn cell_of(&self, c: char) -> Option<usize> {
        self.cells.iter().position(|&x| x == c)
    }

    pub fn progress(&self) -> usize {
        self.progress
    }

    pub fn password_len(&self) -> usize {
        self.password.len()
    }

    /// Password with unrevealed positions masked, e.g. `"AB_"`.
    pub fn revealed(&self) -> String {
        self.password
            .iter()
            .enumerate()
            .map(|(i, &c)| if i < self.progress { c } else { '_' })
            .collect()
    }
}

impl Puzzle for Cryptogram {
    fn time_limit(threat_level: u32) -> u32 {
        15 + 3 * Self::length(threat_level) as u32
    }

    fn generate<R: Rng + ?Sized>(threat_level: u32, rng: &mut R) -> Self {
        let len = Self::length(threat_level);
        let chars = unique_sample(rng, len * 2, 200, |r| {
            random_choice(r, ALPHANUMERIC).map_or('X', |&b| b as char)
        });
        let split = len.min(chars.len());
        let password: String = chars[..split].iter().collect();
        let mut board = Self::new(&password, &chars[split..]);
        shuffle(rng, &mut board.cells);
        board
    }

    fn click(&mut self, cell: usize) -> ClickOutcome {
        let Some(&c) = self.cells.get(cell) else {
            return ClickOutcome::Ignored;
        };
        if self.is_solved() {
            return ClickOutcome::Ignored;
        }
        if self.password[self.progress] != c {
            return ClickOutcome::Failed;
        }
        self.progress += 1;
        if self.is_solved() {
            ClickOutcome::Solved
        } else {
            ClickOutcome::Progress
        }
    }

    fn is_solved(&self) -> bool {
        self.progress >= self.password.len()
    }

    fn cell_count(&self) -> usize {
        self.cells.len()
    }
}
