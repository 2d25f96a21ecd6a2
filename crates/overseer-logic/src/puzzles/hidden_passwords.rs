//! Hidden passwords: find known passwords buried in filler text.
//!
//! The board is a block of lines made of words. Each password sits on its
//! own line. Cells are the words in reading order; clicking a password
//! marks it found, clicking filler does nothing. Only the clock can fail
//! this board.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{scaled, ClickOutcome, Puzzle};
use crate::utils::{random_choice, random_range, random_string, shuffle, unique_sample, LOWERCASE};

const WORDS_PER_LINE: usize = 6;

static PASSWORD_STEMS: &[&str] = &[
    "falcon", "cipher", "vector", "kernel", "raven", "sentry", "quartz", "nimbus", "onyx", "pulsar",
    "tango", "zephyr", "argon", "cobalt", "delta", "ember", "glacier", "harbor", "ion", "jackal",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiddenPasswords {
    lines: Vec<Vec<String>>,
    passwords: Vec<String>,
    /// (line, column) of each password, parallel to `passwords`.
    hidden: Vec<(usize, usize)>,
    found: Vec<bool>,
}

impl HiddenPasswords {
    fn password_count(threat_level: u32) -> usize {
        scaled(2, threat_level, 5)
    }

    pub fn lines(&self) -> &[Vec<String>] {
        &self.lines
    }

    pub fn passwords(&self) -> &[String] {
        &self.passwords
    }

    /// Line and column for a flat cell index.
    pub fn locate(&self, cell: usize) -> Option<(usize, usize)> {
        let mut offset = 0;
        for (line_idx, line) in self.lines.iter().enumerate() {
            if cell < offset + line.len() {
                return Some((line_idx, cell - offset));
            }
            offset += line.len();
        }
        None
    }

    /// Flat cell index for a line and column.
    pub fn cell_index(&self, line: usize, column: usize) -> Option<usize> {
        let row = self.lines.get(line)?;
        if column >= row.len() {
            return None;
        }
        Some(self.lines[..line].iter().map(Vec::len).sum::<usize>() + column)
    }

    /// Cell indices of every hidden password.
    pub fn hidden_cells(&self) -> Vec<usize> {
        self.hidden
            .iter()
            .filter_map(|&(line, col)| self.cell_index(line, col))
            .collect()
    }

    pub fn found_count(&self) -> usize {
        self.found.iter().filter(|&&f| f).count()
    }
}

impl Puzzle for HiddenPasswords {
    fn time_limit(threat_level: u32) -> u32 {
        20 + 5 * Self::password_count(threat_level) as u32
    }

    fn generate<R: Rng + ?Sized>(threat_level: u32, rng: &mut R) -> Self {
        let count = Self::password_count(threat_level);
        let line_count = count + 3;

        // Passwords carry digits, filler never does, so they cannot collide.
        let passwords = unique_sample(rng, count, 100, |r| {
            let stem = random_choice(r, PASSWORD_STEMS).copied().unwrap_or("root");
            format!("{}{}", stem, random_range(r, 10u32, 100u32))
        });

        let mut lines: Vec<Vec<String>> = (0..line_count)
            .map(|_| {
                (0..WORDS_PER_LINE)
                    .map(|_| {
                        let len = random_range(rng, 3usize, 9usize);
                        random_string(rng, len, LOWERCASE)
                    })
                    .collect()
            })
            .collect();

        let mut line_order: Vec<usize> = (0..line_count).collect();
        shuffle(rng, &mut line_order);

        let mut hidden = Vec::with_capacity(passwords.len());
        for (password, &line) in passwords.iter().zip(&line_order) {
            let column = random_range(rng, 0usize, WORDS_PER_LINE + 1);
            lines[line].insert(column, password.clone());
            hidden.push((line, column));
        }

        Self {
            found: vec![false; passwords.len()],
            lines,
            passwords,
            hidden,
        }
    }

    fn click(&mut self, cell: usize) -> ClickOutcome {
        let Some(position) = self.locate(cell) else {
            return ClickOutcome::Ignored;
        };
        let Some(idx) = self.hidden.iter().position(|&h| h == position) else {
            return ClickOutcome::Ignored;
        };
        if self.found[idx] {
            return ClickOutcome::Ignored;
        }
        self.found[idx] = true;
        if self.is_solved() {
            ClickOutcome::Solved
        } else {
            ClickOutcome::Progress
        }
    }

    fn is_solved(&self) -> bool {
        self.found.iter().all(|&f| f)
    }

    fn cell_count(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }
}
