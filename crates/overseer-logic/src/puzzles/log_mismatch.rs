//! Log mismatch: spot the rows where a copied log differs from the source.
//!
//! Cells are row indices. Clicking a tampered row marks it found; clicking
//! an intact row loses the hack.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{scaled, ClickOutcome, Puzzle};
use crate::utils::{random_range, shuffle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMismatch {
    original: Vec<String>,
    copy: Vec<String>,
    found: Vec<bool>,
}

fn random_ip<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "10.{}.{}.{}",
        random_range(rng, 0u8, 255u8),
        random_range(rng, 0u8, 255u8),
        random_range(rng, 1u8, 255u8)
    )
}

fn log_row(time: u32, source: &str, dest: &str, port: u32) -> String {
    format!(
        "{:02}:{:02}:{:02} {} -> {}:{}",
        time / 3600 % 24,
        time / 60 % 60,
        time % 60,
        source,
        dest,
        port
    )
}

impl LogMismatch {
    /// Board from two logs of equal length.
    pub fn new(original: Vec<String>, copy: Vec<String>) -> Self {
        Self {
            found: vec![false; original.len()],
            original,
            copy,
        }
    }

    fn row_count(threat_level: u32) -> usize {
        scaled(6, threat_level * 2, 12)
    }

    pub fn original(&self) -> &[String] {
        &self.original
    }

    pub fn copy(&self) -> &[String] {
        &self.copy
    }

    pub fn is_mismatched(&self, row: usize) -> bool {
        match (self.original.get(row), self.copy.get(row)) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        }
    }

    pub fn mismatched_rows(&self) -> Vec<usize> {
        (0..self.original.len())
            .filter(|&r| self.is_mismatched(r))
            .collect()
    }
}

impl Puzzle for LogMismatch {
    fn time_limit(threat_level: u32) -> u32 {
        20 + 3 * Self::row_count(threat_level) as u32
    }

    fn generate<R: Rng + ?Sized>(threat_level: u32, rng: &mut R) -> Self {
        let rows = Self::row_count(threat_level);
        let mut time = random_range(rng, 0u32, 86_400u32);
        let mut original = Vec::with_capacity(rows);
        let mut ports = Vec::with_capacity(rows);
        let mut endpoints = Vec::with_capacity(rows);
        for _ in 0..rows {
            time += random_range(rng, 1u32, 90u32);
            let source = random_ip(rng);
            let dest = random_ip(rng);
            let port = random_range(rng, 20u32, 9000u32);
            original.push(log_row(time, &source, &dest, port));
            ports.push(port);
            endpoints.push((time, source, dest));
        }

        let mismatches = scaled(1, threat_level, rows / 2).max(1);
        let mut order: Vec<usize> = (0..rows).collect();
        shuffle(rng, &mut order);

        let mut copy = original.clone();
        for &row in order.iter().take(mismatches) {
            let (time, source, dest) = &endpoints[row];
            let tampered = ports[row] + random_range(rng, 1u32, 1000u32);
            copy[row] = log_row(*time, source, dest, tampered);
        }
        Self::new(original, copy)
    }

    fn click(&mut self, cell: usize) -> ClickOutcome {
        if cell >= self.original.len() || self.found[cell] {
            return ClickOutcome::Ignored;
        }
        if !self.is_mismatched(cell) {
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
        (0..self.original.len()).all(|r| self.found[r] || !self.is_mismatched(r))
    }

    fn cell_count(&self) -> usize {
        self.original.len()
    }
}
