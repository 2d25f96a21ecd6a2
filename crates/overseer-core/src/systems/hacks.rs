//! Hacks - timed puzzles with a shared countdown and lock
//!
//! A hack moves `Pretext -> Countdown -> Success | Fail`. The board is
//! generated when the countdown starts, so building it eats into the time
//! budget. Once resolved, the hack is locked: every later click or tick is
//! a no-op, which is what keeps a last-moment click from racing the
//! countdown's final second.

use overseer_logic::puzzles::{Board, ClickOutcome, HackKind};
use rand::Rng;

use crate::clock::Millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HackPhase {
    /// Lead-in screen; waiting for the player to start.
    Pretext,
    Countdown,
    Success,
    Fail,
}

impl HackPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, HackPhase::Success | HackPhase::Fail)
    }
}

/// How a hack ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HackOutcome {
    Success,
    Fail,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hack {
    kind: HackKind,
    threat_level: u32,
    phase: HackPhase,
    /// Countdown seconds left.
    time_left: u32,
    locked: bool,
    board: Option<Board>,
    resolved_at: Option<Millis>,
}

impl Hack {
    /// A hack waiting on its pretext screen.
    pub fn new(kind: HackKind, threat_level: u32) -> Self {
        Self {
            kind,
            threat_level,
            phase: HackPhase::Pretext,
            time_left: kind.time_limit(threat_level),
            locked: false,
            board: None,
            resolved_at: None,
        }
    }

    /// Picks a kind uniformly at random.
    pub fn random(threat_level: u32, rng: &mut impl Rng) -> Self {
        let kind = HackKind::ALL[rng.gen_range(0..HackKind::ALL.len())];
        Self::new(kind, threat_level)
    }

    pub fn kind(&self) -> HackKind {
        self.kind
    }

    pub fn threat_level(&self) -> u32 {
        self.threat_level
    }

    pub fn phase(&self) -> HackPhase {
        self.phase
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn resolved_at(&self) -> Option<Millis> {
        self.resolved_at
    }

    /// Leaves the pretext: starts the countdown, then builds the board.
    /// Returns false if the hack was already started.
    pub fn start(&mut self, rng: &mut impl Rng) -> bool {
        if self.phase != HackPhase::Pretext {
            return false;
        }
        self.phase = HackPhase::Countdown;
        self.time_left = self.kind.time_limit(self.threat_level);
        self.board = Some(Board::generate(self.kind, self.threat_level, rng));
        log::debug!("{} started with {}s on the clock", self.kind.title(), self.time_left);
        true
    }

    /// One-second countdown step. Reaching zero fails the hack.
    pub fn tick_second(&mut self, now: Millis) -> Option<HackOutcome> {
        if self.locked || self.phase != HackPhase::Countdown {
            return None;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.resolve(HackPhase::Fail, now);
            return Some(HackOutcome::Fail);
        }
        None
    }

    /// Forwards a click to the board. Resolves the hack on a solving or
    /// failing click.
    pub fn click(&mut self, cell: usize, now: Millis) -> (ClickOutcome, Option<HackOutcome>) {
        if self.locked || self.phase != HackPhase::Countdown {
            return (ClickOutcome::Ignored, None);
        }
        let Some(board) = self.board.as_mut() else {
            return (ClickOutcome::Ignored, None);
        };
        let outcome = board.click(cell);
        let resolution = match outcome {
            ClickOutcome::Solved => {
                self.resolve(HackPhase::Success, now);
                Some(HackOutcome::Success)
            }
            ClickOutcome::Failed => {
                self.resolve(HackPhase::Fail, now);
                Some(HackOutcome::Fail)
            }
            ClickOutcome::Ignored | ClickOutcome::Progress => None,
        };
        (outcome, resolution)
    }

    fn resolve(&mut self, phase: HackPhase, now: Millis) {
        self.phase = phase;
        self.locked = true;
        self.resolved_at = Some(now);
    }

    /// Whether a resolved hack has been on screen for `delay`.
    pub fn ready_for_teardown(&self, now: Millis, delay: Millis) -> bool {
        self.resolved_at
            .is_some_and(|at| now.saturating_sub(at) >= delay)
    }
}
