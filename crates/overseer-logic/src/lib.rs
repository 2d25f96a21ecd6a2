//! Pure game logic for Overseer.
//!
//! This crate contains the parts of the game that do not own any state
//! beyond their own values: random helpers, progression formulas and the
//! hack puzzle boards. Functions take plain data (and an `Rng` where
//! randomness is involved) and return results, so they are unit-testable
//! with a seeded generator and reusable from the engine, the harness and
//! any future front end.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`utils`] | Uniform ranges, choice, coin flip, shuffle, best-effort unique sampling |
//! | [`research`] | Research option cost and display-threshold formulas |
//! | [`detection`] | Channel detection decay/increase and hack-generation chances |
//! | [`puzzles`] | The eight hack minigame boards behind one `Board` variant |

pub mod detection;
pub mod puzzles;
pub mod research;
pub mod utils;
