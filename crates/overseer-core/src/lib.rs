//! Overseer Core - idle security-monitoring game engine
//!
//! A simulation of a network overseer: compute cores run timed tasks that
//! find files, scan them into quarantine, purge them for reliability, and
//! crack and siphon channels. Reliability buys research, and randomized
//! hacks and verdicts interrupt the player along the way.
//!
//! # Architecture
//!
//! - **Components**: plain data (cores, tasks, disks, files, channels)
//! - **Systems**: managers that own the components and enforce the
//!   cross-entity rules (first-fit core binding, quarantine placement,
//!   research pricing, detection drift, hack and verdict state machines)
//! - **Engine**: [`engine::Overseer`] ties them together behind one clock
//!   and one RNG, and persists them through [`state::PersistentState`]
//!
//! # Example
//!
//! ```rust,no_run
//! use overseer_core::prelude::*;
//!
//! let clock = ManualClock::new(0);
//! let mut game = Overseer::in_memory(OverseerConfig::default(), Box::new(clock.clone()));
//!
//! game.start_search().unwrap();
//! loop {
//!     clock.advance(100);
//!     game.update();
//! }
//! ```

pub mod clock;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod generation;
pub mod messenger;
pub mod persistence;
pub mod settings;
pub mod state;
pub mod stats;
pub mod systems;
pub mod version;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, Millis, SystemClock, MINUTE, SECOND};
    pub use crate::components::*;
    pub use crate::config::OverseerConfig;
    pub use crate::engine::Overseer;
    pub use crate::error::Rejection;
    pub use crate::state::{FileStorage, MemoryStorage, Storage};
    pub use overseer_logic::puzzles::{ClickOutcome, HackKind};
}
