//! Entity definitions for the simulation.
//!
//! These are plain data with local invariants (a disk never overfills, a
//! core holds at most one task). Cross-entity rules live in the managers
//! under `systems`.

mod channel;
mod common;
mod core_task;
mod disk;

pub use channel::*;
pub use common::*;
pub use core_task::*;
pub use disk::*;
