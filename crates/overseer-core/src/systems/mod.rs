//! Systems - the managers that own and mutate game state

mod channels;
mod cores;
mod disks;
mod hacks;
mod research;
mod timers;
mod verdicts;

pub use channels::*;
pub use cores::*;
pub use disks::*;
pub use hacks::*;
pub use research::*;
pub use timers::*;
pub use verdicts::*;
