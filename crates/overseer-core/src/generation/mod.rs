//! Generation - procedural creation of disk names, files and channels.

mod files;
mod names;

pub use files::*;
pub use names::*;
