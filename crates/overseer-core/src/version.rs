//! Version check on startup.

use crate::state::PersistentState;

/// This crate's version, recorded under `version`.
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionStatus {
    /// No version stored; a new or wiped save.
    FirstRun,
    Current,
    /// The save was last written by another version.
    Updated { previous: String },
}

/// Compares the stored version with `current` and records `current`.
pub fn check_version(state: &mut PersistentState, current: &str) -> VersionStatus {
    let status = match state.get::<String>("version") {
        None => VersionStatus::FirstRun,
        Some(previous) if previous == current => VersionStatus::Current,
        Some(previous) => VersionStatus::Updated { previous },
    };
    state.set_value("version", current.into());
    status
}
