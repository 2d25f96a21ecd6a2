//! Binary save snapshots
//!
//! Uses bincode for a compact, versioned snapshot of the whole game. Each
//! manager contributes an explicit record type, so the format is spelled
//! out field by field rather than derived from live engine structs.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::components::Channel;
use crate::settings::Settings;
use crate::stats::Stats;
use crate::systems::{CoreRecord, DiskRecords, ResearchRecord};

/// Version number for save file format (increment when format changes)
pub const SAVE_VERSION: u32 = 1;

/// Marker for "no hack/verdict in flight".
pub const NO_EVENT: i32 = -1;

/// Serializable snapshot of the game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    pub cores: Vec<CoreRecord>,
    pub max_upgrades: u32,
    pub disks: DiskRecords,
    pub research: ResearchRecord,
    pub channels: Vec<Channel>,
    pub stats: Stats,
    /// Oldest first.
    pub messages: Vec<String>,
    /// Index of the in-flight hack kind, or [`NO_EVENT`].
    pub hack_type: i32,
    /// Index of the in-flight verdict kind, or [`NO_EVENT`].
    pub verdict_type: i32,
    pub settings: Settings,
    pub paused: bool,
}

pub fn write_save<W: Write>(writer: W, data: &SaveData) -> Result<(), SaveError> {
    bincode::serialize_into(writer, data)?;
    Ok(())
}

pub fn read_save<R: Read>(reader: R) -> Result<SaveData, SaveError> {
    let data: SaveData = bincode::deserialize_from(reader)?;

    if data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: data.version,
        });
    }

    Ok(data)
}

/// Errors from writing or reading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}
