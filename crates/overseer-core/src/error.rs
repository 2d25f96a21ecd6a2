//! Refusals of player actions.
//!
//! None of these are faults: running out of cores or disk space is part of
//! the game. The `Display` text is what the player reads in the log.

use crate::components::{ChannelId, CoreId, DiskId};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("No free cores available")]
    NoFreeCore,
    #[error("Core {0} is busy")]
    CoreBusy(CoreId),
    #[error("Core {0} cannot be overclocked any further")]
    UpgradeCeiling(CoreId),
    #[error("No quarantine disk available")]
    NoQuarantine,
    #[error("Disk {0} is busy")]
    DiskBusy(DiskId),
    #[error("Disk {0} is empty")]
    DiskEmpty(DiskId),
    #[error("Disk {0} is a quarantine disk")]
    QuarantineDisk(DiskId),
    #[error("Disk {0} is not a quarantine disk")]
    NotQuarantine(DiskId),
    #[error("Channel {0} is busy")]
    ChannelBusy(ChannelId),
    #[error("Channel {0} has not been cracked")]
    ChannelLocked(ChannelId),
    #[error("Channel {0} is already cracked")]
    ChannelCracked(ChannelId),
    #[error("Channel {0} has no data left")]
    ChannelDepleted(ChannelId),
    #[error("No such core: {0}")]
    UnknownCore(CoreId),
    #[error("No such disk: {0}")]
    UnknownDisk(DiskId),
    #[error("No such channel: {0}")]
    UnknownChannel(ChannelId),
    #[error("No running task on core {0}")]
    NoTask(CoreId),
    #[error("Research option {0} is not available")]
    ResearchUnavailable(u32),
    #[error("Not enough reliability: need {needed}, have {available}")]
    InsufficientReliability { needed: f64, available: f64 },
    #[error("Research option {0} needs a valid choice")]
    InvalidChoice(u32),
    #[error("No hack in progress")]
    NoHack,
    #[error("No verdict pending")]
    NoVerdict,
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}
