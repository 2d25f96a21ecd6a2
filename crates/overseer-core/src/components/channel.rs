//! Data channels: crack them open, then siphon until dry.

use serde::{Deserialize, Serialize};

use super::ChannelId;
use overseer_logic::detection::MAX_DETECTION;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    /// Colon-delimited hex pairs, e.g. `3f:a2:0c:9b:11:e4`.
    pub name: String,
    /// 0-100.
    pub detection: u32,
    /// Data units left to siphon.
    pub remaining: u32,
    pub is_cracked: bool,
    /// Set while a crack or siphon task runs.
    pub is_busy: bool,
}

impl Channel {
    pub fn new(id: ChannelId, name: impl Into<String>, detection: u32, remaining: u32) -> Self {
        Self {
            id,
            name: name.into(),
            detection: detection.min(MAX_DETECTION),
            remaining,
            is_cracked: false,
            is_busy: false,
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.remaining == 0
    }

    /// Lowers detection by one point; no-op while busy or at zero.
    pub fn cool_down(&mut self) -> bool {
        if self.is_busy || self.detection == 0 {
            return false;
        }
        self.detection -= 1;
        true
    }

    /// Raises detection by one point; no-op while busy or at the cap.
    pub fn heat_up(&mut self) -> bool {
        if self.is_busy || self.detection >= MAX_DETECTION {
            return false;
        }
        self.detection += 1;
        true
    }
}
