//! Disks and the files stored on them.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::DiskId;

/// A file found by a search. Threat files must be quarantined and purged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskFile {
    pub name: String,
    pub extension: String,
    /// Size in KB.
    pub size: u64,
    pub is_threat: bool,
    /// Threat level at which the file was generated.
    pub threat_level: u32,
}

impl DiskFile {
    pub fn new(
        name: impl Into<String>,
        extension: impl Into<String>,
        size: u64,
        is_threat: bool,
        threat_level: u32,
    ) -> Self {
        Self {
            name: name.into(),
            extension: extension.into(),
            size,
            is_threat,
            threat_level,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.extension)
    }
}

/// Finite-capacity file container.
///
/// Usage never exceeds `max_storage`: `add_file` refuses anything that
/// does not fit, without evicting or splitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disk {
    pub id: DiskId,
    pub name: String,
    /// Capacity in KB.
    pub max_storage: u64,
    pub is_quarantine: bool,
    /// Set while a scan or purge task runs against this disk.
    pub is_wiping: bool,
    /// Front-end focus. Exactly one disk holds it.
    #[serde(default)]
    pub displayed: bool,
    files: Vec<DiskFile>,
}

impl Disk {
    pub fn new(id: DiskId, name: impl Into<String>, max_storage: u64, is_quarantine: bool) -> Self {
        Self {
            id,
            name: name.into(),
            max_storage,
            is_quarantine,
            is_wiping: false,
            displayed: false,
            files: Vec::new(),
        }
    }

    pub fn files(&self) -> &[DiskFile] {
        &self.files
    }

    pub fn usage(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    pub fn free_space(&self) -> u64 {
        self.max_storage.saturating_sub(self.usage())
    }

    pub fn has_room_for(&self, size: u64) -> bool {
        self.free_space() >= size
    }

    pub fn is_busy(&self) -> bool {
        self.is_wiping
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Stores `file` if it fits, otherwise hands it back untouched.
    pub fn add_file(&mut self, file: DiskFile) -> Result<(), DiskFile> {
        if !self.has_room_for(file.size) {
            return Err(file);
        }
        self.files.push(file);
        Ok(())
    }

    /// Empties the disk, returning everything it held.
    pub fn take_files(&mut self) -> Vec<DiskFile> {
        std::mem::take(&mut self.files)
    }

    /// Removes one file chosen uniformly at random.
    pub fn remove_random_file<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<DiskFile> {
        if self.files.is_empty() {
            return None;
        }
        let idx = rng.gen_range(0..self.files.len());
        Some(self.files.remove(idx))
    }

    /// Multiplies capacity in place.
    pub fn scale_capacity(&mut self, factor: u64) {
        self.max_storage = self.max_storage.saturating_mul(factor);
    }
}
