//! Disk manager - file placement, scans, purges and quarantine breakouts

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::{Disk, DiskFile, DiskId};
use crate::config::DiskConfig;
use crate::error::Rejection;
use crate::generation::DiskNamePool;

/// What a finished scan did with the disk's files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub scanned: u32,
    pub quarantined: u32,
    /// Threats lost because no quarantine had room.
    pub dropped: u32,
}

/// What a finished purge removed and earned.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PurgeReport {
    pub purged: u32,
    pub reliability: f64,
}

/// Persisted form of the disk manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskRecords {
    pub disks: Vec<Disk>,
    pub name_pool: DiskNamePool,
    pub size_multiplier: u64,
}

/// Owns every disk. Disks are only ever added, never removed.
#[derive(Debug, Clone)]
pub struct DiskManager {
    disks: Vec<Disk>,
    name_pool: DiskNamePool,
    /// Cumulative factor applied by disk-size research.
    size_multiplier: u64,
    config: DiskConfig,
}

impl DiskManager {
    /// One regular disk and one quarantine disk.
    pub fn new(config: &DiskConfig, rng: &mut impl Rng) -> Self {
        let mut manager = Self {
            disks: Vec::new(),
            name_pool: DiskNamePool::build(config.name_pool_side, rng),
            size_multiplier: 1,
            config: config.clone(),
        };
        manager.add_disk(false);
        manager.add_disk(true);
        manager
    }

    pub fn from_records(records: DiskRecords, config: &DiskConfig, rng: &mut impl Rng) -> Self {
        if records.disks.is_empty() {
            return Self::new(config, rng);
        }
        let mut manager = Self {
            disks: records.disks,
            name_pool: records.name_pool,
            size_multiplier: records.size_multiplier.max(1),
            config: config.clone(),
        };
        if !manager.disks.iter().any(|d| d.displayed) {
            manager.disks[0].displayed = true;
        }
        manager
    }

    pub fn to_records(&self) -> DiskRecords {
        DiskRecords {
            disks: self.disks.clone(),
            name_pool: self.name_pool.clone(),
            size_multiplier: self.size_multiplier,
        }
    }

    pub fn disks(&self) -> &[Disk] {
        &self.disks
    }

    pub fn disk(&self, id: DiskId) -> Option<&Disk> {
        self.disks.iter().find(|d| d.id == id)
    }

    fn disk_mut(&mut self, id: DiskId) -> Result<&mut Disk, Rejection> {
        self.disks
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(Rejection::UnknownDisk(id))
    }

    pub fn size_multiplier(&self) -> u64 {
        self.size_multiplier
    }

    pub fn name_pool(&self) -> &DiskNamePool {
        &self.name_pool
    }

    pub fn add_disk(&mut self, is_quarantine: bool) -> DiskId {
        let id = DiskId(self.disks.len() as u32);
        let base = if is_quarantine {
            self.config.quarantine_size
        } else {
            self.config.disk_size
        };
        let name = self.name_pool.next_name();
        let mut disk = Disk::new(id, name, base.saturating_mul(self.size_multiplier), is_quarantine);
        disk.displayed = self.disks.is_empty();
        self.disks.push(disk);
        id
    }

    /// Multiplies every disk's capacity, and that of disks added later.
    pub fn multiply_sizes(&mut self, factor: u64) {
        self.size_multiplier = self.size_multiplier.saturating_mul(factor);
        for disk in &mut self.disks {
            disk.scale_capacity(factor);
        }
    }

    /// Moves UI focus to `id`.
    pub fn display(&mut self, id: DiskId) -> Result<(), Rejection> {
        self.disk_mut(id)?;
        for disk in &mut self.disks {
            disk.displayed = disk.id == id;
        }
        Ok(())
    }

    /// Stores `file` on the first idle regular disk with room.
    pub fn add_file_to_disk(&mut self, file: DiskFile) -> Result<DiskId, DiskFile> {
        Self::first_fit(&mut self.disks, false, file)
    }

    /// Stores `file` on the first idle quarantine disk with room.
    pub fn add_file_to_quarantine(&mut self, file: DiskFile) -> Result<DiskId, DiskFile> {
        Self::first_fit(&mut self.disks, true, file)
    }

    fn first_fit(disks: &mut [Disk], quarantine: bool, file: DiskFile) -> Result<DiskId, DiskFile> {
        let target = disks
            .iter_mut()
            .find(|d| d.is_quarantine == quarantine && !d.is_busy() && d.has_room_for(file.size));
        match target {
            Some(disk) => disk.add_file(file).map(|()| disk.id),
            None => Err(file),
        }
    }

    pub fn has_available_quarantine(&self) -> bool {
        self.disks.iter().any(|d| d.is_quarantine && !d.is_busy())
    }

    /// Files held across all quarantine disks.
    pub fn quarantined_files(&self) -> usize {
        self.disks
            .iter()
            .filter(|d| d.is_quarantine)
            .map(|d| d.files().len())
            .sum()
    }

    /// Validates a scan and returns its cost (the disk's usage).
    pub fn scan_cost(&self, id: DiskId) -> Result<f64, Rejection> {
        let disk = self.disk(id).ok_or(Rejection::UnknownDisk(id))?;
        if disk.is_quarantine {
            return Err(Rejection::QuarantineDisk(id));
        }
        if disk.is_busy() {
            return Err(Rejection::DiskBusy(id));
        }
        if disk.is_empty() {
            return Err(Rejection::DiskEmpty(id));
        }
        if !self.has_available_quarantine() {
            return Err(Rejection::NoQuarantine);
        }
        Ok(disk.usage() as f64)
    }

    /// Validates a purge and returns its cost (the disk's usage).
    pub fn purge_cost(&self, id: DiskId) -> Result<f64, Rejection> {
        let disk = self.disk(id).ok_or(Rejection::UnknownDisk(id))?;
        if !disk.is_quarantine {
            return Err(Rejection::NotQuarantine(id));
        }
        if disk.is_busy() {
            return Err(Rejection::DiskBusy(id));
        }
        if disk.is_empty() {
            return Err(Rejection::DiskEmpty(id));
        }
        Ok(disk.usage() as f64)
    }

    pub fn set_busy(&mut self, id: DiskId, busy: bool) -> Result<(), Rejection> {
        self.disk_mut(id)?.is_wiping = busy;
        Ok(())
    }

    /// Empties a scanned disk, routing every threat into quarantine.
    pub fn finish_scan(&mut self, id: DiskId) -> Result<ScanReport, Rejection> {
        let disk = self.disk_mut(id)?;
        disk.is_wiping = false;
        let files = disk.take_files();

        let mut report = ScanReport {
            scanned: files.len() as u32,
            ..ScanReport::default()
        };
        for file in files.into_iter().filter(|f| f.is_threat) {
            match self.add_file_to_quarantine(file) {
                Ok(_) => report.quarantined += 1,
                Err(_) => report.dropped += 1,
            }
        }
        Ok(report)
    }

    /// Empties a purged disk; every KB is worth 0.01 reliability.
    pub fn finish_purge(&mut self, id: DiskId) -> Result<PurgeReport, Rejection> {
        let disk = self.disk_mut(id)?;
        disk.is_wiping = false;
        let files = disk.take_files();
        Ok(PurgeReport {
            purged: files.len() as u32,
            reliability: files.iter().map(|f| f.size as f64 / 100.0).sum(),
        })
    }

    /// Releases a disk after its task was cancelled, keeping its files.
    pub fn abort_work(&mut self, id: DiskId) -> Result<(), Rejection> {
        self.set_busy(id, false)
    }

    /// Removes up to `count` files from random non-empty quarantine disks.
    /// Returns how many were actually lost.
    pub fn breakout(&mut self, count: u32, rng: &mut impl Rng) -> u32 {
        let mut lost = 0;
        for _ in 0..count {
            let candidates: Vec<usize> = self
                .disks
                .iter()
                .enumerate()
                .filter(|(_, d)| d.is_quarantine && !d.is_empty())
                .map(|(i, _)| i)
                .collect();
            if candidates.is_empty() {
                break;
            }
            let pick = candidates[rng.gen_range(0..candidates.len())];
            if self.disks[pick].remove_random_file(rng).is_some() {
                lost += 1;
            }
        }
        lost
    }

    /// Clears busy flags on disks that no running task refers to.
    pub fn reconcile_busy(&mut self, in_use: &[DiskId]) {
        for disk in &mut self.disks {
            if disk.is_wiping && !in_use.contains(&disk.id) {
                log::warn!("disk {} was busy with no task, releasing", disk.name);
                disk.is_wiping = false;
            }
        }
    }
}
