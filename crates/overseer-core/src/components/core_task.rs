//! Compute cores and the tasks they run.

use serde::{Deserialize, Serialize};

use super::{ChannelId, CoreId, DiskId, TaskId};
use crate::clock::Millis;

/// What a task does when it completes or is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    /// Double the owning core's power.
    Overclock,
    /// Look for a new file and store it on a regular disk.
    Search,
    /// Move a disk's threats into quarantine and clear it.
    Scan { disk: DiskId },
    /// Delete a quarantine disk's files for reliability.
    Purge { disk: DiskId },
    /// Open a channel for siphoning.
    Crack { channel: ChannelId },
    /// Pull one unit of data from a cracked channel.
    Siphon { channel: ChannelId },
}

impl TaskKind {
    pub fn label(&self) -> &'static str {
        match self {
            TaskKind::Overclock => "Overclock",
            TaskKind::Search => "Search",
            TaskKind::Scan { .. } => "Scan",
            TaskKind::Purge { .. } => "Purge",
            TaskKind::Crack { .. } => "Crack",
            TaskKind::Siphon { .. } => "Siphon",
        }
    }

    /// Infinite tasks restart after each completion instead of releasing
    /// their core.
    pub fn is_infinite(&self) -> bool {
        matches!(self, TaskKind::Search | TaskKind::Siphon { .. })
    }
}

/// A unit of work with a cost, bound to at most one core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreTask {
    pub label: String,
    pub cost: f64,
    pub kind: TaskKind,
    pub(crate) id: Option<TaskId>,
    pub(crate) core: Option<CoreId>,
    pub(crate) started_at: Millis,
    pub(crate) infinite: bool,
}

impl CoreTask {
    pub fn new(kind: TaskKind, cost: f64) -> Self {
        Self {
            label: kind.label().to_string(),
            cost,
            kind,
            id: None,
            core: None,
            started_at: 0,
            infinite: kind.is_infinite(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn id(&self) -> Option<TaskId> {
        self.id
    }

    pub fn core(&self) -> Option<CoreId> {
        self.core
    }

    pub fn is_bound(&self) -> bool {
        self.core.is_some()
    }

    pub fn is_infinite(&self) -> bool {
        self.infinite
    }

    pub fn started_at(&self) -> Millis {
        self.started_at
    }

    pub fn elapsed(&self, now: Millis) -> Millis {
        now.saturating_sub(self.started_at)
    }

    /// Percent complete for a core of `power`, from absolute elapsed time.
    /// Reaches 100 after `cost * K / power` ms.
    ///
    /// May exceed 100; a zero cost is immediately complete.
    pub fn progress(&self, power: f64, progress_constant: f64, now: Millis) -> f64 {
        let divisor = self.cost * progress_constant;
        if divisor <= 0.0 {
            return 100.0;
        }
        100.0 * power * self.elapsed(now) as f64 / divisor
    }
}

/// A unit of compute capacity running at most one task.
#[derive(Debug, Clone, PartialEq)]
pub struct Core {
    pub id: CoreId,
    pub(crate) power: f64,
    pub(crate) upgrades: u32,
    pub(crate) task: Option<CoreTask>,
}

impl Core {
    pub fn new(id: CoreId) -> Self {
        Self {
            id,
            power: 1.0,
            upgrades: 0,
            task: None,
        }
    }

    pub fn power(&self) -> f64 {
        self.power
    }

    pub fn upgrades(&self) -> u32 {
        self.upgrades
    }

    pub fn task(&self) -> Option<&CoreTask> {
        self.task.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.task.is_some()
    }

    /// Percent complete of the current task, if any.
    pub fn progress(&self, progress_constant: f64, now: Millis) -> Option<f64> {
        self.task
            .as_ref()
            .map(|t| t.progress(self.power, progress_constant, now))
    }
}
