//! Core scheduler - binds tasks to cores and tracks their progress
//!
//! `CoreManager` is the only admission point for work: a task runs only
//! once it is bound to a free core, and a core holds at most one task.
//! Progress is never stored; it is recomputed from the task's start time,
//! so a late or skipped tick cannot lose work.

use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::components::{Core, CoreId, CoreTask, TaskHandle, TaskId, TaskKind};
use crate::config::TaskConfig;
use crate::error::Rejection;

/// Result of a user cancel request.
#[derive(Debug, Clone, PartialEq)]
pub enum CancelOutcome {
    /// The task already reached 100%; the cancel is ignored and the next
    /// update completes it normally.
    CompletionPending,
    /// The task was unbound. `infinite` is already cleared.
    Cancelled(CoreTask),
}

/// What `complete` did with a finished task.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Infinite task, restarted on the same core.
    Restarted,
    /// Finite task, core released.
    Released(CoreTask),
}

/// A task whose progress reached 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueTask {
    pub handle: TaskHandle,
    pub kind: TaskKind,
}

/// Persisted form of a running task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub kind: TaskKind,
    pub label: String,
    pub cost: f64,
    pub infinite: bool,
    /// Milliseconds of progress already made.
    pub elapsed: Millis,
}

/// Persisted form of a core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreRecord {
    pub id: CoreId,
    pub power: f64,
    pub upgrades: u32,
    pub task: Option<TaskRecord>,
}

/// Owns every core. Cores are only ever added, never removed.
#[derive(Debug, Clone)]
pub struct CoreManager {
    cores: Vec<Core>,
    max_upgrades: u32,
    progress_constant: f64,
    next_task_id: u64,
}

impl CoreManager {
    /// One idle core.
    pub fn new(config: &TaskConfig) -> Self {
        let mut manager = Self {
            cores: Vec::new(),
            max_upgrades: config.max_upgrades,
            progress_constant: config.progress_constant,
            next_task_id: 0,
        };
        manager.add_core();
        manager
    }

    pub fn add_core(&mut self) -> CoreId {
        let id = CoreId(self.cores.len() as u32);
        self.cores.push(Core::new(id));
        id
    }

    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    pub fn core(&self, id: CoreId) -> Option<&Core> {
        self.cores.iter().find(|c| c.id == id)
    }

    fn core_mut(&mut self, id: CoreId) -> Option<&mut Core> {
        self.cores.iter_mut().find(|c| c.id == id)
    }

    pub fn max_upgrades(&self) -> u32 {
        self.max_upgrades
    }

    pub fn raise_max_upgrades(&mut self, by: u32) {
        self.max_upgrades += by;
    }

    pub fn progress_constant(&self) -> f64 {
        self.progress_constant
    }

    pub fn busy_count(&self) -> usize {
        self.cores.iter().filter(|c| c.is_busy()).count()
    }

    /// First free core in creation order.
    pub fn free_core(&self) -> Option<CoreId> {
        self.cores.iter().find(|c| !c.is_busy()).map(|c| c.id)
    }

    /// Binds `task` to `core`, or to the first free core when `core` is
    /// `None`. On failure the task comes back unbound.
    pub fn start_core_task(
        &mut self,
        mut task: CoreTask,
        core: Option<CoreId>,
        now: Millis,
    ) -> Result<TaskHandle, CoreTask> {
        let target = match core {
            Some(id) => match self.core(id) {
                Some(c) if !c.is_busy() => id,
                _ => return Err(task),
            },
            None => match self.free_core() {
                Some(id) => id,
                None => return Err(task),
            },
        };

        let task_id = TaskId(self.next_task_id);
        self.next_task_id += 1;
        task.id = Some(task_id);
        task.core = Some(target);
        task.started_at = now;

        let Some(slot) = self.core_mut(target) else {
            return Err(task);
        };
        log::debug!("{} started on core {}", task.label, target);
        slot.task = Some(task);
        Ok(TaskHandle {
            core: target,
            task: task_id,
        })
    }

    /// The task behind `handle`, unless the core has moved on.
    pub fn task(&self, handle: TaskHandle) -> Option<&CoreTask> {
        self.core(handle.core)?
            .task()
            .filter(|t| t.id == Some(handle.task))
    }

    /// Current task handle on `core`.
    pub fn handle_on(&self, core: CoreId) -> Option<TaskHandle> {
        let task = self.core(core)?.task()?;
        Some(TaskHandle {
            core,
            task: task.id?,
        })
    }

    /// Handle of the first running task matching `pred`.
    pub fn find_task(&self, pred: impl Fn(&CoreTask) -> bool) -> Option<TaskHandle> {
        self.cores.iter().find_map(|c| {
            let task = c.task().filter(|t| pred(t))?;
            Some(TaskHandle {
                core: c.id,
                task: task.id?,
            })
        })
    }

    pub fn progress(&self, handle: TaskHandle, now: Millis) -> Option<f64> {
        let core = self.core(handle.core)?;
        let task = self.task(handle)?;
        Some(task.progress(core.power, self.progress_constant, now))
    }

    /// Every task at or past 100%, in core order.
    pub fn due_tasks(&self, now: Millis) -> Vec<DueTask> {
        self.cores
            .iter()
            .filter_map(|core| {
                let task = core.task()?;
                if task.progress(core.power, self.progress_constant, now) < 100.0 {
                    return None;
                }
                Some(DueTask {
                    handle: TaskHandle {
                        core: core.id,
                        task: task.id?,
                    },
                    kind: task.kind,
                })
            })
            .collect()
    }

    /// Finishes a due task. Infinite tasks restart at `now`; anything else
    /// releases its core.
    pub fn complete(&mut self, handle: TaskHandle, now: Millis) -> Option<Completion> {
        self.task(handle)?;
        let core = self.core_mut(handle.core)?;
        let infinite = core.task.as_ref().map(|t| t.infinite)?;
        if infinite {
            if let Some(task) = core.task.as_mut() {
                task.started_at = now;
            }
            return Some(Completion::Restarted);
        }
        let task = core.task.take()?;
        log::debug!("{} completed on core {}", task.label, handle.core);
        Some(Completion::Released(task))
    }

    /// Unbinds a task unconditionally, clearing its infinite flag first.
    pub fn cancel(&mut self, handle: TaskHandle) -> Option<CoreTask> {
        self.task(handle)?;
        let core = self.core_mut(handle.core)?;
        if let Some(task) = core.task.as_mut() {
            task.infinite = false;
        }
        let task = core.task.take()?;
        log::debug!("{} cancelled on core {}", task.label, handle.core);
        Some(task)
    }

    /// A user cancel. Completion wins when the task has already reached
    /// 100% at `now`.
    pub fn request_cancel(&mut self, handle: TaskHandle, now: Millis) -> Option<CancelOutcome> {
        if self.progress(handle, now)? >= 100.0 {
            return Some(CancelOutcome::CompletionPending);
        }
        self.cancel(handle).map(CancelOutcome::Cancelled)
    }

    /// Checks that `core` may start an overclock.
    pub fn check_overclock(&self, core: CoreId) -> Result<f64, Rejection> {
        let c = self.core(core).ok_or(Rejection::UnknownCore(core))?;
        if c.upgrades >= self.max_upgrades {
            return Err(Rejection::UpgradeCeiling(core));
        }
        if c.is_busy() {
            return Err(Rejection::CoreBusy(core));
        }
        Ok(c.power)
    }

    /// Doubles a core's power. Returns the new power.
    pub fn upgrade(&mut self, core: CoreId) -> Option<f64> {
        let c = self.core_mut(core)?;
        c.power *= 2.0;
        c.upgrades += 1;
        Some(c.power)
    }

    pub fn to_records(&self, now: Millis) -> Vec<CoreRecord> {
        self.cores
            .iter()
            .map(|c| CoreRecord {
                id: c.id,
                power: c.power,
                upgrades: c.upgrades,
                task: c.task().map(|t| TaskRecord {
                    kind: t.kind,
                    label: t.label.clone(),
                    cost: t.cost,
                    infinite: t.infinite,
                    elapsed: t.elapsed(now),
                }),
            })
            .collect()
    }

    /// Rebuilds cores from records, resuming each task with its saved
    /// progress. An empty record list yields the single default core.
    pub fn from_records(records: Vec<CoreRecord>, max_upgrades: u32, config: &TaskConfig, now: Millis) -> Self {
        let mut manager = Self {
            cores: Vec::new(),
            max_upgrades,
            progress_constant: config.progress_constant,
            next_task_id: 0,
        };
        for record in records {
            let mut core = Core::new(CoreId(manager.cores.len() as u32));
            core.power = record.power.max(1.0);
            core.upgrades = record.upgrades;
            if let Some(saved) = record.task {
                let mut task = CoreTask::new(saved.kind, saved.cost).with_label(saved.label);
                task.infinite = saved.infinite;
                task.id = Some(TaskId(manager.next_task_id));
                task.core = Some(core.id);
                task.started_at = now.saturating_sub(saved.elapsed);
                manager.next_task_id += 1;
                core.task = Some(task);
            }
            manager.cores.push(core);
        }
        if manager.cores.is_empty() {
            manager.add_core();
        }
        manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{ChannelId, DiskId};

    fn manager() -> CoreManager {
        CoreManager::new(&TaskConfig::default())
    }

    #[test]
    fn test_first_fit_binding() {
        let mut cores = manager();
        cores.add_core();
        cores.add_core();
        let a = cores.start_core_task(CoreTask::new(TaskKind::Search, 10.0), None, 0).unwrap();
        let b = cores.start_core_task(CoreTask::new(TaskKind::Search, 10.0), None, 0).unwrap();
        assert_eq!(a.core, CoreId(0));
        assert_eq!(b.core, CoreId(1));
        assert_ne!(a.task, b.task);
        assert_eq!(cores.busy_count(), 2);
    }

    #[test]
    fn test_busy_core_rejects() {
        let mut cores = manager();
        cores
            .start_core_task(CoreTask::new(TaskKind::Overclock, 1000.0), Some(CoreId(0)), 0)
            .unwrap();
        let rejected = cores.start_core_task(CoreTask::new(TaskKind::Search, 1.0), Some(CoreId(0)), 0);
        let task = rejected.unwrap_err();
        assert!(!task.is_bound());
        assert!(cores
            .start_core_task(CoreTask::new(TaskKind::Search, 1.0), None, 0)
            .is_err());
        assert!(cores
            .start_core_task(CoreTask::new(TaskKind::Search, 1.0), Some(CoreId(9)), 0)
            .is_err());
    }

    #[test]
    fn test_finite_completion_releases() {
        let mut cores = manager();
        let handle = cores
            .start_core_task(CoreTask::new(TaskKind::Overclock, 1000.0), None, 0)
            .unwrap();
        assert!(cores.due_tasks(1999).is_empty());
        let due = cores.due_tasks(2000);
        assert_eq!(due, vec![DueTask { handle, kind: TaskKind::Overclock }]);
        assert!(matches!(cores.complete(handle, 2000), Some(Completion::Released(_))));
        assert!(cores.free_core().is_some());
        assert!(cores.complete(handle, 2000).is_none());
    }

    #[test]
    fn test_infinite_task_keeps_core() {
        let mut cores = manager();
        let handle = cores.start_core_task(CoreTask::new(TaskKind::Search, 500.0), None, 0).unwrap();
        let mut now = 0;
        for _ in 0..5 {
            now += 1000;
            assert_eq!(cores.due_tasks(now).len(), 1);
            assert_eq!(cores.complete(handle, now), Some(Completion::Restarted));
            assert!(cores.due_tasks(now).is_empty());
        }
        assert_eq!(cores.task(handle).map(|t| t.id()), Some(Some(handle.task)));
    }

    #[test]
    fn test_cancel_clears_infinite_flag() {
        let mut cores = manager();
        let handle = cores
            .start_core_task(CoreTask::new(TaskKind::Siphon { channel: ChannelId(0) }, 2500.0), None, 0)
            .unwrap();
        let task = cores.cancel(handle).unwrap();
        assert!(!task.is_infinite());
        assert!(cores.task(handle).is_none());
        assert!(cores.cancel(handle).is_none());
    }

    #[test]
    fn test_completion_wins_over_cancel() {
        let mut cores = manager();
        let handle = cores
            .start_core_task(CoreTask::new(TaskKind::Scan { disk: DiskId(0) }, 100.0), None, 0)
            .unwrap();
        assert_eq!(cores.request_cancel(handle, 200), Some(CancelOutcome::CompletionPending));
        assert!(cores.task(handle).is_some());
        assert!(matches!(cores.complete(handle, 200), Some(Completion::Released(_))));
    }

    #[test]
    fn test_request_cancel_before_done() {
        let mut cores = manager();
        let handle = cores
            .start_core_task(CoreTask::new(TaskKind::Search, 5000.0), None, 0)
            .unwrap();
        match cores.request_cancel(handle, 10) {
            Some(CancelOutcome::Cancelled(task)) => assert!(!task.is_infinite()),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(cores.busy_count(), 0);
    }

    #[test]
    fn test_stale_handle() {
        let mut cores = manager();
        let old = cores.start_core_task(CoreTask::new(TaskKind::Overclock, 1.0), None, 0).unwrap();
        cores.cancel(old);
        let new = cores.start_core_task(CoreTask::new(TaskKind::Search, 1.0), None, 0).unwrap();
        assert_eq!(old.core, new.core);
        assert!(cores.task(old).is_none());
        assert!(cores.request_cancel(old, 0).is_none());
    }

    #[test]
    fn test_overclock_ceiling() {
        let mut cores = CoreManager::new(&TaskConfig {
            max_upgrades: 1,
            ..TaskConfig::default()
        });
        assert_eq!(cores.check_overclock(CoreId(0)), Ok(1.0));
        assert_eq!(cores.upgrade(CoreId(0)), Some(2.0));
        assert_eq!(cores.check_overclock(CoreId(0)), Err(Rejection::UpgradeCeiling(CoreId(0))));
        cores.raise_max_upgrades(1);
        assert_eq!(cores.check_overclock(CoreId(0)), Ok(2.0));
        assert_eq!(cores.check_overclock(CoreId(4)), Err(Rejection::UnknownCore(CoreId(4))));
    }

    #[test]
    fn test_records_resume_progress() {
        let mut cores = manager();
        cores.upgrade(CoreId(0));
        cores
            .start_core_task(CoreTask::new(TaskKind::Search, 5000.0), None, 1000)
            .unwrap();
        let records = cores.to_records(4000);
        assert_eq!(records[0].task.as_ref().map(|t| t.elapsed), Some(3000));

        let restored = CoreManager::from_records(records, 3, &TaskConfig::default(), 50_000);
        let core = &restored.cores()[0];
        assert_eq!(core.power(), 2.0);
        assert_eq!(core.task().map(|t| t.started_at()), Some(47_000));
        assert!(core.task().map(|t| t.is_infinite()).unwrap_or(false));
    }
}
