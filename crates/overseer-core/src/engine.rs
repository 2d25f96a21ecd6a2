//! Game engine - main entry point for running the game
//!
//! `Overseer` owns every manager and the single clock they share. Player
//! actions are methods on it; `update` advances everything that depends on
//! time, in a fixed order:
//!
//! 1. task completions (every call)
//! 2. one-second work: detection decay, hack countdown, hack teardown
//! 3. one-minute work: hack and verdict spawn checks

use std::io::{Read, Write};

use overseer_logic::puzzles::{ClickOutcome, HackKind};
use overseer_logic::utils::random_range;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;

use crate::clock::{Clock, IntervalTimer, Millis, MINUTE, SECOND};
use crate::components::*;
use crate::config::OverseerConfig;
use crate::error::Rejection;
use crate::generation::{generate_file, DiskNamePool};
use crate::messenger::Messenger;
use crate::persistence::{read_save, write_save, SaveData, SaveError, NO_EVENT, SAVE_VERSION};
use crate::settings::Settings;
use crate::state::{MemoryStorage, PersistentState, StateError, Storage};
use crate::stats::{self, Stats};
use crate::systems::*;
use crate::version::{check_version, VersionStatus, CURRENT_VERSION};

/// Main game engine
pub struct Overseer {
    config: OverseerConfig,
    clock: Box<dyn Clock>,
    state: PersistentState,
    rng: StdRng,

    cores: CoreManager,
    disks: DiskManager,
    research: Research,
    channels: ChannelManager,
    detection: ChannelDetection,
    stats: Stats,
    messenger: Messenger,
    settings: Settings,

    hack: Option<Hack>,
    hack_timer: EventTimer,
    verdict: Option<Verdict>,
    verdict_timer: EventTimer,

    paused: bool,
    pause_time: Option<Millis>,
    unpause_time: Option<Millis>,

    // Update timing
    second_ticker: IntervalTimer,
    minute_ticker: IntervalTimer,

    version_status: VersionStatus,
}

impl Overseer {
    /// Loads saved state from `storage` (or starts fresh) and arms the
    /// event timers.
    pub fn new(
        config: OverseerConfig,
        clock: Box<dyn Clock>,
        storage: Box<dyn Storage>,
    ) -> Result<Self, StateError> {
        let mut state = PersistentState::new(storage);
        state.load()?;
        let version_status = check_version(&mut state, CURRENT_VERSION);
        match &version_status {
            VersionStatus::Updated { previous } => {
                log::info!("save written by {previous}, now running {CURRENT_VERSION}")
            }
            VersionStatus::FirstRun => log::info!("no save found, starting fresh"),
            VersionStatus::Current => {}
        }
        let data = read_state(&state, &config);
        let mut engine = Self::assemble(config, clock, state, version_status);
        engine.pause_time = engine.state.get("pause-time");
        engine.unpause_time = engine.state.get("unpause-time");
        let now = engine.now();
        engine.restore(data, now);
        Ok(engine)
    }

    /// Engine over throwaway in-memory storage.
    pub fn in_memory(config: OverseerConfig, clock: Box<dyn Clock>) -> Self {
        let state = PersistentState::new(Box::new(MemoryStorage::new()));
        let mut engine = Self::assemble(config, clock, state, VersionStatus::FirstRun);
        let data = blank_save(&engine.config);
        let now = engine.now();
        engine.restore(data, now);
        engine
    }

    /// Default managers; `restore` replaces them with the real game.
    fn assemble(
        config: OverseerConfig,
        clock: Box<dyn Clock>,
        state: PersistentState,
        version_status: VersionStatus,
    ) -> Self {
        let now = clock.now_ms();
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            cores: CoreManager::new(&config.tasks),
            disks: DiskManager::new(&config.disks, &mut rng),
            research: Research::new(&config.research),
            channels: ChannelManager::from_channels(Vec::new(), &config.channels),
            detection: ChannelDetection::new(config.channels.detection),
            stats: Stats::new(),
            messenger: Messenger::new(config.message_capacity),
            settings: Settings::default(),
            hack: None,
            hack_timer: EventTimer::new(config.hacks.interval_minutes),
            verdict: None,
            verdict_timer: EventTimer::new(config.verdicts.interval_minutes),
            paused: false,
            pause_time: None,
            unpause_time: None,
            second_ticker: IntervalTimer::new(SECOND, now),
            minute_ticker: IntervalTimer::new(MINUTE, now),
            version_status,
            config,
            clock,
            state,
            rng,
        }
    }

    pub fn now(&self) -> Millis {
        self.clock.now_ms()
    }

    pub fn config(&self) -> &OverseerConfig {
        &self.config
    }

    pub fn cores(&self) -> &CoreManager {
        &self.cores
    }

    pub fn disks(&self) -> &DiskManager {
        &self.disks
    }

    pub fn research(&self) -> &Research {
        &self.research
    }

    pub fn channels(&self) -> &ChannelManager {
        &self.channels
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn messenger(&self) -> &Messenger {
        &self.messenger
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn hack(&self) -> Option<&Hack> {
        self.hack.as_ref()
    }

    pub fn hack_timer(&self) -> &EventTimer {
        &self.hack_timer
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    pub fn verdict_timer(&self) -> &EventTimer {
        &self.verdict_timer
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause_time(&self) -> Option<Millis> {
        self.pause_time
    }

    pub fn unpause_time(&self) -> Option<Millis> {
        self.unpause_time
    }

    pub fn version_status(&self) -> &VersionStatus {
        &self.version_status
    }

    pub fn state(&self) -> &PersistentState {
        &self.state
    }

    /// Progress of whatever `core` is running.
    pub fn task_progress(&self, core: CoreId) -> Option<f64> {
        let handle = self.cores.handle_on(core)?;
        self.cores.progress(handle, self.now())
    }

    /// Advances the game to the clock's current time.
    pub fn update(&mut self) {
        let now = self.now();

        for due in self.cores.due_tasks(now) {
            self.complete_task(due, now);
        }

        for _ in 0..self.second_ticker.periods_elapsed(now) {
            self.tick_second(now);
        }

        for _ in 0..self.minute_ticker.periods_elapsed(now) {
            self.tick_minute(now);
        }
    }

    fn tick_second(&mut self, now: Millis) {
        self.detection.tick(&mut self.channels, &mut self.rng);

        let outcome = self.hack.as_mut().and_then(|h| h.tick_second(now));
        if let Some(outcome) = outcome {
            self.resolve_hack(outcome);
        }

        let delay = self.config.hacks.teardown_delay_ms;
        if self.hack.as_ref().is_some_and(|h| h.ready_for_teardown(now, delay)) {
            self.hack = None;
            self.hack_timer.start(now, &mut self.rng);
        }
    }

    fn tick_minute(&mut self, now: Millis) {
        if self.hack.is_none()
            && self.hack_timer.is_due(now)
            && self.disks.quarantined_files() > 0
        {
            let hack = Hack::random(self.research.threat_level(), &mut self.rng);
            self.spawn_hack(hack);
        }

        if !self.paused && self.verdict.is_none() && self.verdict_timer.is_due(now) {
            let verdict = Verdict::random(&mut self.rng);
            self.spawn_verdict(verdict.kind());
        }
    }

    // ---- tasks ----

    fn bind(&mut self, task: CoreTask, core: Option<CoreId>) -> Result<TaskHandle, Rejection> {
        let now = self.now();
        match self.cores.start_core_task(task, core, now) {
            Ok(handle) => {
                self.stats.increment(stats::TASKS, "active");
                Ok(handle)
            }
            Err(_) => Err(match core {
                Some(id) => Rejection::CoreBusy(id),
                None => Rejection::NoFreeCore,
            }),
        }
    }

    fn report<T>(&mut self, result: Result<T, Rejection>) -> Result<T, Rejection> {
        if let Err(rejection) = &result {
            self.messenger.write(rejection.to_string());
        }
        result
    }

    /// Starts an endless file search on the first free core.
    pub fn start_search(&mut self) -> Result<TaskHandle, Rejection> {
        let task = CoreTask::new(TaskKind::Search, self.config.tasks.search_cost);
        let result = self.bind(task, None);
        self.report(result)
    }

    /// Doubles `core`'s power once the task completes. Runs on that core.
    pub fn start_overclock(&mut self, core: CoreId) -> Result<TaskHandle, Rejection> {
        let result = self.try_overclock(core);
        self.report(result)
    }

    fn try_overclock(&mut self, core: CoreId) -> Result<TaskHandle, Rejection> {
        let power = self.cores.check_overclock(core)?;
        let cost = power * self.config.tasks.overclock_cost_per_power;
        self.bind(CoreTask::new(TaskKind::Overclock, cost), Some(core))
    }

    /// Moves a regular disk's threats into quarantine.
    pub fn scan_disk(&mut self, disk: DiskId) -> Result<TaskHandle, Rejection> {
        let result = self.try_scan(disk);
        self.report(result)
    }

    fn try_scan(&mut self, disk: DiskId) -> Result<TaskHandle, Rejection> {
        let cost = self.disks.scan_cost(disk)?;
        let label = self.disk_label("Scan", disk);
        let handle = self.bind(CoreTask::new(TaskKind::Scan { disk }, cost).with_label(label), None)?;
        self.disks.set_busy(disk, true)?;
        Ok(handle)
    }

    /// Deletes a quarantine disk's files for reliability.
    pub fn purge_disk(&mut self, disk: DiskId) -> Result<TaskHandle, Rejection> {
        let result = self.try_purge(disk);
        self.report(result)
    }

    fn try_purge(&mut self, disk: DiskId) -> Result<TaskHandle, Rejection> {
        let cost = self.disks.purge_cost(disk)?;
        let label = self.disk_label("Purge", disk);
        let handle = self.bind(CoreTask::new(TaskKind::Purge { disk }, cost).with_label(label), None)?;
        self.disks.set_busy(disk, true)?;
        Ok(handle)
    }

    fn disk_label(&self, verb: &str, disk: DiskId) -> String {
        match self.disks.disk(disk) {
            Some(d) => format!("{verb} {}", d.name),
            None => verb.to_string(),
        }
    }

    pub fn crack_channel(&mut self, channel: ChannelId) -> Result<TaskHandle, Rejection> {
        let result = self.try_crack(channel);
        self.report(result)
    }

    fn try_crack(&mut self, channel: ChannelId) -> Result<TaskHandle, Rejection> {
        self.channels.check_crack(channel)?;
        let task = CoreTask::new(TaskKind::Crack { channel }, self.config.tasks.crack_cost);
        let handle = self.bind(task, None)?;
        self.channels.set_busy(channel, true)?;
        Ok(handle)
    }

    /// Siphons until the channel runs dry or the task is cancelled.
    pub fn siphon_channel(&mut self, channel: ChannelId) -> Result<TaskHandle, Rejection> {
        let result = self.try_siphon(channel);
        self.report(result)
    }

    fn try_siphon(&mut self, channel: ChannelId) -> Result<TaskHandle, Rejection> {
        self.channels.check_siphon(channel)?;
        let task = CoreTask::new(TaskKind::Siphon { channel }, self.config.tasks.siphon_cost);
        let handle = self.bind(task, None)?;
        self.channels.set_busy(channel, true)?;
        Ok(handle)
    }

    /// Cancels whatever `core` is running.
    ///
    /// A finite task that has already reached 100% is not cancelled: it
    /// completes on the next update and `Ok(false)` is returned. An
    /// infinite task in the same spot keeps its finished cycle and then
    /// stops.
    pub fn cancel_task(&mut self, core: CoreId) -> Result<bool, Rejection> {
        let now = self.now();
        let handle = match self.cores.handle_on(core) {
            Some(handle) => handle,
            None => return self.report(Err(Rejection::NoTask(core))),
        };
        match self.cores.request_cancel(handle, now) {
            Some(CancelOutcome::Cancelled(task)) => {
                self.on_cancelled(&task);
                self.messenger.write(format!("{} cancelled", task.label));
                Ok(true)
            }
            Some(CancelOutcome::CompletionPending) => {
                let Some(kind) = self
                    .cores
                    .task(handle)
                    .filter(|t| t.is_infinite())
                    .map(|t| t.kind)
                else {
                    return Ok(false);
                };
                match self.apply_completion(handle, kind) {
                    Some(reason) => self.stop_task(handle, reason),
                    None => {
                        if let Some(task) = self.cores.cancel(handle) {
                            self.on_cancelled(&task);
                            self.messenger.write(format!("{} cancelled", task.label));
                        }
                    }
                }
                Ok(true)
            }
            None => self.report(Err(Rejection::NoTask(core))),
        }
    }

    /// Cleanup shared by user cancels and self-cancels.
    fn on_cancelled(&mut self, task: &CoreTask) {
        self.stats.increment(stats::TASKS, "cancelled");
        self.stats.decrement(stats::TASKS, "active");
        match task.kind {
            TaskKind::Scan { disk } | TaskKind::Purge { disk } => {
                let _ = self.disks.abort_work(disk);
            }
            TaskKind::Crack { channel } => {
                let _ = self.channels.set_busy(channel, false);
            }
            TaskKind::Siphon { channel } => self.end_siphon_session(channel),
            TaskKind::Overclock | TaskKind::Search => {}
        }
    }

    fn end_siphon_session(&mut self, channel: ChannelId) {
        let _ = self.channels.set_busy(channel, false);
        let provoked = self
            .detection
            .session_ended(&mut self.channels, channel, &mut self.rng)
            .unwrap_or(false);
        if provoked && self.hack.is_none() {
            log::info!("channel {channel} drew attention");
            self.messenger.write("Siphon traffic was traced back to the network");
            let hack = Hack::random(self.research.threat_level(), &mut self.rng);
            self.spawn_hack(hack);
        }
    }

    fn complete_task(&mut self, due: DueTask, now: Millis) {
        let handle = due.handle;
        if let Some(reason) = self.apply_completion(handle, due.kind) {
            self.stop_task(handle, reason);
            return;
        }

        if let Some(Completion::Released(task)) = self.cores.complete(handle, now) {
            self.stats.increment(stats::TASKS, "completed");
            self.stats.decrement(stats::TASKS, "active");
            log::debug!("{} released core {}", task.label, handle.core);
        }
    }

    /// Applies one finished cycle of the task behind `handle`. Returns the closing words when
    /// the task has to stop instead of carrying on.
    fn apply_completion(&mut self, handle: TaskHandle, kind: TaskKind) -> Option<&'static str> {
        match kind {
            TaskKind::Overclock => {
                if let Some(power) = self.cores.upgrade(handle.core) {
                    self.messenger
                        .write(format!("Core {} overclocked to {power}x", handle.core));
                }
            }
            TaskKind::Search => self.search_cycle(),
            TaskKind::Scan { disk } => {
                if let Ok(report) = self.disks.finish_scan(disk) {
                    self.stats.add(stats::DISKS, "files-scanned", report.scanned as i64);
                    self.stats.add(stats::DISKS, "threats-quarantined", report.quarantined as i64);
                    self.stats.add(stats::DISKS, "threats-dropped", report.dropped as i64);
                    let mut text = format!(
                        "Scan complete: {} files checked, {} threats quarantined",
                        report.scanned, report.quarantined
                    );
                    if report.dropped > 0 {
                        text.push_str(&format!(", {} lost for lack of space", report.dropped));
                    }
                    self.messenger.write(text);
                }
            }
            TaskKind::Purge { disk } => {
                if let Ok(report) = self.disks.finish_purge(disk) {
                    self.research.add_reliability(report.reliability);
                    self.stats.add(stats::DISKS, "files-purged", report.purged as i64);
                    self.messenger.write(format!(
                        "Purge complete: {} files deleted, +{:.2} reliability",
                        report.purged, report.reliability
                    ));
                }
            }
            TaskKind::Crack { channel } => {
                if self.channels.finish_crack(channel).is_ok() {
                    self.stats.increment(stats::CHANNELS, "cracked");
                    if let Some(c) = self.channels.channel(channel) {
                        self.messenger.write(format!("Channel {} cracked", c.name));
                    }
                }
            }
            TaskKind::Siphon { channel } => match self.channels.siphon_cycle(channel) {
                Ok(SiphonOutcome::Continue { .. }) => {
                    self.stats.increment(stats::CHANNELS, "siphoned");
                }
                Ok(SiphonOutcome::Depleted) => {
                    self.stats.increment(stats::CHANNELS, "siphoned");
                    return Some("finished: channel is dry");
                }
                Err(err) => {
                    log::warn!("siphon on channel {channel} stopped: {err}");
                    return Some("stopped: channel is unavailable");
                }
            },
        }
        None
    }

    /// Self-cancel after a cycle ended the task's work.
    fn stop_task(&mut self, handle: TaskHandle, reason: &str) {
        if let Some(task) = self.cores.cancel(handle) {
            self.on_cancelled(&task);
            self.messenger.write(format!("{} {reason}", task.label));
        }
    }

    /// One search cycle: a new file on the first regular disk with room.
    /// When nothing fits the cycle is wasted.
    fn search_cycle(&mut self) {
        let file = generate_file(self.research.threat_level(), &self.config.disks, &mut self.rng);
        if self.disks.add_file_to_disk(file).is_ok() {
            self.stats.increment(stats::DISKS, "files-found");
        }
    }

    // ---- research ----

    /// Buys a displayed option and applies its effect.
    pub fn purchase_research(
        &mut self,
        index: u32,
        choice: Option<usize>,
    ) -> Result<ResearchEffect, Rejection> {
        let result = self.research.purchase(index, choice);
        let effect = self.report(result)?;
        match effect {
            ResearchEffect::AddCore => {
                self.cores.add_core();
            }
            ResearchEffect::CoreSpeeds => self.cores.raise_max_upgrades(1),
            ResearchEffect::AddDisk { quarantine } => {
                self.disks.add_disk(quarantine);
            }
            ResearchEffect::DiskSize => self.disks.multiply_sizes(self.config.disks.size_multiplier),
            ResearchEffect::ThreatLevel => {}
            ResearchEffect::AddChannel => {
                self.channels.add_channel(&mut self.rng);
            }
        }
        self.stats.increment(stats::RESEARCH, "purchased");
        let title = catalog_option(index).map(|o| o.title).unwrap_or("Research");
        self.messenger.write(format!("{title} complete"));
        Ok(effect)
    }

    pub fn increment_research_exponent(&mut self) {
        self.research.increment_exponent();
    }

    // ---- hacks ----

    /// Spawns a hack right away if none is active. Returns whether one was
    /// spawned.
    pub fn trigger_hack(&mut self, kind: Option<HackKind>) -> bool {
        if self.hack.is_some() {
            return false;
        }
        let threat = self.research.threat_level();
        let hack = match kind {
            Some(kind) => Hack::new(kind, threat),
            None => Hack::random(threat, &mut self.rng),
        };
        self.spawn_hack(hack);
        true
    }

    fn spawn_hack(&mut self, hack: Hack) {
        let title = hack.kind().title();
        self.install_hack(hack);
        log::info!("hack spawned: {title}");
        self.messenger.write(format!("Intrusion detected: {title}"));
    }

    /// Puts `hack` on screen without announcing it.
    fn install_hack(&mut self, mut hack: Hack) {
        self.hack_timer.stop();
        if !self.config.hacks.pretext {
            hack.start(&mut self.rng);
        }
        self.hack = Some(hack);
    }

    /// Leaves the pretext screen and starts the countdown.
    pub fn start_hack(&mut self) -> Result<(), Rejection> {
        match self.hack.as_mut() {
            Some(hack) => {
                hack.start(&mut self.rng);
                Ok(())
            }
            None => self.report(Err(Rejection::NoHack)),
        }
    }

    /// Clicks a cell on the active hack's board.
    pub fn hack_click(&mut self, cell: usize) -> Result<ClickOutcome, Rejection> {
        let now = self.now();
        let Some(hack) = self.hack.as_mut() else {
            return self.report(Err(Rejection::NoHack));
        };
        let (outcome, resolution) = hack.click(cell, now);
        if let Some(resolution) = resolution {
            self.resolve_hack(resolution);
        }
        Ok(outcome)
    }

    fn resolve_hack(&mut self, outcome: HackOutcome) {
        let title = self.hack.as_ref().map(|h| h.kind().title()).unwrap_or("Hack");
        match outcome {
            HackOutcome::Success => {
                self.stats.increment(stats::HACKS, "success");
                log::info!("hack repelled: {title}");
                self.messenger.write("Intrusion repelled");
            }
            HackOutcome::Fail => {
                self.stats.increment(stats::HACKS, "fail");
                let threat = self.research.threat_level();
                let count = random_range(&mut self.rng, 1, threat * 10 + 1);
                let lost = self.disks.breakout(count, &mut self.rng);
                self.stats.add(stats::DISKS, "files-escaped", lost as i64);
                log::info!("hack lost: {title}, {lost} files escaped");
                self.messenger
                    .write(format!("Intrusion succeeded: {lost} files escaped quarantine"));
            }
        }
    }

    // ---- verdicts ----

    /// Presents a verdict right away if none is pending.
    pub fn trigger_verdict(&mut self, kind: Option<VerdictKind>) -> bool {
        if self.verdict.is_some() {
            return false;
        }
        let kind = kind.unwrap_or_else(|| Verdict::random(&mut self.rng).kind());
        self.spawn_verdict(kind);
        true
    }

    fn spawn_verdict(&mut self, kind: VerdictKind) {
        self.install_verdict(kind);
        log::info!("verdict presented: {}", kind.title());
        self.messenger.write(kind.title());
    }

    fn install_verdict(&mut self, kind: VerdictKind) {
        self.verdict_timer.stop();
        self.verdict = Some(Verdict::new(kind));
    }

    pub fn choose_verdict(&mut self, option: usize) -> Result<VerdictResolution, Rejection> {
        let result = match self.verdict.as_mut() {
            Some(verdict) => verdict.choose(option, &mut self.rng),
            None => Err(Rejection::NoVerdict),
        };
        let resolution = self.report(result)?;

        let id = if resolution.success { "success" } else { "fail" };
        self.stats.increment(stats::VERDICTS, id);
        match resolution.reward {
            Reward::Reliability(delta) => self.research.add_reliability(delta),
            Reward::AddFiles(count) => {
                for _ in 0..count {
                    let file =
                        generate_file(self.research.threat_level(), &self.config.disks, &mut self.rng);
                    if self.disks.add_file_to_disk(file).is_err() {
                        break;
                    }
                }
            }
            Reward::Nothing => {}
        }
        log::info!("verdict resolved: success={}", resolution.success);
        self.messenger.write(resolution.text);
        Ok(resolution)
    }

    /// Closes a resolved verdict and rearms the verdict timer.
    pub fn dismiss_verdict(&mut self) -> Result<(), Rejection> {
        if !self.verdict.as_ref().is_some_and(Verdict::is_resolved) {
            return self.report(Err(Rejection::NoVerdict));
        }
        self.verdict = None;
        if !self.paused {
            let now = self.now();
            self.verdict_timer.start(now, &mut self.rng);
        }
        Ok(())
    }

    // ---- settings ----

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused == paused {
            return;
        }
        let now = self.now();
        self.paused = paused;
        if paused {
            self.pause_time = Some(now);
            self.verdict_timer.stop();
        } else {
            self.unpause_time = Some(now);
            if self.verdict.is_none() {
                self.verdict_timer.start(now, &mut self.rng);
            }
        }
    }

    pub fn set_main_color(&mut self, color: &str) -> Result<(), Rejection> {
        let result = self.settings.set_main_color(color);
        self.report(result)
    }

    pub fn set_accent_color(&mut self, color: &str) -> Result<(), Rejection> {
        let result = self.settings.set_accent_color(color);
        self.report(result)
    }

    pub fn display_disk(&mut self, disk: DiskId) -> Result<(), Rejection> {
        let result = self.disks.display(disk);
        self.report(result)
    }

    // ---- persistence ----

    /// Writes every manager's sub-tree and flushes it to storage.
    pub fn save(&mut self) -> Result<(), StateError> {
        let data = self.snapshot();
        write_state(&mut self.state, &data)?;
        self.research.store(&mut self.state);
        self.messenger.store(&mut self.state);
        self.state
            .set_value("pause-time", self.pause_time.map(Value::from).unwrap_or(Value::Null));
        self.state.set_value(
            "unpause-time",
            self.unpause_time.map(Value::from).unwrap_or(Value::Null),
        );
        self.state.save()
    }

    /// Wipes storage and starts a new game.
    pub fn reset(&mut self) -> Result<(), StateError> {
        self.state.reset()?;
        check_version(&mut self.state, CURRENT_VERSION);
        self.pause_time = None;
        self.unpause_time = None;
        let now = self.now();
        self.restore(blank_save(&self.config), now);
        Ok(())
    }

    /// Writes a binary snapshot.
    pub fn export<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        write_save(writer, &self.snapshot())
    }

    /// Replaces the game with a binary snapshot.
    pub fn import<R: Read>(&mut self, reader: R) -> Result<(), SaveError> {
        let data = read_save(reader)?;
        let now = self.now();
        self.restore(data, now);
        Ok(())
    }

    pub fn snapshot(&self) -> SaveData {
        let now = self.now();
        let active_hack = self.hack.as_ref().filter(|h| !h.phase().is_terminal());
        let active_verdict = self.verdict.as_ref().filter(|v| !v.is_resolved());
        SaveData {
            version: SAVE_VERSION,
            cores: self.cores.to_records(now),
            max_upgrades: self.cores.max_upgrades(),
            disks: self.disks.to_records(),
            research: self.research.to_record(),
            channels: self.channels.channels().to_vec(),
            stats: self.stats.clone(),
            messages: self.messenger.messages().map(String::from).collect(),
            hack_type: active_hack.map_or(NO_EVENT, |h| h.kind().index() as i32),
            verdict_type: active_verdict.map_or(NO_EVENT, |v| v.kind().index() as i32),
            settings: self.settings.clone(),
            paused: self.paused,
        }
    }

    fn restore(&mut self, data: SaveData, now: Millis) {
        let config = &self.config;
        self.cores = CoreManager::from_records(data.cores, data.max_upgrades, &config.tasks, now);
        self.disks = DiskManager::from_records(data.disks, &config.disks, &mut self.rng);
        self.research = Research::from_record(data.research, &config.research);
        self.channels = if data.channels.is_empty() {
            ChannelManager::new(&config.channels, &mut self.rng)
        } else {
            ChannelManager::from_channels(data.channels, &config.channels)
        };
        self.stats = data.stats;
        self.messenger = Messenger::from_messages(config.message_capacity, data.messages);
        self.settings = data.settings;
        self.paused = data.paused;

        // Busy flags only mean something while a task holds them.
        let mut disks_in_use = Vec::new();
        let mut channels_in_use = Vec::new();
        for core in self.cores.cores() {
            match core.task().map(|t| t.kind) {
                Some(TaskKind::Scan { disk } | TaskKind::Purge { disk }) => disks_in_use.push(disk),
                Some(TaskKind::Crack { channel } | TaskKind::Siphon { channel }) => {
                    channels_in_use.push(channel)
                }
                _ => {}
            }
        }
        self.disks.reconcile_busy(&disks_in_use);
        self.channels.reconcile_busy(&channels_in_use);
        self.stats
            .set(stats::TASKS, "active", self.cores.busy_count() as i64);

        self.second_ticker.reset(now);
        self.minute_ticker.reset(now);

        // An interrupted hack or verdict comes back as a fresh one of the
        // same kind. It was announced when it first appeared.
        self.hack = None;
        self.hack_timer.stop();
        match usize::try_from(data.hack_type).ok().and_then(HackKind::from_index) {
            Some(kind) => {
                let hack = Hack::new(kind, self.research.threat_level());
                self.install_hack(hack);
            }
            None => self.hack_timer.start(now, &mut self.rng),
        }

        self.verdict = None;
        self.verdict_timer.stop();
        match usize::try_from(data.verdict_type).ok().and_then(VerdictKind::from_index) {
            Some(kind) => self.install_verdict(kind),
            None if !self.paused => self.verdict_timer.start(now, &mut self.rng),
            None => {}
        }
    }
}

/// Snapshot of a brand-new game; empty collections mean "use defaults".
fn blank_save(config: &OverseerConfig) -> SaveData {
    SaveData {
        version: SAVE_VERSION,
        cores: Vec::new(),
        max_upgrades: config.tasks.max_upgrades,
        disks: DiskRecords {
            disks: Vec::new(),
            name_pool: DiskNamePool::default(),
            size_multiplier: 1,
        },
        research: Research::new(&config.research).to_record(),
        channels: Vec::new(),
        stats: Stats::new(),
        messages: Vec::new(),
        hack_type: NO_EVENT,
        verdict_type: NO_EVENT,
        settings: Settings::default(),
        paused: false,
    }
}

/// Reads the key-path tree; any missing or malformed key falls back to
/// its default.
fn read_state(state: &PersistentState, config: &OverseerConfig) -> SaveData {
    SaveData {
        version: SAVE_VERSION,
        cores: state.get("cores.count").unwrap_or_default(),
        max_upgrades: state
            .get("cores.max-upgrades")
            .unwrap_or(config.tasks.max_upgrades),
        disks: DiskRecords {
            disks: state.get("disks.list").unwrap_or_default(),
            name_pool: state.get("disks.name-pool").unwrap_or_default(),
            size_multiplier: state.get("disks.size-multiplier").unwrap_or(1),
        },
        research: Research::load(state, &config.research).to_record(),
        channels: state.get("channels").unwrap_or_default(),
        stats: Stats::load(state),
        messages: Messenger::load(state, config.message_capacity)
            .messages()
            .map(String::from)
            .collect(),
        hack_type: state.get("hack-type").unwrap_or(NO_EVENT),
        verdict_type: state.get("verdict-type").unwrap_or(NO_EVENT),
        settings: Settings::load(state),
        paused: state.get("paused").unwrap_or(false),
    }
}

/// Writes the snapshot's key paths. Research and messages are stored by
/// their managers in `save`.
fn write_state(state: &mut PersistentState, data: &SaveData) -> Result<(), StateError> {
    state.set("cores.count", &data.cores)?;
    state.set("cores.max-upgrades", &data.max_upgrades)?;
    state.set("disks.list", &data.disks.disks)?;
    state.set("disks.name-pool", &data.disks.name_pool)?;
    state.set("disks.size-multiplier", &data.disks.size_multiplier)?;
    state.set("channels", &data.channels)?;
    state.set("hack-type", &data.hack_type)?;
    state.set("verdict-type", &data.verdict_type)?;
    state.set("paused", &data.paused)?;
    data.stats.store(state);
    data.settings.store(state);
    Ok(())
}
