//! Integration tests for the engine driven on a manual clock.
//!
//! Exercises: player action → CoreManager binding → update() completion
//! dispatch → manager side effects → stats/messages → save and restore
//!
//! Game state is shaped through the public snapshot/import path, the same
//! way a saved game comes back.

use overseer_core::engine::Overseer;
use overseer_core::persistence::{write_save, SaveData, SaveError, SAVE_VERSION};
use overseer_core::prelude::*;
use overseer_core::stats;
use overseer_core::systems::{CoreRecord, HackPhase, ResearchEffect, TaskRecord, VerdictKind};
use overseer_core::version::VersionStatus;
use overseer_logic::puzzles::{Board, Puzzle};

// ── Helpers ────────────────────────────────────────────────────────────

fn config() -> OverseerConfig {
    OverseerConfig {
        seed: Some(1234),
        ..OverseerConfig::default()
    }
}

fn game() -> (Overseer, ManualClock) {
    let clock = ManualClock::new(10_000);
    (Overseer::in_memory(config(), Box::new(clock.clone())), clock)
}

/// Advances in 100 ms frames.
fn run_for(game: &mut Overseer, clock: &ManualClock, ms: Millis) {
    let mut elapsed = 0;
    while elapsed < ms {
        let step = 100.min(ms - elapsed);
        clock.advance(step);
        game.update();
        elapsed += step;
    }
}

/// Rewrites the game through an edited snapshot.
fn reshape(game: &mut Overseer, edit: impl FnOnce(&mut SaveData)) {
    let mut data = game.snapshot();
    edit(&mut data);
    let mut buffer = Vec::new();
    write_save(&mut buffer, &data).unwrap();
    game.import(&buffer[..]).unwrap();
}

fn file(name: &str, size: u64, is_threat: bool) -> DiskFile {
    DiskFile::new(name, "bin", size, is_threat, 1)
}

fn regular(data: &mut SaveData) -> &mut Disk {
    data.disks.disks.iter_mut().find(|d| !d.is_quarantine).unwrap()
}

fn quarantine(data: &mut SaveData) -> &mut Disk {
    data.disks.disks.iter_mut().find(|d| d.is_quarantine).unwrap()
}

// ── Scheduler ──────────────────────────────────────────────────────────

#[test]
fn overclock_completes_after_cost_times_k_over_power() {
    let (mut game, clock) = game();
    game.start_overclock(CoreId(0)).unwrap();

    run_for(&mut game, &clock, 1900);
    assert!(game.cores().core(CoreId(0)).unwrap().is_busy());
    assert_eq!(game.task_progress(CoreId(0)), Some(95.0));

    run_for(&mut game, &clock, 100);
    let core = game.cores().core(CoreId(0)).unwrap();
    assert_eq!(core.power(), 2.0);
    assert_eq!(core.upgrades(), 1);
    assert!(!core.is_busy());

    // Twice the power, twice the cost: still 2 s
    game.start_overclock(CoreId(0)).unwrap();
    run_for(&mut game, &clock, 2000);
    assert_eq!(game.cores().core(CoreId(0)).unwrap().power(), 4.0);
    assert_eq!(game.stats().get(stats::TASKS, "completed"), 2);
}

#[test]
fn overclock_ceiling_is_enforced() {
    let (mut game, clock) = game();
    for _ in 0..3 {
        game.start_overclock(CoreId(0)).unwrap();
        run_for(&mut game, &clock, 2000);
    }
    assert_eq!(
        game.start_overclock(CoreId(0)),
        Err(Rejection::UpgradeCeiling(CoreId(0)))
    );
    assert_eq!(
        game.messenger().latest(),
        Some("Core #0 cannot be overclocked any further")
    );
}

#[test]
fn infinite_search_fires_once_per_cycle() {
    let (mut game, clock) = game();
    let handle = game.start_search().unwrap();

    // cost 5000 at power 1: one file every 10 s
    run_for(&mut game, &clock, 10 * 10_000);
    assert_eq!(game.stats().get(stats::DISKS, "files-found"), 10);
    assert_eq!(game.cores().handle_on(CoreId(0)), Some(handle));
    assert_eq!(game.stats().get(stats::TASKS, "completed"), 0);
    assert_eq!(game.stats().get(stats::TASKS, "active"), 1);

    let files = game.disks().disk(DiskId(0)).unwrap().files().len();
    assert_eq!(files, 10);
}

#[test]
fn cancel_in_completion_tick_lets_completion_win() {
    let (mut game, clock) = game();
    game.start_overclock(CoreId(0)).unwrap();
    clock.advance(2000);
    assert_eq!(game.cancel_task(CoreId(0)), Ok(false));
    game.update();
    assert_eq!(game.cores().core(CoreId(0)).unwrap().power(), 2.0);
    assert_eq!(game.stats().get(stats::TASKS, "cancelled"), 0);
}

#[test]
fn cancel_in_completion_tick_stops_infinite_task() {
    let (mut game, clock) = game();
    game.start_search().unwrap();
    // Search cost 5000 at power 1 finishes a cycle after 10 s
    clock.advance(10_050);
    assert_eq!(game.cancel_task(CoreId(0)), Ok(true));
    assert!(!game.cores().core(CoreId(0)).unwrap().is_busy());
    assert_eq!(game.stats().get(stats::DISKS, "files-found"), 1);
    assert_eq!(game.stats().get(stats::TASKS, "cancelled"), 1);
    assert!(game.messenger().latest().unwrap().ends_with("cancelled"));

    game.update();
    clock.advance(10_000);
    game.update();
    assert!(!game.cores().core(CoreId(0)).unwrap().is_busy());
    assert_eq!(game.stats().get(stats::DISKS, "files-found"), 1);
}

#[test]
fn siphon_on_missing_channel_stops() {
    let (mut game, clock) = game();
    reshape(&mut game, |data| {
        data.cores = vec![CoreRecord {
            id: CoreId(0),
            power: 1.0,
            upgrades: 0,
            task: Some(TaskRecord {
                kind: TaskKind::Siphon { channel: ChannelId(99) },
                label: "Siphon ghost".into(),
                cost: 2500.0,
                infinite: true,
                elapsed: 0,
            }),
        }];
    });
    run_for(&mut game, &clock, 5000);
    assert!(!game.cores().core(CoreId(0)).unwrap().is_busy());
    assert_eq!(game.stats().get(stats::CHANNELS, "siphoned"), 0);
    assert_eq!(
        game.messenger().latest(),
        Some("Siphon ghost stopped: channel is unavailable")
    );
}

#[test]
fn second_task_needs_a_second_core() {
    let (mut game, _) = game();
    game.start_search().unwrap();
    assert_eq!(game.start_search(), Err(Rejection::NoFreeCore));

    reshape(&mut game, |data| data.research.reliability = 100.0);
    assert_eq!(game.purchase_research(1, None), Ok(ResearchEffect::AddCore));
    assert_eq!(game.cores().cores().len(), 2);
    let handle = game.start_search().unwrap();
    assert_eq!(handle.core, CoreId(1));
}

// ── Disks ──────────────────────────────────────────────────────────────

#[test]
fn disk_capacity_is_never_exceeded() {
    let mut disk = Disk::new(DiskId(0), "/sys/root/tmp", 100, false);
    disk.add_file(file("big", 80, false)).unwrap();
    assert!(disk.add_file(file("too_big", 30, false)).is_err());
    disk.add_file(file("fits", 20, false)).unwrap();
    assert_eq!(disk.usage(), 100);
}

#[test]
fn scan_quarantines_or_drops_every_threat() {
    let (mut game, clock) = game();
    reshape(&mut game, |data| {
        let disk = regular(data);
        for i in 0..5 {
            disk.add_file(file(&format!("worm_{i}"), 30, true)).unwrap();
        }
        disk.add_file(file("notes", 20, false)).unwrap();
    });

    game.scan_disk(DiskId(0)).unwrap();
    assert_eq!(game.scan_disk(DiskId(0)), Err(Rejection::DiskBusy(DiskId(0))));

    // cost = usage = 170: done in 340 ms at power 1
    run_for(&mut game, &clock, 400);

    let quarantined: usize = game
        .disks()
        .disks()
        .iter()
        .filter(|d| d.is_quarantine)
        .map(|d| d.files().len())
        .sum();
    assert_eq!(quarantined, 3);
    assert_eq!(game.stats().get(stats::DISKS, "threats-quarantined"), 3);
    assert_eq!(game.stats().get(stats::DISKS, "threats-dropped"), 2);
    assert_eq!(game.stats().get(stats::DISKS, "files-scanned"), 6);

    let scanned = game.disks().disk(DiskId(0)).unwrap();
    assert!(scanned.is_empty());
    assert!(!scanned.is_busy());
}

#[test]
fn purge_pays_size_over_one_hundred() {
    let (mut game, clock) = game();
    reshape(&mut game, |data| {
        let vault = quarantine(data);
        vault.add_file(file("a", 30, true)).unwrap();
        vault.add_file(file("b", 45, true)).unwrap();
    });

    game.purge_disk(DiskId(1)).unwrap();
    run_for(&mut game, &clock, 200);

    assert!((game.research().reliability() - 0.75).abs() < 1e-9);
    assert!(game.disks().disk(DiskId(1)).unwrap().is_empty());
    assert_eq!(game.stats().get(stats::DISKS, "files-purged"), 2);
}

#[test]
fn scan_and_purge_refuse_the_wrong_disk_kind() {
    let (mut game, _) = game();
    reshape(&mut game, |data| {
        regular(data).add_file(file("a", 10, false)).unwrap();
        quarantine(data).add_file(file("b", 10, true)).unwrap();
    });
    assert_eq!(game.scan_disk(DiskId(1)), Err(Rejection::QuarantineDisk(DiskId(1))));
    assert_eq!(game.purge_disk(DiskId(0)), Err(Rejection::NotQuarantine(DiskId(0))));
    assert_eq!(game.scan_disk(DiskId(9)), Err(Rejection::UnknownDisk(DiskId(9))));
}

#[test]
fn cancelled_scan_leaves_files_in_place() {
    let (mut game, clock) = game();
    reshape(&mut game, |data| {
        regular(data).add_file(file("worm", 200, true)).unwrap();
    });
    game.scan_disk(DiskId(0)).unwrap();
    run_for(&mut game, &clock, 200);
    assert_eq!(game.task_progress(CoreId(0)), Some(50.0));
    assert_eq!(game.cancel_task(CoreId(0)), Ok(true));

    let disk = game.disks().disk(DiskId(0)).unwrap();
    assert_eq!(disk.files().len(), 1);
    assert!(!disk.is_busy());
    assert_eq!(game.stats().get(stats::TASKS, "cancelled"), 1);
    assert_eq!(game.stats().get(stats::TASKS, "active"), 0);
}

// ── Channels ───────────────────────────────────────────────────────────

#[test]
fn siphon_self_cancels_when_channel_runs_dry() {
    let (mut game, clock) = game();
    reshape(&mut game, |data| {
        let mut channel = Channel::new(ChannelId(0), "0a:1b:2c:3d:4e:5f", 0, 3);
        channel.is_cracked = true;
        data.channels = vec![channel];
    });

    game.siphon_channel(ChannelId(0)).unwrap();
    assert!(game.channels().channel(ChannelId(0)).unwrap().is_busy);

    // cost 2500 at power 1: one unit every 5 s
    for expected in [2, 1] {
        run_for(&mut game, &clock, 5000);
        let channel = game.channels().channel(ChannelId(0)).unwrap();
        assert_eq!(channel.remaining, expected);
        assert!(channel.is_busy);
    }
    run_for(&mut game, &clock, 5000);

    let channel = game.channels().channel(ChannelId(0)).unwrap();
    assert_eq!(channel.remaining, 0);
    assert!(!channel.is_busy);
    assert!(!game.cores().core(CoreId(0)).unwrap().is_busy());
    assert_eq!(game.stats().get(stats::CHANNELS, "siphoned"), 3);
    assert_eq!(game.stats().get(stats::TASKS, "cancelled"), 1);
    assert_eq!(
        game.siphon_channel(ChannelId(0)),
        Err(Rejection::ChannelDepleted(ChannelId(0)))
    );
}

#[test]
fn crack_opens_channel_for_siphoning() {
    let (mut game, clock) = game();
    let id = ChannelId(0);
    assert_eq!(game.siphon_channel(id), Err(Rejection::ChannelLocked(id)));
    game.crack_channel(id).unwrap();
    run_for(&mut game, &clock, 30_000);
    assert!(game.channels().channel(id).unwrap().is_cracked);
    assert_eq!(game.crack_channel(id), Err(Rejection::ChannelCracked(id)));
    assert_eq!(game.stats().get(stats::CHANNELS, "cracked"), 1);
}

// ── Hacks ──────────────────────────────────────────────────────────────

#[test]
fn lost_hack_breaks_files_out_of_quarantine() {
    let (mut game, clock) = game();
    reshape(&mut game, |data| {
        let vault = quarantine(data);
        for i in 0..5 {
            vault.add_file(file(&format!("worm_{i}"), 10, true)).unwrap();
        }
    });

    assert!(game.trigger_hack(Some(HackKind::Cryptogram)));
    assert!(!game.trigger_hack(None));
    assert!(!game.hack_timer().is_running());
    assert_eq!(game.hack().unwrap().phase(), HackPhase::Pretext);

    game.start_hack().unwrap();
    let limit = game.hack().unwrap().time_left();
    run_for(&mut game, &clock, limit as Millis * SECOND);

    let hack = game.hack().unwrap();
    assert_eq!(hack.phase(), HackPhase::Fail);
    assert!(hack.is_locked());
    assert_eq!(game.stats().get(stats::HACKS, "fail"), 1);

    let escaped = game.stats().get(stats::DISKS, "files-escaped");
    let left = game.disks().disk(DiskId(1)).unwrap().files().len() as i64;
    assert!((1..=5).contains(&escaped));
    assert_eq!(left + escaped, 5);

    // Locked: clicks change nothing
    assert_eq!(game.hack_click(0), Ok(ClickOutcome::Ignored));

    let teardown = game.config().hacks.teardown_delay_ms;
    run_for(&mut game, &clock, teardown + SECOND);
    assert!(game.hack().is_none());
    assert!(game.hack_timer().is_running());
    assert_eq!(game.hack_click(0), Err(Rejection::NoHack));
}

#[test]
fn solved_hack_counts_success() {
    let (mut game, _) = game();
    game.trigger_hack(Some(HackKind::OrderedNumbers));
    game.start_hack().unwrap();

    let cells: Vec<usize> = match game.hack().unwrap().board() {
        Some(Board::OrderedNumbers(board)) => (1..=board.cell_count() as u32)
            .map(|value| board.cell_of(value).unwrap())
            .collect(),
        other => panic!("unexpected board {other:?}"),
    };
    for cell in &cells[..cells.len() - 1] {
        assert_eq!(game.hack_click(*cell), Ok(ClickOutcome::Progress));
    }
    assert_eq!(game.hack_click(cells[cells.len() - 1]), Ok(ClickOutcome::Solved));

    assert_eq!(game.hack().unwrap().phase(), HackPhase::Success);
    assert_eq!(game.stats().get(stats::HACKS, "success"), 1);
    assert_eq!(game.messenger().latest(), Some("Intrusion repelled"));
}

#[test]
fn hack_waits_for_quarantined_files() {
    let (mut game, clock) = game();
    run_for(&mut game, &clock, 15 * MINUTE);
    assert!(game.hack().is_none());

    reshape(&mut game, |data| {
        quarantine(data).add_file(file("worm", 10, true)).unwrap();
    });
    run_for(&mut game, &clock, 10 * MINUTE);
    assert!(game.hack().is_some());
}

// ── Verdicts ───────────────────────────────────────────────────────────

#[test]
fn verdict_resolves_once_and_rearms() {
    let (mut game, _) = game();
    assert!(game.trigger_verdict(Some(VerdictKind::DataBroker)));
    assert!(!game.verdict_timer().is_running());
    assert_eq!(game.dismiss_verdict(), Err(Rejection::NoVerdict));
    assert_eq!(game.choose_verdict(5), Err(Rejection::InvalidChoice(5)));

    let resolution = game.choose_verdict(1).unwrap();
    assert!(resolution.success);
    assert_eq!(game.stats().get(stats::VERDICTS, "success"), 1);
    assert_eq!(game.choose_verdict(0), Err(Rejection::NoVerdict));

    game.dismiss_verdict().unwrap();
    assert!(game.verdict().is_none());
    assert!(game.verdict_timer().is_running());
}

#[test]
fn verdict_penalty_never_drives_reliability_negative() {
    let (mut game, _) = game();
    for _ in 0..20 {
        game.trigger_verdict(Some(VerdictKind::DataBroker));
        game.choose_verdict(0).unwrap();
        assert!(game.research().reliability() >= 0.0);
        game.dismiss_verdict().unwrap();
    }
    let total = game.stats().get(stats::VERDICTS, "success")
        + game.stats().get(stats::VERDICTS, "fail");
    assert_eq!(total, 20);
}

#[test]
fn pause_holds_back_verdicts() {
    let (mut game, clock) = game();
    game.set_paused(true);
    assert!(!game.verdict_timer().is_running());
    run_for(&mut game, &clock, 60 * MINUTE);
    assert!(game.verdict().is_none());

    game.set_paused(false);
    assert!(game.unpause_time() > game.pause_time());
    run_for(&mut game, &clock, 15 * MINUTE);
    assert!(game.verdict().is_some());
}

// ── Persistence ────────────────────────────────────────────────────────

#[test]
fn save_and_reload_through_storage() {
    let clock = ManualClock::new(0);
    let storage = MemoryStorage::new();

    let mut game = Overseer::new(config(), Box::new(clock.clone()), Box::new(storage.clone())).unwrap();
    assert_eq!(game.version_status(), &VersionStatus::FirstRun);
    game.start_overclock(CoreId(0)).unwrap();
    run_for(&mut game, &clock, 2000);
    game.start_overclock(CoreId(0)).unwrap();
    run_for(&mut game, &clock, 1000);
    game.set_main_color("#FF8800").unwrap();
    game.set_paused(true);
    game.save().unwrap();

    let raw = storage.contents().unwrap();
    assert!(raw.contains("max-upgrades"));
    assert!(raw.contains("#ff8800"));

    let mut reloaded = Overseer::new(config(), Box::new(clock.clone()), Box::new(storage)).unwrap();
    assert_eq!(reloaded.version_status(), &VersionStatus::Current);
    assert_eq!(reloaded.cores().core(CoreId(0)).unwrap().power(), 2.0);
    assert_eq!(reloaded.settings().main_color(), "#ff8800");
    assert!(reloaded.is_paused());
    assert_eq!(reloaded.pause_time(), Some(3000));

    // The half-done overclock resumes where it stopped
    assert_eq!(reloaded.task_progress(CoreId(0)), Some(50.0));
    run_for(&mut reloaded, &clock, 1000);
    assert_eq!(reloaded.cores().core(CoreId(0)).unwrap().power(), 4.0);
}

#[test]
fn unresolved_hack_returns_after_reload() {
    let clock = ManualClock::new(0);
    let storage = MemoryStorage::new();
    let mut game = Overseer::new(config(), Box::new(clock.clone()), Box::new(storage.clone())).unwrap();
    game.trigger_hack(Some(HackKind::HexMatcher));
    game.start_hack().unwrap();
    game.save().unwrap();

    let reloaded = Overseer::new(config(), Box::new(clock), Box::new(storage)).unwrap();
    let announcements = reloaded
        .messenger()
        .messages()
        .filter(|m| m.starts_with("Intrusion detected"))
        .count();
    assert_eq!(announcements, 1);
    let hack = reloaded.hack().unwrap();
    assert_eq!(hack.kind(), HackKind::HexMatcher);
    assert_eq!(hack.phase(), HackPhase::Pretext);
    assert!(!reloaded.hack_timer().is_running());
}

#[test]
fn corrupt_storage_starts_fresh() {
    let clock = ManualClock::new(0);
    let storage = MemoryStorage::with_data("{ not json");
    let game = Overseer::new(config(), Box::new(clock), Box::new(storage)).unwrap();
    assert_eq!(game.cores().cores().len(), 1);
    assert_eq!(game.disks().disks().len(), 2);
    assert_eq!(game.research().reliability(), 0.0);
}

#[test]
fn export_import_roundtrip() {
    let (mut game, clock) = game();
    game.start_search().unwrap();
    run_for(&mut game, &clock, 35_000);

    let mut buffer = Vec::new();
    game.export(&mut buffer).unwrap();

    let mut other = Overseer::in_memory(config(), Box::new(clock.clone()));
    other.import(&buffer[..]).unwrap();
    assert_eq!(other.snapshot(), game.snapshot());
    assert_eq!(other.stats().get(stats::TASKS, "active"), 1);
}

#[test]
fn import_keeps_focus_and_pending_events() {
    let (mut game, clock) = game();
    game.display_disk(DiskId(1)).unwrap();
    game.trigger_hack(Some(HackKind::Cryptogram));
    game.trigger_verdict(None);

    let mut buffer = Vec::new();
    game.export(&mut buffer).unwrap();
    let mut other = Overseer::in_memory(config(), Box::new(clock.clone()));
    other.import(&buffer[..]).unwrap();

    assert_eq!(other.snapshot(), game.snapshot());
    assert!(other.disks().disk(DiskId(1)).unwrap().displayed);
    assert_eq!(other.messenger().len(), game.messenger().len());
    assert_eq!(other.hack().unwrap().kind(), HackKind::Cryptogram);
    assert!(other.verdict().is_some());
}

#[test]
fn import_rejects_other_save_versions() {
    let (mut game, _) = game();
    let mut data = game.snapshot();
    data.version = SAVE_VERSION + 1;
    let mut buffer = Vec::new();
    write_save(&mut buffer, &data).unwrap();
    assert!(matches!(
        game.import(&buffer[..]),
        Err(SaveError::VersionMismatch { .. })
    ));
}

#[test]
fn reset_starts_a_new_game() {
    let clock = ManualClock::new(0);
    let storage = MemoryStorage::new();
    let mut game = Overseer::new(config(), Box::new(clock.clone()), Box::new(storage)).unwrap();
    game.start_overclock(CoreId(0)).unwrap();
    run_for(&mut game, &clock, 2000);
    game.save().unwrap();

    game.reset().unwrap();
    assert_eq!(game.cores().core(CoreId(0)).unwrap().power(), 1.0);
    assert_eq!(game.stats().get(stats::TASKS, "completed"), 0);
    assert!(game.messenger().is_empty());
}
