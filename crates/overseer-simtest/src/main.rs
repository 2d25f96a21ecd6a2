//! Overseer Headless Simulation Harness
//!
//! Drives the engine on a manual clock through a full play loop: search,
//! scan, purge, research, channels, hacks, verdicts and save/restore.
//! Runs entirely in-process with no storage or rendering.
//!
//! Usage:
//!   cargo run -p overseer-simtest
//!   cargo run -p overseer-simtest -- --verbose

use overseer_core::engine::Overseer;
use overseer_core::prelude::*;
use overseer_core::stats;
use overseer_core::systems::{catalog_option, HackPhase, ResearchShape};
use overseer_logic::puzzles::Board;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Simulated frame length.
const STEP: Millis = 100;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(results: &mut Vec<TestResult>, name: &str, passed: bool, detail: String) {
    results.push(TestResult {
        name: name.into(),
        passed,
        detail,
    });
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    let filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    println!("=== Overseer Simulation Harness ===\n");

    let clock = ManualClock::new(0);
    let config = OverseerConfig {
        seed: Some(7),
        ..OverseerConfig::default()
    };
    let mut game = Overseer::in_memory(config, Box::new(clock.clone()));

    let mut results = Vec::new();

    // 1. Core scheduling
    results.extend(validate_cores(&mut game, &clock));

    // 2. Search, scan and purge
    results.extend(validate_disk_pipeline(&mut game, &clock));

    // 3. Research purchases
    results.extend(validate_research(&mut game));

    // 4. Channel crack and siphon
    results.extend(validate_channels(&mut game, &clock));

    // 5. Hack countdown and teardown
    results.extend(validate_hacks(&mut game, &clock));

    // 6. Verdict resolution
    results.extend(validate_verdicts(&mut game));

    // 7. Puzzle boards
    results.extend(validate_boards(verbose));

    // 8. Save and restore
    results.extend(validate_persistence(&mut game, &clock));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

/// Advances the clock in frame-sized steps, updating after each.
fn run_for(game: &mut Overseer, clock: &ManualClock, ms: Millis) {
    let mut elapsed = 0;
    while elapsed < ms {
        let step = STEP.min(ms - elapsed);
        clock.advance(step);
        game.update();
        elapsed += step;
    }
}

// ── 1. Cores ────────────────────────────────────────────────────────────

fn validate_cores(game: &mut Overseer, clock: &ManualClock) -> Vec<TestResult> {
    println!("--- Cores ---");
    let mut results = Vec::new();
    let core = CoreId(0);

    let started = game.start_overclock(core).is_ok();
    check(&mut results, "overclock_binds", started, "overclock on core #0".into());

    run_for(game, clock, 1900);
    let half = game.task_progress(core).unwrap_or(0.0);
    check(
        &mut results,
        "overclock_progress",
        (90.0..100.0).contains(&half),
        format!("{:.1}% after 1.9s", half),
    );

    run_for(game, clock, 100);
    let power = game.cores().core(core).map(|c| c.power()).unwrap_or(0.0);
    check(
        &mut results,
        "overclock_doubles_power",
        power == 2.0,
        format!("power {} after 2s", power),
    );

    let released = game.cores().core(core).is_some_and(|c| !c.is_busy());
    check(&mut results, "overclock_releases_core", released, "core idle again".into());

    let _ = game.start_search();
    let second = game.start_search();
    check(
        &mut results,
        "single_core_rejects_second_task",
        second == Err(Rejection::NoFreeCore),
        format!("{:?}", second),
    );

    results
}

// ── 2. Disks ────────────────────────────────────────────────────────────

fn validate_disk_pipeline(game: &mut Overseer, clock: &ManualClock) -> Vec<TestResult> {
    println!("--- Disk Pipeline ---");
    let mut results = Vec::new();
    let regular = DiskId(0);

    // Search at power 2 finds a file every 5s
    run_for(game, clock, 3 * MINUTE);
    let found = game.stats().get(stats::DISKS, "files-found");
    let on_disk = game.disks().disk(regular).map(|d| d.files().len()).unwrap_or(0);
    check(
        &mut results,
        "search_finds_files",
        found > 0 && on_disk as i64 == found,
        format!("{} files found, {} on disk", found, on_disk),
    );

    let usage_ok = game.disks().disks().iter().all(|d| d.usage() <= d.max_storage);
    check(&mut results, "disks_never_overfill", usage_ok, "usage <= capacity".into());

    let _ = game.cancel_task(CoreId(0));
    let threats = game
        .disks()
        .disk(regular)
        .map(|d| d.files().iter().filter(|f| f.is_threat).count())
        .unwrap_or(0);
    let scan = game.scan_disk(regular);
    check(&mut results, "scan_starts", scan.is_ok(), format!("{:?}", scan));

    run_for(game, clock, 5 * MINUTE);
    let scanned = game.stats().get(stats::DISKS, "files-scanned");
    let quarantined = game.stats().get(stats::DISKS, "threats-quarantined");
    let dropped = game.stats().get(stats::DISKS, "threats-dropped");
    check(
        &mut results,
        "scan_conserves_threats",
        scanned as usize == on_disk && (quarantined + dropped) as usize == threats,
        format!(
            "{} scanned, {} threats: {} quarantined, {} dropped",
            scanned, threats, quarantined, dropped
        ),
    );

    let emptied = game.disks().disk(regular).is_some_and(|d| d.is_empty() && !d.is_busy());
    check(&mut results, "scan_clears_disk", emptied, "regular disk empty and idle".into());

    let quarantine = DiskId(1);
    let expected: u64 = game
        .disks()
        .disk(quarantine)
        .map(|d| d.files().iter().map(|f| f.size).sum())
        .unwrap_or(0);
    let before = game.research().reliability();
    if expected > 0 {
        let _ = game.purge_disk(quarantine);
        run_for(game, clock, 5 * MINUTE);
    }
    let gained = game.research().reliability() - before;
    check(
        &mut results,
        "purge_pays_reliability",
        (gained - expected as f64 / 100.0).abs() < 1e-9,
        format!("+{:.2} reliability for {} KB", gained, expected),
    );

    results
}

// ── 3. Research ─────────────────────────────────────────────────────────

fn validate_research(game: &mut Overseer) -> Vec<TestResult> {
    println!("--- Research ---");
    let mut results = Vec::new();

    let displayed = game.research().displayed().to_vec();
    check(
        &mut results,
        "research_offers_capped",
        displayed.len() <= game.config().research.max_displayed,
        format!("{} options displayed", displayed.len()),
    );

    match displayed.iter().find(|o| o.enabled) {
        Some(option) => {
            let choice = catalog_option(option.index).and_then(|o| match o.shape {
                ResearchShape::Singular(_) => None,
                ResearchShape::Choice(_) => Some(0),
            });
            let before = game.research().reliability();
            let bought = game.purchase_research(option.index, choice);
            let spent = before - game.research().reliability();
            check(
                &mut results,
                "research_purchase",
                bought.is_ok() && (spent - option.cost).abs() < 1e-9,
                format!("{:?} for {:.2}", bought, spent),
            );
            let again = game.purchase_research(option.index, choice);
            check(
                &mut results,
                "research_not_repeatable",
                again.is_err(),
                format!("{:?}", again),
            );
        }
        None => {
            let cheapest = displayed.first().map(|o| o.index).unwrap_or(0);
            let refused = game.purchase_research(cheapest, None);
            check(
                &mut results,
                "research_unaffordable_refused",
                refused.is_err(),
                format!("{:?}", refused),
            );
        }
    }

    results
}

// ── 4. Channels ─────────────────────────────────────────────────────────

fn validate_channels(game: &mut Overseer, clock: &ManualClock) -> Vec<TestResult> {
    println!("--- Channels ---");
    let mut results = Vec::new();
    let channel = ChannelId(0);

    let locked = game.siphon_channel(channel);
    check(
        &mut results,
        "siphon_needs_crack",
        locked == Err(Rejection::ChannelLocked(channel)),
        format!("{:?}", locked),
    );

    let _ = game.crack_channel(channel);
    run_for(game, clock, MINUTE);
    let cracked = game.channels().channel(channel).is_some_and(|c| c.is_cracked);
    check(&mut results, "crack_completes", cracked, "channel cracked".into());

    let data = game.channels().channel(channel).map(|c| c.remaining).unwrap_or(0);
    let _ = game.siphon_channel(channel);
    run_for(game, clock, 10 * MINUTE);
    let remaining = game.channels().channel(channel).map(|c| c.remaining).unwrap_or(u32::MAX);
    let siphoned = game.stats().get(stats::CHANNELS, "siphoned");
    check(
        &mut results,
        "siphon_drains_channel",
        remaining == 0 && siphoned == data as i64,
        format!("{} of {} units siphoned", siphoned, data),
    );

    let idle = game.cores().busy_count() == 0;
    check(&mut results, "siphon_self_cancels", idle, "core released".into());

    results
}

// ── 5. Hacks ────────────────────────────────────────────────────────────

fn validate_hacks(game: &mut Overseer, clock: &ManualClock) -> Vec<TestResult> {
    println!("--- Hacks ---");
    let mut results = Vec::new();

    // One may already be in flight from the channel phase; let it play out
    if game.hack().is_some() {
        let _ = game.start_hack();
        run_for(game, clock, 2 * MINUTE);
    }

    let fails_before = game.stats().get(stats::HACKS, "fail");
    let spawned = game.trigger_hack(Some(HackKind::Cryptogram));
    check(&mut results, "hack_spawns", spawned, "cryptogram triggered".into());

    let _ = game.start_hack();
    let limit = game.hack().map(|h| h.time_left()).unwrap_or(0);
    run_for(game, clock, limit as Millis * SECOND);
    let failed = game.hack().is_some_and(|h| h.phase() == HackPhase::Fail && h.is_locked());
    check(
        &mut results,
        "hack_times_out",
        failed && game.stats().get(stats::HACKS, "fail") == fails_before + 1,
        format!("failed after {}s", limit),
    );

    let ignored = game.hack_click(0);
    check(
        &mut results,
        "hack_locked_after_fail",
        ignored == Ok(ClickOutcome::Ignored),
        format!("{:?}", ignored),
    );

    run_for(game, clock, game.config().hacks.teardown_delay_ms + SECOND);
    check(
        &mut results,
        "hack_torn_down",
        game.hack().is_none() && game.hack_timer().is_running(),
        "hack cleared, timer rearmed".into(),
    );

    results
}

// ── 6. Verdicts ─────────────────────────────────────────────────────────

fn validate_verdicts(game: &mut Overseer) -> Vec<TestResult> {
    println!("--- Verdicts ---");
    let mut results = Vec::new();

    game.trigger_verdict(None);
    let options = game.verdict().map(|v| v.kind().options().len()).unwrap_or(0);
    check(&mut results, "verdict_presented", options > 0, format!("{} options", options));

    let resolved = game.choose_verdict(options.saturating_sub(1));
    check(&mut results, "verdict_resolves", resolved.is_ok(), format!("{:?}", resolved));

    let twice = game.choose_verdict(0);
    check(
        &mut results,
        "verdict_resolves_once",
        twice == Err(Rejection::NoVerdict),
        format!("{:?}", twice),
    );

    let dismissed = game.dismiss_verdict().is_ok();
    check(
        &mut results,
        "verdict_dismissed",
        dismissed && game.verdict().is_none(),
        "timer rearmed".into(),
    );

    results
}

// ── 7. Boards ───────────────────────────────────────────────────────────

fn validate_boards(verbose: bool) -> Vec<TestResult> {
    println!("--- Puzzle Boards ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(3);

    for kind in HackKind::ALL {
        for threat in 1..=5 {
            let board = Board::generate(kind, threat, &mut rng);
            let limit = kind.time_limit(threat);
            let ok = limit > 0 && board.cell_count() > 0 && !board.is_solved();
            if verbose || !ok {
                check(
                    &mut results,
                    &format!("board_{}_{}", kind.title().to_lowercase().replace(' ', "_"), threat),
                    ok,
                    format!("{}s on the clock", limit),
                );
            }
        }
    }

    if results.is_empty() {
        check(&mut results, "boards_generate", true, "all kinds, threat 1-5".into());
    }

    results
}

// ── 8. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(game: &mut Overseer, clock: &ManualClock) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();

    let mut buffer = Vec::new();
    let exported = game.export(&mut buffer);
    check(
        &mut results,
        "export_snapshot",
        exported.is_ok(),
        format!("{} bytes", buffer.len()),
    );

    let storage = MemoryStorage::new();
    let restored = Overseer::new(
        game.config().clone(),
        Box::new(clock.clone()),
        Box::new(storage.clone()),
    );
    let imported = match restored {
        Ok(mut copy) => match copy.import(&buffer[..]) {
            Ok(()) => {
                let same = copy.snapshot() == game.snapshot();
                let saved = copy.save().is_ok() && storage.contents().is_some();
                same && saved
            }
            Err(_) => false,
        },
        Err(_) => false,
    };
    check(
        &mut results,
        "import_matches_export",
        imported,
        "imported game saves to storage".into(),
    );

    let reloaded = Overseer::new(
        game.config().clone(),
        Box::new(clock.clone()),
        Box::new(storage),
    )
    .map(|copy| copy.research().reliability() == game.research().reliability())
    .unwrap_or(false);
    check(&mut results, "reload_from_storage", reloaded, "reliability survives".into());

    results
}
