use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use defense_control::{AutoDefender, CommandSource};
use defense_core::{Event, EventLevel, GameState, SnapshotFileWriter};
use defense_world::{
    apply_profile_deltas, build_initial_state, load_content, load_profile, load_state,
    save_profile, save_state,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "defense_cli", about = "Motherboard Defense Sim CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a headless session for a fixed number of ticks.
    Run {
        #[arg(long)]
        ticks: u64,
        /// Start a fresh session with this seed. Mutually exclusive with --resume.
        #[arg(long, conflicts_with = "resume")]
        seed: Option<u64>,
        /// Resume a saved session from a JSON file. Mutually exclusive with --seed.
        #[arg(long, conflicts_with = "seed")]
        resume: Option<PathBuf>,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        /// Player profile to load and commit deltas back into.
        #[arg(long, default_value = "profile.json")]
        profile: PathBuf,
        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
        print_every: u64,
        #[arg(long, default_value = "normal", value_parser = ["normal", "debug"])]
        event_level: String,
        /// Sample a snapshot row every N ticks.
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
        snapshot_every: u64,
        /// Disable the runs/ directory (run_info.json + snapshot CSVs).
        #[arg(long)]
        no_snapshots: bool,
        /// Write the final session state to this file.
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

fn generate_run_id(seed: u64) -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = now.as_secs();
    let days = secs / 86400;
    let time_of_day = secs % 86400;
    let hours = time_of_day / 3600;
    let minutes = (time_of_day % 3600) / 60;
    let seconds = time_of_day % 60;
    let (year, month, day) = epoch_days_to_date(days);

    format!("{year:04}{month:02}{day:02}_{hours:02}{minutes:02}{seconds:02}_seed{seed}")
}

fn epoch_days_to_date(mut days: u64) -> (u64, u64, u64) {
    // Algorithm from http://howardhinnant.github.io/date_algorithms.html
    days += 719_468;
    let era = days / 146_097;
    let day_of_era = days % 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36524 - day_of_era / 146_096) / 365;
    let year = year_of_era + era * 400;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let mp = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if month <= 2 { year + 1 } else { year };
    (year, month, day)
}

fn create_run_dir(run_id: &str) -> Result<PathBuf> {
    let dir = PathBuf::from("runs").join(run_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating run directory: {}", dir.display()))?;
    Ok(dir)
}

#[allow(clippy::too_many_arguments)]
fn write_run_info(
    dir: &Path,
    run_id: &str,
    seed: u64,
    ticks: u64,
    content_version: &str,
    snapshot_every: u64,
    print_every: u64,
) -> Result<()> {
    let info = serde_json::json!({
        "run_id": run_id,
        "seed": seed,
        "start_time": run_id.split('_').take(2).collect::<Vec<_>>().join("_"),
        "content_version": content_version,
        "snapshot_every": snapshot_every,
        "runner": "defense_cli",
        "args": {
            "ticks": ticks,
            "print_every": print_every,
        }
    });
    let path = dir.join("run_info.json");
    let file =
        std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &info)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Milestone events worth surfacing regardless of `print_every`.
fn log_notable_events(events: &[defense_core::EventEnvelope], state: &GameState) {
    for envelope in events {
        match &envelope.event {
            Event::WaveCompleted { wave } => {
                tracing::info!(tick = state.meta.tick, wave, "wave completed");
            }
            Event::BossSpawned {
                boss_id, district, ..
            } => {
                tracing::warn!(
                    tick = state.meta.tick,
                    boss = %boss_id.0,
                    district = %district.0,
                    "boss approaching"
                );
            }
            Event::BossFightResolved { boss_id, outcome } => {
                tracing::info!(
                    tick = state.meta.tick,
                    boss = %boss_id.0,
                    ?outcome,
                    "boss fight resolved"
                );
            }
            Event::ZeroDayTriggered => {
                tracing::warn!(tick = state.meta.tick, "zero-day exploit active");
            }
            Event::SystemFrozen { leak_counter } => {
                tracing::error!(tick = state.meta.tick, leak_counter, "system frozen");
            }
            Event::SystemRestored { path, efficiency } => {
                tracing::info!(
                    tick = state.meta.tick,
                    ?path,
                    efficiency,
                    "system restored"
                );
            }
            Event::SectorUnlocked { sector } => {
                tracing::info!(tick = state.meta.tick, sector = %sector.0, "sector unlocked");
            }
            Event::Victory => {
                tracing::info!(tick = state.meta.tick, "campaign complete");
            }
            _ => {}
        }
    }
}

fn log_status(state: &GameState) {
    tracing::info!(
        tick = state.meta.tick,
        hash = state.hash,
        efficiency = state.efficiency(),
        wave = state.current_wave(),
        towers = state.towers.len(),
        enemies = state.enemies.len(),
        threat = state.idle_threat_level,
        "status"
    );
}

#[allow(clippy::too_many_arguments)]
#[allow(clippy::too_many_lines)]
fn run(
    ticks: u64,
    seed: Option<u64>,
    resume: Option<PathBuf>,
    content_dir: &str,
    profile_path: &Path,
    print_every: u64,
    event_level: EventLevel,
    snapshot_every: u64,
    no_snapshots: bool,
    save: Option<PathBuf>,
) -> Result<()> {
    let content = load_content(content_dir)?;
    let mut profile = load_profile(profile_path, &content)?;

    let (mut state, mut rng) = if let Some(path) = resume {
        let loaded = load_state(&path)?;
        let rng_seed = loaded.meta.seed;
        (loaded, ChaCha8Rng::seed_from_u64(rng_seed))
    } else {
        let resolved_seed = seed.unwrap_or_else(rand::random);
        let mut new_rng = ChaCha8Rng::seed_from_u64(resolved_seed);
        let new_state = build_initial_state(&content, &profile, resolved_seed, &mut new_rng);
        (new_state, new_rng)
    };

    // Set up the per-run snapshot directory.
    let mut snapshot_writer: Option<SnapshotFileWriter> = None;
    if !no_snapshots {
        let run_id = generate_run_id(state.meta.seed);
        let run_dir = create_run_dir(&run_id)?;
        write_run_info(
            &run_dir,
            &run_id,
            state.meta.seed,
            ticks,
            &content.content_version,
            snapshot_every,
            print_every,
        )?;
        let writer = SnapshotFileWriter::new(run_dir.clone())
            .with_context(|| format!("opening snapshot CSV in {}", run_dir.display()))?;
        snapshot_writer = Some(writer);
        tracing::info!(run_dir = %run_dir.display(), "run directory created");
    }

    let mut defender = AutoDefender;
    let mut next_command_id = state.counters.next_command_id;

    tracing::info!(
        ticks,
        seed = state.meta.seed,
        content_version = %content.content_version,
        sectors = state.unlocked_sectors.len(),
        hash = state.hash,
        "starting session"
    );

    for _ in 0..ticks {
        let commands = defender.generate_commands(&state, &content, &mut next_command_id);
        let events = defense_core::tick(&mut state, &commands, &content, &mut rng, event_level);

        log_notable_events(&events, &state);

        if state.meta.tick % print_every == 0 {
            log_status(&state);
        }

        if let Some(ref mut writer) = snapshot_writer {
            if state.meta.tick % snapshot_every == 0 {
                let snapshot = defense_core::compute_snapshot(&state);
                writer.write_row(&snapshot).context("writing snapshot row")?;
            }
        }

        if state.victory {
            break;
        }
    }
    state.counters.next_command_id = next_command_id;

    tracing::info!(
        tick = state.meta.tick,
        hash = state.hash,
        waves_completed = state.waves_completed,
        enemies_killed = state.stats.enemies_killed,
        victory = state.victory,
        frozen = state.frozen,
        "session finished"
    );

    // Commit the session's deltas back into the persistent profile.
    if !state.profile_deltas.is_empty() {
        apply_profile_deltas(&mut profile, &state.profile_deltas);
        save_profile(profile_path, &profile)?;
        tracing::info!(
            deltas = state.profile_deltas.len(),
            profile = %profile_path.display(),
            "profile updated"
        );
    }

    if let Some(path) = save {
        save_state(&path, &state)?;
        tracing::info!(save = %path.display(), "session state written");
    }

    if let Some(ref mut writer) = snapshot_writer {
        writer.flush().context("final snapshot flush")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            ticks,
            seed,
            resume,
            content_dir,
            profile,
            print_every,
            event_level,
            snapshot_every,
            no_snapshots,
            save,
        } => {
            let level = match event_level.as_str() {
                "debug" => EventLevel::Debug,
                _ => EventLevel::Normal,
            };
            run(
                ticks,
                seed,
                resume,
                &content_dir,
                &profile,
                print_every,
                level,
                snapshot_every,
                no_snapshots,
                save,
            )?;
        }
    }
    Ok(())
}
