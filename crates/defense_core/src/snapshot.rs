//! Session snapshots computed from `GameState`.
//!
//! A single `compute_snapshot(&GameState) -> SessionSnapshot` samples the
//! current state for time-series analysis. No state mutation, no IO in the
//! compute path.

use crate::types::GameState;
use serde::Serialize;
use std::io::Write;

/// Current schema version — bump when fields are added/removed/reordered.
const SNAPSHOT_VERSION: u32 = 2;

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub tick: u64,
    pub snapshot_version: u32,

    // Economy
    pub hash: i64,
    pub hash_earned: i64,

    // Efficiency
    pub leak_counter: u32,
    pub efficiency: u32,

    // Power
    pub power_used: u32,
    pub power_capacity: u32,

    // Defense grid
    pub tower_count: u32,
    pub avg_tower_level: f64,
    pub total_dps: f64,

    // Threats
    pub enemy_count: u32,
    pub breach_count: u32,
    pub idle_threat_level: f64,

    // Campaign
    pub current_wave: u32,
    pub waves_completed: u32,
    pub enemies_killed: u64,

    // Territory
    pub unlocked_sector_count: u32,
    pub paused_sector_count: u32,

    // Crises
    pub boss_active: bool,
    pub boss_engaged: bool,
    pub zero_day_active: bool,
    pub overclock_active: bool,
    pub loot_pending: bool,

    // Terminal flags
    pub frozen: bool,
    pub victory: bool,
}

#[allow(clippy::cast_possible_truncation)]
pub fn compute_snapshot(state: &GameState) -> SessionSnapshot {
    let tower_count = state.towers.len() as u32;
    let avg_tower_level = if state.towers.is_empty() {
        0.0
    } else {
        let level_sum: u32 = state.towers.iter().map(|t| u32::from(t.level)).sum();
        f64::from(level_sum) / state.towers.len() as f64
    };
    let total_dps: f64 = state.towers.iter().map(crate::TowerState::dps).sum();
    let breach_count = state.enemies.iter().filter(|e| e.breach).count() as u32;

    SessionSnapshot {
        tick: state.meta.tick,
        snapshot_version: SNAPSHOT_VERSION,
        hash: state.hash,
        hash_earned: state.stats.hash_earned,
        leak_counter: state.leak_counter,
        efficiency: state.efficiency(),
        power_used: state.power_used,
        power_capacity: state.power_capacity,
        tower_count,
        avg_tower_level,
        total_dps,
        enemy_count: state.enemies.len() as u32,
        breach_count,
        idle_threat_level: state.idle_threat_level,
        current_wave: state.current_wave(),
        waves_completed: state.waves_completed,
        enemies_killed: state.stats.enemies_killed,
        unlocked_sector_count: state.unlocked_sectors.len() as u32,
        paused_sector_count: state.paused_sectors.len() as u32,
        boss_active: state.boss_active(),
        boss_engaged: state.boss.as_ref().is_some_and(|b| b.engaged),
        zero_day_active: state.zero_day_active(),
        overclock_active: state.overclock_active(),
        loot_pending: state.pending_loot.is_some(),
        frozen: state.frozen,
        victory: state.victory,
    }
}

/// Write the CSV header row for snapshots.
pub fn write_snapshot_header(writer: &mut impl std::io::Write) -> std::io::Result<()> {
    writeln!(
        writer,
        "tick,snapshot_version,\
         hash,hash_earned,\
         leak_counter,efficiency,\
         power_used,power_capacity,\
         tower_count,avg_tower_level,total_dps,\
         enemy_count,breach_count,idle_threat_level,\
         current_wave,waves_completed,enemies_killed,\
         unlocked_sector_count,paused_sector_count,\
         boss_active,boss_engaged,zero_day_active,overclock_active,loot_pending,\
         frozen,victory"
    )
}

/// Append a single snapshot as a CSV row.
pub fn append_snapshot_row(
    writer: &mut impl std::io::Write,
    snapshot: &SessionSnapshot,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        snapshot.tick,
        snapshot.snapshot_version,
        snapshot.hash,
        snapshot.hash_earned,
        snapshot.leak_counter,
        snapshot.efficiency,
        snapshot.power_used,
        snapshot.power_capacity,
        snapshot.tower_count,
        snapshot.avg_tower_level,
        snapshot.total_dps,
        snapshot.enemy_count,
        snapshot.breach_count,
        snapshot.idle_threat_level,
        snapshot.current_wave,
        snapshot.waves_completed,
        snapshot.enemies_killed,
        snapshot.unlocked_sector_count,
        snapshot.paused_sector_count,
        snapshot.boss_active,
        snapshot.boss_engaged,
        snapshot.zero_day_active,
        snapshot.overclock_active,
        snapshot.loot_pending,
        snapshot.frozen,
        snapshot.victory,
    )
}

/// Write a collection of snapshots to a CSV file.
pub fn write_snapshot_csv(path: &str, snapshots: &[SessionSnapshot]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_snapshot_header(&mut file)?;
    for snapshot in snapshots {
        append_snapshot_row(&mut file, snapshot)?;
    }
    Ok(())
}

/// Maximum data rows per CSV file before rotating to a new file.
const MAX_ROWS_PER_FILE: usize = 50_000;

/// Rotating snapshot CSV writer. Automatically splits into numbered files
/// (`snapshots_000.csv`, `snapshots_001.csv`, ...) after
/// [`MAX_ROWS_PER_FILE`] rows each.
pub struct SnapshotFileWriter {
    run_dir: std::path::PathBuf,
    file_index: u32,
    rows_in_current_file: usize,
    writer: std::io::BufWriter<std::fs::File>,
}

impl SnapshotFileWriter {
    /// Create a new writer, opening the first CSV file with a header row.
    pub fn new(run_dir: std::path::PathBuf) -> std::io::Result<Self> {
        let writer = open_csv_file(&run_dir, 0)?;
        Ok(Self {
            run_dir,
            file_index: 0,
            rows_in_current_file: 0,
            writer,
        })
    }

    /// Append one snapshot row, rotating to a new file if the current one is full.
    pub fn write_row(&mut self, snapshot: &SessionSnapshot) -> std::io::Result<()> {
        if self.rows_in_current_file >= MAX_ROWS_PER_FILE {
            self.writer.flush()?;
            self.file_index += 1;
            self.writer = open_csv_file(&self.run_dir, self.file_index)?;
            self.rows_in_current_file = 0;
        }
        append_snapshot_row(&mut self.writer, snapshot)?;
        self.writer.flush()?;
        self.rows_in_current_file += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

fn open_csv_file(
    run_dir: &std::path::Path,
    index: u32,
) -> std::io::Result<std::io::BufWriter<std::fs::File>> {
    let name = format!("snapshots_{index:03}.csv");
    let path = run_dir.join(name);
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    write_snapshot_header(&mut writer)?;
    Ok(writer)
}
