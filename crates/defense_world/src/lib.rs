//! Content loading, profile persistence, and session setup shared between
//! defense_cli consumers.

use anyhow::{Context, Result};
use chrono::Utc;
use defense_core::{
    Constants, Counters, GameContent, GameState, MapDef, MetaState, PlayerProfile, ProfileDelta,
    Rarity, SessionStats, SlotState, WaveProgress, WeaponDef,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Bankroll for a profile that has never banked a session.
pub const DEFAULT_STARTING_HASH: i64 = 500;

const SAVE_SCHEMA_VERSION: u32 = 1;

#[derive(Deserialize)]
struct WeaponsFile {
    content_version: String,
    weapons: Vec<WeaponDef>,
}

#[derive(Serialize, Deserialize)]
struct SaveFile {
    saved_at: String,
    schema_version: u32,
    state: GameState,
}

/// Validates cross-references in loaded content, panicking on any authoring
/// error.
///
/// Catches mistakes like: a slot placed in an unknown sector, a boss gate
/// opening a sector that does not exist, or placement costs that fail to
/// escalate with rarity.
pub fn validate_content(content: &GameContent) {
    let sector_ids: HashSet<&str> = content
        .map
        .sectors
        .iter()
        .map(|s| s.id.0.as_str())
        .collect();
    assert_eq!(
        sector_ids.len(),
        content.map.sectors.len(),
        "map '{}' contains duplicate sector ids",
        content.map.id,
    );

    let starters: Vec<&str> = content
        .map
        .sectors
        .iter()
        .filter(|s| s.starter)
        .map(|s| s.id.0.as_str())
        .collect();
    assert_eq!(
        starters.len(),
        1,
        "map '{}' must have exactly one starter sector, found {:?}",
        content.map.id,
        starters,
    );

    for sector in &content.map.sectors {
        assert!(
            sector.lane_length > 0.0,
            "sector '{}' has non-positive lane_length {}",
            sector.id.0,
            sector.lane_length,
        );
        assert!(
            sector.starter || sector.unlock_cost > 0,
            "non-starter sector '{}' has no unlock cost",
            sector.id.0,
        );
        if let Some(target) = &sector.boss.unlocks_sector {
            assert!(
                sector_ids.contains(target.0.as_str()),
                "boss '{}' unlocks unknown sector '{}'",
                sector.boss.id.0,
                target.0,
            );
        }
    }

    let mut slot_ids = HashSet::new();
    for slot in &content.map.slots {
        assert!(
            slot_ids.insert(slot.id.0.as_str()),
            "duplicate slot id '{}'",
            slot.id.0,
        );
        assert!(
            sector_ids.contains(slot.sector.0.as_str()),
            "slot '{}' references unknown sector '{}'",
            slot.id.0,
            slot.sector.0,
        );
        let sector = content
            .sector(&slot.sector)
            .expect("sector id was just checked");
        assert!(
            slot.lane_position >= 0.0 && slot.lane_position <= sector.lane_length,
            "slot '{}' lane_position {} is outside lane [0, {}]",
            slot.id.0,
            slot.lane_position,
            sector.lane_length,
        );
    }
    let starter_has_slot = content.map.slots.iter().any(|slot| {
        content
            .sector(&slot.sector)
            .is_some_and(|sector| sector.starter)
    });
    assert!(starter_has_slot, "starter sector has no tower slots");

    let mut weapon_ids = HashSet::new();
    for weapon in &content.weapons {
        assert!(!weapon.id.0.is_empty(), "weapon has empty id");
        assert!(
            weapon_ids.insert(weapon.id.0.as_str()),
            "duplicate weapon id '{}'",
            weapon.id.0,
        );
    }

    let c = &content.constants;
    assert!(
        c.tower_cost_common < c.tower_cost_rare
            && c.tower_cost_rare < c.tower_cost_epic
            && c.tower_cost_epic < c.tower_cost_legendary,
        "placement costs must escalate with rarity: {} / {} / {} / {}",
        c.tower_cost_common,
        c.tower_cost_rare,
        c.tower_cost_epic,
        c.tower_cost_legendary,
    );
}

pub fn load_content(content_dir: &str) -> Result<GameContent> {
    let dir = Path::new(content_dir);
    let constants: Constants = serde_json::from_str(
        &std::fs::read_to_string(dir.join("constants.json")).context("reading constants.json")?,
    )
    .context("parsing constants.json")?;
    let weapons_file: WeaponsFile = serde_json::from_str(
        &std::fs::read_to_string(dir.join("weapons.json")).context("reading weapons.json")?,
    )
    .context("parsing weapons.json")?;
    let map: MapDef = serde_json::from_str(
        &std::fs::read_to_string(dir.join("map.json")).context("reading map.json")?,
    )
    .context("parsing map.json")?;
    let content = GameContent {
        content_version: weapons_file.content_version,
        weapons: weapons_file.weapons,
        map,
        constants,
    };
    validate_content(&content);
    Ok(content)
}

/// Profile for a brand-new player: the starter sector, every common weapon,
/// and the default bankroll.
pub fn default_profile(content: &GameContent) -> PlayerProfile {
    PlayerProfile {
        starting_hash: DEFAULT_STARTING_HASH,
        production_multiplier: 1.0,
        unlocked_sectors: content
            .map
            .sectors
            .iter()
            .filter(|s| s.starter)
            .map(|s| s.id.clone())
            .collect(),
        loadout: content
            .weapons
            .iter()
            .filter(|w| w.rarity == Rarity::Common)
            .map(|w| w.id.clone())
            .collect(),
        defeated_bosses: HashSet::new(),
        blueprints: HashSet::new(),
    }
}

/// Loads a profile from disk, falling back to [`default_profile`] when no
/// file exists yet.
pub fn load_profile(path: &Path, content: &GameContent) -> Result<PlayerProfile> {
    if !path.exists() {
        return Ok(default_profile(content));
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading profile {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing profile {}", path.display()))
}

pub fn save_profile(path: &Path, profile: &PlayerProfile) -> Result<()> {
    let raw = serde_json::to_string_pretty(profile).context("serializing profile")?;
    std::fs::write(path, raw).with_context(|| format!("writing profile {}", path.display()))
}

/// Commits the session's accumulated deltas into the persistent profile.
/// Idempotent: replaying the same deltas leaves the profile unchanged.
pub fn apply_profile_deltas(profile: &mut PlayerProfile, deltas: &[ProfileDelta]) {
    for delta in deltas {
        match delta {
            ProfileDelta::BlueprintEarned(protocol) => {
                profile.blueprints.insert(protocol.clone());
            }
            ProfileDelta::BossDefeated(boss) => {
                profile.defeated_bosses.insert(boss.clone());
            }
            ProfileDelta::SectorUnlocked(sector) => {
                profile.unlocked_sectors.insert(sector.clone());
            }
            // The banked balance becomes the next session's stake.
            ProfileDelta::HashBanked(amount) => profile.starting_hash = *amount,
        }
    }
}

/// Fresh session state compiled from the player profile.
pub fn build_initial_state(
    content: &GameContent,
    profile: &PlayerProfile,
    seed: u64,
    rng: &mut impl Rng,
) -> GameState {
    let mut unlocked_sectors = profile.unlocked_sectors.clone();
    // The starter sector is unlocked no matter what the profile says.
    for sector in content.map.sectors.iter().filter(|s| s.starter) {
        unlocked_sectors.insert(sector.id.clone());
    }

    GameState {
        meta: MetaState {
            tick: 0,
            seed,
            session_id: defense_core::generate_uuid(rng),
            schema_version: SAVE_SCHEMA_VERSION,
            content_version: content.content_version.clone(),
        },
        hash: profile.starting_hash,
        power_capacity: content.constants.starting_power_capacity,
        power_used: 0,
        leak_counter: 0,
        waves_completed: 0,
        victory: false,
        frozen: false,
        towers: vec![],
        slots: content
            .map
            .slots
            .iter()
            .map(|def| SlotState {
                id: def.id.clone(),
                sector: def.sector.clone(),
                lane_position: def.lane_position,
                occupied: false,
            })
            .collect(),
        enemies: vec![],
        wave: WaveProgress {
            schedule: defense_core::wave_schedule(&content.constants),
            spawned_in_wave: 0,
            spawn_timer: 0.0,
        },
        zero_day: None,
        boss: None,
        bosses_spawned: 0,
        pending_loot: None,
        overclock: None,
        unlocked_sectors,
        paused_sectors: HashSet::new(),
        defeated_bosses: profile.defeated_bosses.clone(),
        idle_threat_level: 0.0,
        idle_spawn_timer: -content.constants.idle_grace_seconds,
        production_accum: 0.0,
        production_multiplier: profile.production_multiplier,
        loadout: profile.loadout.clone(),
        stats: SessionStats::default(),
        profile_deltas: vec![],
        counters: Counters {
            next_event_id: 0,
            next_command_id: 0,
            next_tower_id: 0,
            next_enemy_id: 0,
        },
    }
}

pub fn save_state(path: &Path, state: &GameState) -> Result<()> {
    let file = SaveFile {
        saved_at: Utc::now().to_rfc3339(),
        schema_version: state.meta.schema_version,
        state: state.clone(),
    };
    let raw = serde_json::to_string_pretty(&file).context("serializing session state")?;
    std::fs::write(path, raw).with_context(|| format!("writing save {}", path.display()))
}

pub fn load_state(path: &Path) -> Result<GameState> {
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("reading save {}", path.display()))?;
    let file: SaveFile =
        serde_json::from_str(&raw).with_context(|| format!("parsing save {}", path.display()))?;
    anyhow::ensure!(
        file.schema_version == SAVE_SCHEMA_VERSION,
        "save {} has schema version {}, expected {}",
        path.display(),
        file.schema_version,
        SAVE_SCHEMA_VERSION,
    );
    Ok(file.state)
}
