//! Shared test fixtures for defense_core and downstream crates.
//!
//! `base_content()` provides a three-sector map with two weapons and
//! compressed pacing constants suitable for integration-level tests.
//! `base_state()` is a fresh session on that content: starter sector
//! unlocked, both weapons compiled, 500 hash in the bank.

use crate::{
    BossDef, Constants, Counters, GameContent, GameState, MapDef, MetaState, ProtocolId, Rarity,
    SectorDef, SectorId, SessionStats, SlotDef, SlotId, WaveProgress, WeaponDef, WeaponTypeId,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

pub const STARTER_SECTOR: &str = "sector_cpu";
pub const GATED_SECTOR: &str = "sector_gpu";
pub const PURCHASABLE_SECTOR: &str = "sector_ram";

/// Three-sector map: cpu (starter), gpu (gated behind the cpu boss), ram
/// (purchasable). Two weapons, fast waves, no random Zero-Days unless a
/// test turns them on.
pub fn base_content() -> GameContent {
    GameContent {
        content_version: "test".to_string(),
        weapons: vec![
            WeaponDef {
                id: WeaponTypeId("weapon_firewall".to_string()),
                name: "Firewall".to_string(),
                rarity: Rarity::Common,
                damage: 5.0,
                range: 5.0,
                attack_speed: 1.0,
                power_draw: 10,
                base_upgrade_cost: 25,
                damage_growth_per_level: 0.2,
                range_growth_per_level: 0.05,
                speed_growth_per_level: 0.1,
            },
            WeaponDef {
                id: WeaponTypeId("weapon_scrubber".to_string()),
                name: "Memory Scrubber".to_string(),
                rarity: Rarity::Rare,
                damage: 12.0,
                range: 4.0,
                attack_speed: 0.8,
                power_draw: 20,
                base_upgrade_cost: 40,
                damage_growth_per_level: 0.25,
                range_growth_per_level: 0.05,
                speed_growth_per_level: 0.1,
            },
        ],
        map: MapDef {
            id: "map_motherboard".to_string(),
            sectors: vec![
                SectorDef {
                    id: SectorId(STARTER_SECTOR.to_string()),
                    name: "CPU District".to_string(),
                    starter: true,
                    unlock_cost: 0,
                    lane_length: 10.0,
                    boss: BossDef {
                        id: crate::BossId("boss_trojan_titan".to_string()),
                        kind: "Trojan Titan".to_string(),
                        blueprint: Some(ProtocolId("blueprint_scrubber_mk2".to_string())),
                        unlocks_sector: Some(SectorId(GATED_SECTOR.to_string())),
                    },
                },
                SectorDef {
                    id: SectorId(GATED_SECTOR.to_string()),
                    name: "GPU District".to_string(),
                    starter: false,
                    unlock_cost: 300,
                    lane_length: 12.0,
                    boss: BossDef {
                        id: crate::BossId("boss_worm_warden".to_string()),
                        kind: "Worm Warden".to_string(),
                        blueprint: None,
                        unlocks_sector: None,
                    },
                },
                SectorDef {
                    id: SectorId(PURCHASABLE_SECTOR.to_string()),
                    name: "RAM District".to_string(),
                    starter: false,
                    unlock_cost: 250,
                    lane_length: 8.0,
                    boss: BossDef {
                        id: crate::BossId("boss_rootkit_regent".to_string()),
                        kind: "Rootkit Regent".to_string(),
                        blueprint: None,
                        unlocks_sector: None,
                    },
                },
            ],
            slots: vec![
                SlotDef {
                    id: SlotId("slot_cpu_a".to_string()),
                    sector: SectorId(STARTER_SECTOR.to_string()),
                    lane_position: 2.0,
                },
                SlotDef {
                    id: SlotId("slot_cpu_b".to_string()),
                    sector: SectorId(STARTER_SECTOR.to_string()),
                    lane_position: 5.0,
                },
                SlotDef {
                    id: SlotId("slot_ram_a".to_string()),
                    sector: SectorId(PURCHASABLE_SECTOR.to_string()),
                    lane_position: 3.0,
                },
            ],
        },
        constants: Constants {
            tick_seconds: 1.0,
            starting_power_capacity: 100,
            tower_cost_common: 50,
            tower_cost_rare: 100,
            tower_cost_epic: 200,
            tower_cost_legendary: 400,
            sell_refund_fraction: 0.5,
            merge_damage_bonus: 0.25,
            total_waves: 3,
            wave_base_enemies: 2,
            wave_enemies_growth: 1,
            wave_health_growth: 0.2,
            wave_spawn_interval: 1.0,
            enemy_base_health: 10.0,
            enemy_speed: 1.0,
            enemy_bounty: 5,
            leak_cap: 20,
            idle_threat_per_sector: 0.5,
            idle_threat_growth_per_second: 0.01,
            idle_grace_seconds: 30.0,
            base_hash_per_second: 10.0,
            overclock_duration_seconds: 30.0,
            overclock_hash_multiplier: 2.0,
            overclock_spawn_multiplier: 1.5,
            // Deterministic by default; tests that exercise Zero-Days set
            // this themselves.
            zero_day_chance_per_second: 0.0,
            zero_day_drain_per_second: 2.0,
            zero_day_hash_bonus: 200,
            zero_day_restore_leaks: 2,
            zero_day_fail_leak_penalty: 3,
            flush_cost_floor: 100,
            flush_restore_leak_counter: 10,
            boss_threat_threshold: 5.0,
            boss_threat_step: 1.0,
            boss_approach_seconds: 10.0,
            boss_leak_penalty: 5,
        },
    }
}

/// Fresh session on the fixture map: starter sector unlocked, both weapons
/// in the loadout, 500 hash.
pub fn base_state(content: &GameContent) -> GameState {
    let mut rng = make_rng();

    GameState {
        meta: MetaState {
            tick: 0,
            seed: 42,
            session_id: crate::generate_uuid(&mut rng),
            schema_version: 1,
            content_version: content.content_version.clone(),
        },
        hash: 500,
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
            .map(|def| crate::SlotState {
                id: def.id.clone(),
                sector: def.sector.clone(),
                lane_position: def.lane_position,
                occupied: false,
            })
            .collect(),
        enemies: vec![],
        wave: WaveProgress {
            schedule: crate::wave_schedule(&content.constants),
            spawned_in_wave: 0,
            spawn_timer: 0.0,
        },
        zero_day: None,
        boss: None,
        bosses_spawned: 0,
        pending_loot: None,
        overclock: None,
        unlocked_sectors: HashSet::from([SectorId(STARTER_SECTOR.to_string())]),
        paused_sectors: HashSet::new(),
        defeated_bosses: HashSet::new(),
        idle_threat_level: 0.0,
        idle_spawn_timer: -content.constants.idle_grace_seconds,
        production_accum: 0.0,
        production_multiplier: 1.0,
        loadout: vec![
            WeaponTypeId("weapon_firewall".to_string()),
            WeaponTypeId("weapon_scrubber".to_string()),
        ],
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

/// Deterministic RNG seeded with 42.
pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}
