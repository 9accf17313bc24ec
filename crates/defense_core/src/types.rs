//! Type definitions for `defense_core`.
//!
//! All public types, structs, enums, and ID newtypes used by the simulation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(SlotId);
string_id!(TowerId);
string_id!(EnemyId);
string_id!(SectorId);
string_id!(BossId);
string_id!(WeaponTypeId);
string_id!(ProtocolId);
string_id!(CommandId);
string_id!(EventId);

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossDifficulty {
    Easy,
    Normal,
    Hard,
    Nightmare,
}

/// Static reward/threat tuple for a boss difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyParams {
    pub hash_reward: i64,
    pub blueprint_chance: f64,
    pub health_multiplier: f64,
}

impl BossDifficulty {
    /// Immutable configuration, not player state.
    pub fn params(self) -> DifficultyParams {
        match self {
            Self::Easy => DifficultyParams {
                hash_reward: 100,
                blueprint_chance: 0.10,
                health_multiplier: 1.0,
            },
            Self::Normal => DifficultyParams {
                hash_reward: 250,
                blueprint_chance: 0.25,
                health_multiplier: 1.5,
            },
            Self::Hard => DifficultyParams {
                hash_reward: 500,
                blueprint_chance: 0.45,
                health_multiplier: 2.25,
            },
            Self::Nightmare => DifficultyParams {
                hash_reward: 1000,
                blueprint_chance: 0.70,
                health_multiplier: 3.5,
            },
        }
    }
}

/// Outcome of an externally-run sub-session (boss fight, override challenge).
/// Fleeing is a valid, explicit outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FightOutcome {
    Victory,
    Defeat,
    Fled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventLevel {
    Normal,
    Debug,
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub meta: MetaState,
    pub hash: i64,
    pub power_capacity: u32,
    pub power_used: u32,
    /// Leaked enemy count, clamped to `[0, leak_cap]`. The single source of
    /// truth for efficiency — see [`GameState::efficiency`].
    pub leak_counter: u32,
    pub waves_completed: u32,
    pub victory: bool,
    /// System Freeze: the terminal gameplay state. Doubles as game-over until
    /// a recovery path succeeds.
    pub frozen: bool,
    pub towers: Vec<TowerState>,
    pub slots: Vec<SlotState>,
    /// Ordered by spawn; order is irrelevant to gameplay but kept stable for
    /// deterministic iteration.
    pub enemies: Vec<EnemyState>,
    pub wave: WaveProgress,
    pub zero_day: Option<ZeroDayState>,
    pub boss: Option<BossState>,
    pub bosses_spawned: u32,
    /// Computed-but-uncollected boss reward (two-phase commit).
    pub pending_loot: Option<BossLoot>,
    pub overclock: Option<OverclockState>,
    pub unlocked_sectors: HashSet<SectorId>,
    pub paused_sectors: HashSet<SectorId>,
    pub defeated_bosses: HashSet<BossId>,
    pub idle_threat_level: f64,
    /// Spawn accumulator; spawns one enemy per whole unit. Pre-seeded negative
    /// for the new-player grace period.
    pub idle_spawn_timer: f64,
    /// Fractional passive income carried between ticks.
    pub production_accum: f64,
    pub production_multiplier: f64,
    /// Compiled protocol loadout from the player profile; placement is
    /// restricted to these weapon types.
    pub loadout: Vec<WeaponTypeId>,
    pub stats: SessionStats,
    pub profile_deltas: Vec<ProfileDelta>,
    pub counters: Counters,
}

impl GameState {
    /// `100 - leak_counter * 5`, clamped to `[0, 100]`. No stored field may
    /// diverge from this.
    pub fn efficiency(&self) -> u32 {
        100_u32.saturating_sub(self.leak_counter.min(20) * 5)
    }

    pub fn current_wave(&self) -> u32 {
        self.waves_completed + 1
    }

    pub fn zero_day_active(&self) -> bool {
        self.zero_day.is_some()
    }

    pub fn boss_active(&self) -> bool {
        self.boss.is_some()
    }

    pub fn overclock_active(&self) -> bool {
        self.overclock.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaState {
    pub tick: u64,
    pub seed: u64,
    pub session_id: Uuid,
    pub schema_version: u32,
    pub content_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counters {
    pub next_event_id: u64,
    pub next_command_id: u64,
    pub next_tower_id: u64,
    pub next_enemy_id: u64,
}

pub const MAX_TOWER_LEVEL: u8 = 10;
pub const MAX_MERGE_LEVEL: u8 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerState {
    pub id: TowerId,
    pub weapon: WeaponTypeId,
    pub slot: SlotId,
    pub sector: SectorId,
    /// Lane offset of the occupied slot, cached at placement.
    pub lane_position: f64,
    pub level: u8,
    pub merge_level: u8,
    // Derived from the weapon curve; recomputed on every level/merge change.
    pub damage: f64,
    pub range: f64,
    pub attack_speed: f64,
}

impl TowerState {
    pub fn can_upgrade(&self) -> bool {
        self.level < MAX_TOWER_LEVEL
    }

    /// Damage per second at current level and merge tier.
    pub fn dps(&self) -> f64 {
        self.damage * self.attack_speed
    }
}

/// Pre-placed by the map; occupancy is the only runtime mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotState {
    pub id: SlotId,
    pub sector: SectorId,
    pub lane_position: f64,
    pub occupied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyState {
    pub id: EnemyId,
    pub sector: SectorId,
    /// Distance left to the core along the sector lane; `<= 0` is a leak.
    pub distance_to_core: f64,
    pub health: f64,
    pub speed: f64,
    pub bounty: i64,
    /// Part of a scheduled wave (as opposed to idle threat).
    pub wave_member: bool,
    /// Spawned during an active Zero-Day; immune to towers while it lasts.
    pub breach: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveProgress {
    /// Generated once at session start; never mutated afterwards.
    pub schedule: Vec<WavePlan>,
    pub spawned_in_wave: u32,
    pub spawn_timer: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WavePlan {
    pub enemies: u32,
    pub health_multiplier: f64,
    pub spawn_interval: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZeroDayState {
    /// Fractional efficiency drain expressed in leak units; whole units are
    /// moved into `leak_counter` so efficiency keeps a single source of truth.
    pub drain_accum: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossState {
    pub boss_id: BossId,
    pub kind: String,
    pub district: SectorId,
    pub engaged: bool,
    pub difficulty: Option<BossDifficulty>,
    /// Ticks until the un-engaged boss reaches the core.
    pub approach_ticks_left: u64,
}

/// Reward computed on boss victory; committed to hash and profile deltas only
/// on explicit collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossLoot {
    pub boss_id: BossId,
    pub difficulty: BossDifficulty,
    pub hash_reward: i64,
    pub blueprint: Option<ProtocolId>,
    pub first_defeat: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverclockState {
    pub time_remaining: f64,
}

/// Monotonically non-decreasing session counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub enemies_killed: u64,
    pub hash_earned: i64,
    pub towers_placed: u64,
}

// ---------------------------------------------------------------------------
// Profile types
// ---------------------------------------------------------------------------

/// Immutable snapshot of the persistent player profile, taken at session
/// start. The engine never mutates a shared profile; it accumulates
/// [`ProfileDelta`]s instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub starting_hash: i64,
    pub production_multiplier: f64,
    pub unlocked_sectors: HashSet<SectorId>,
    pub loadout: Vec<WeaponTypeId>,
    pub defeated_bosses: HashSet<BossId>,
    pub blueprints: HashSet<ProtocolId>,
}

/// Explicit profile mutations for the persistence collaborator to commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileDelta {
    BlueprintEarned(ProtocolId),
    BossDefeated(BossId),
    SectorUnlocked(SectorId),
    HashBanked(i64),
}

// ---------------------------------------------------------------------------
// Command types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub id: CommandId,
    pub issued_tick: u64,
    pub execute_at_tick: u64,
    pub command: Command,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    PlaceTower {
        weapon: WeaponTypeId,
        slot: SlotId,
    },
    UpgradeTower {
        tower: TowerId,
    },
    SellTower {
        tower: TowerId,
    },
    /// Consumes `consumed` into `kept`, raising the merge tier.
    MergeTowers {
        kept: TowerId,
        consumed: TowerId,
    },
    ActivateOverclock,
    UnlockSector {
        sector: SectorId,
    },
    ToggleSectorPause {
        sector: SectorId,
    },
    EngageBoss {
        difficulty: BossDifficulty,
    },
    ResolveBossFight {
        outcome: FightOutcome,
    },
    CollectBossReward,
    ResolveZeroDayOverride {
        outcome: FightOutcome,
    },
    FlushMemory,
    ResolveManualOverride {
        outcome: FightOutcome,
    },
}

impl Command {
    /// Short label for logs and rejection events.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PlaceTower { .. } => "place_tower",
            Self::UpgradeTower { .. } => "upgrade_tower",
            Self::SellTower { .. } => "sell_tower",
            Self::MergeTowers { .. } => "merge_towers",
            Self::ActivateOverclock => "activate_overclock",
            Self::UnlockSector { .. } => "unlock_sector",
            Self::ToggleSectorPause { .. } => "toggle_sector_pause",
            Self::EngageBoss { .. } => "engage_boss",
            Self::ResolveBossFight { .. } => "resolve_boss_fight",
            Self::CollectBossReward => "collect_boss_reward",
            Self::ResolveZeroDayOverride { .. } => "resolve_zero_day_override",
            Self::FlushMemory => "flush_memory",
            Self::ResolveManualOverride { .. } => "resolve_manual_override",
        }
    }

    /// Recovery and collection commands stay available while the system is
    /// frozen; everything else is rejected.
    pub fn allowed_while_frozen(&self) -> bool {
        matches!(
            self,
            Self::FlushMemory | Self::ResolveManualOverride { .. } | Self::CollectBossReward
        )
    }
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub tick: u64,
    pub event: Event,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    TowerPlaced {
        tower_id: TowerId,
        weapon: WeaponTypeId,
        slot: SlotId,
    },
    TowerUpgraded {
        tower_id: TowerId,
        level: u8,
    },
    TowerSold {
        tower_id: TowerId,
        refund: i64,
    },
    TowersMerged {
        kept: TowerId,
        consumed: TowerId,
        merge_level: u8,
    },
    CommandRejected {
        command: String,
        reason: String,
    },
    WaveStarted {
        wave: u32,
    },
    WaveCompleted {
        wave: u32,
    },
    /// Only emitted at `EventLevel::Debug`.
    EnemySpawned {
        enemy_id: EnemyId,
        sector: SectorId,
        wave_member: bool,
        breach: bool,
    },
    /// Only emitted at `EventLevel::Debug`.
    EnemyKilled {
        enemy_id: EnemyId,
        tower_id: TowerId,
        bounty: i64,
    },
    EnemyLeaked {
        enemy_id: EnemyId,
        leak_counter: u32,
        efficiency: u32,
    },
    /// Only emitted at `EventLevel::Debug`.
    HashProduced {
        amount: i64,
        balance_after: i64,
    },
    BossSpawned {
        boss_id: BossId,
        district: SectorId,
        kind: String,
    },
    BossEngaged {
        boss_id: BossId,
        difficulty: BossDifficulty,
    },
    BossReachedCore {
        boss_id: BossId,
        leak_counter: u32,
    },
    BossFightResolved {
        boss_id: BossId,
        outcome: FightOutcome,
    },
    BossRewardCollected {
        boss_id: BossId,
        hash_reward: i64,
        blueprint: Option<ProtocolId>,
    },
    ZeroDayTriggered,
    ZeroDayResolved {
        outcome: FightOutcome,
    },
    OverclockActivated {
        duration: f64,
    },
    OverclockExpired,
    SectorUnlocked {
        sector: SectorId,
    },
    SectorPauseToggled {
        sector: SectorId,
        paused: bool,
    },
    SystemFrozen {
        leak_counter: u32,
    },
    SystemRestored {
        path: RecoveryPath,
        efficiency: u32,
    },
    Victory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryPath {
    FlushMemory,
    ManualOverride,
}

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameContent {
    pub content_version: String,
    pub weapons: Vec<WeaponDef>,
    pub map: MapDef,
    pub constants: Constants,
}

impl GameContent {
    pub fn weapon(&self, id: &WeaponTypeId) -> Option<&WeaponDef> {
        self.weapons.iter().find(|w| &w.id == id)
    }

    pub fn sector(&self, id: &SectorId) -> Option<&SectorDef> {
        self.map.sectors.iter().find(|s| &s.id == id)
    }
}

/// A placeable defensive program archetype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponDef {
    pub id: WeaponTypeId,
    pub name: String,
    pub rarity: Rarity,
    /// Damage per attack at level 1, merge tier 0.
    pub damage: f64,
    pub range: f64,
    /// Attacks per second.
    pub attack_speed: f64,
    pub power_draw: u32,
    pub base_upgrade_cost: i64,
    pub damage_growth_per_level: f64,
    pub range_growth_per_level: f64,
    pub speed_growth_per_level: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDef {
    pub id: String,
    pub sectors: Vec<SectorDef>,
    pub slots: Vec<SlotDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorDef {
    pub id: SectorId,
    pub name: String,
    /// The starter sector is always unlocked and can never be paused.
    pub starter: bool,
    pub unlock_cost: i64,
    /// Enemies spawn at this distance from the core.
    pub lane_length: f64,
    pub boss: BossDef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossDef {
    pub id: BossId,
    pub kind: String,
    /// Blueprint awarded on a successful drop roll.
    pub blueprint: Option<ProtocolId>,
    /// Sector gate opened by the first defeat of this boss.
    pub unlocks_sector: Option<SectorId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotDef {
    pub id: SlotId,
    pub sector: SectorId,
    /// Offset along the sector lane, measured from the core.
    pub lane_position: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    pub tick_seconds: f64,
    pub starting_power_capacity: u32,
    // Rarity-tiered placement costs; must escalate (validated at load).
    pub tower_cost_common: i64,
    pub tower_cost_rare: i64,
    pub tower_cost_epic: i64,
    pub tower_cost_legendary: i64,
    pub sell_refund_fraction: f64,
    pub merge_damage_bonus: f64,
    pub total_waves: u32,
    pub wave_base_enemies: u32,
    pub wave_enemies_growth: u32,
    pub wave_health_growth: f64,
    pub wave_spawn_interval: f64,
    pub enemy_base_health: f64,
    pub enemy_speed: f64,
    pub enemy_bounty: i64,
    pub leak_cap: u32,
    pub idle_threat_per_sector: f64,
    pub idle_threat_growth_per_second: f64,
    pub idle_grace_seconds: f64,
    pub base_hash_per_second: f64,
    pub overclock_duration_seconds: f64,
    pub overclock_hash_multiplier: f64,
    pub overclock_spawn_multiplier: f64,
    pub zero_day_chance_per_second: f64,
    /// Efficiency percentage drained per second while a Zero-Day is active.
    pub zero_day_drain_per_second: f64,
    pub zero_day_hash_bonus: i64,
    pub zero_day_restore_leaks: u32,
    pub zero_day_fail_leak_penalty: u32,
    pub flush_cost_floor: i64,
    /// Leak counter value after a Flush Memory recovery (50% efficiency).
    pub flush_restore_leak_counter: u32,
    pub boss_threat_threshold: f64,
    pub boss_threat_step: f64,
    pub boss_approach_seconds: f64,
    pub boss_leak_penalty: u32,
}

impl Constants {
    /// Fixed escalating placement cost table.
    pub fn placement_cost(&self, rarity: Rarity) -> i64 {
        match rarity {
            Rarity::Common => self.tower_cost_common,
            Rarity::Rare => self.tower_cost_rare,
            Rarity::Epic => self.tower_cost_epic,
            Rarity::Legendary => self.tower_cost_legendary,
        }
    }
}
