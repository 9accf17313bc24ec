use defense_core::{
    sector_unlock_status, upgrade_cost, BossDifficulty, Command, CommandEnvelope, CommandId,
    FightOutcome, GameContent, GameState, SectorId, SlotId, TowerId, TowerState, UnlockStatus,
    WeaponDef, MAX_MERGE_LEVEL, MAX_TOWER_LEVEL,
};

pub trait CommandSource {
    fn generate_commands(
        &mut self,
        state: &GameState,
        content: &GameContent,
        next_command_id: &mut u64,
    ) -> Vec<CommandEnvelope>;
}

/// Drives a session automatically:
/// 1. Recover from a System Freeze (flush when affordable, override otherwise).
/// 2. Collect pending boss loot and resolve open fights.
/// 3. Fill empty slots with the cheapest loadout weapon.
/// 4. Merge fully leveled twins, upgrade the weakest tower, buy new sectors.
///
/// Set-piece fights have no headless representation, so the controller
/// reports them as won.
pub struct AutoDefender;

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Allocates a command ID and builds a `CommandEnvelope`.
fn make_cmd(tick: u64, next_id: &mut u64, command: Command) -> CommandEnvelope {
    let cmd_id = CommandId(format!("cmd_{:06}", *next_id));
    *next_id += 1;
    CommandEnvelope {
        id: cmd_id,
        issued_tick: tick,
        execute_at_tick: tick,
        command,
    }
}

/// Flush costs `max(floor, hash / 10)`, so it is affordable exactly when the
/// balance covers the floor. Below that the only way out is the override.
fn recovery_command(state: &GameState, content: &GameContent) -> Command {
    if state.hash >= content.constants.flush_cost_floor {
        Command::FlushMemory
    } else {
        Command::ResolveManualOverride {
            outcome: FightOutcome::Victory,
        }
    }
}

/// First open slot in an unlocked, unpaused sector, in map order for
/// determinism.
fn first_open_slot(state: &GameState, content: &GameContent) -> Option<SlotId> {
    content.map.slots.iter().find_map(|slot_def| {
        let active = state.unlocked_sectors.contains(&slot_def.sector)
            && !state.paused_sectors.contains(&slot_def.sector);
        let open = state
            .slots
            .iter()
            .any(|s| s.id == slot_def.id && !s.occupied);
        (active && open).then(|| slot_def.id.clone())
    })
}

/// Cheapest loadout weapon that fits the budget and the free power headroom.
fn cheapest_weapon<'a>(
    state: &GameState,
    content: &'a GameContent,
    budget: i64,
) -> Option<&'a WeaponDef> {
    let free_power = state.power_capacity.saturating_sub(state.power_used);
    content
        .weapons
        .iter()
        .filter(|def| state.loadout.contains(&def.id))
        .filter(|def| def.power_draw <= free_power)
        .filter(|def| content.constants.placement_cost(def.rarity) <= budget)
        .min_by_key(|def| content.constants.placement_cost(def.rarity))
}

/// Lowest-level tower with an affordable upgrade, tie-broken by ID.
fn best_upgrade(state: &GameState, content: &GameContent, budget: i64) -> Option<TowerId> {
    state
        .towers
        .iter()
        .filter(|t| t.can_upgrade())
        .filter(|t| {
            content
                .weapon(&t.weapon)
                .is_some_and(|def| upgrade_cost(def, t.level) <= budget)
        })
        .min_by(|a, b| (a.level, &a.id.0).cmp(&(b.level, &b.id.0)))
        .map(|t| t.id.clone())
}

/// A pair of fully leveled twins ready to merge, as `(kept, consumed)`.
/// Merging frees the consumed slot and its power draw.
fn merge_pair(state: &GameState) -> Option<(TowerId, TowerId)> {
    let mut maxed: Vec<&TowerState> = state
        .towers
        .iter()
        .filter(|t| t.level == MAX_TOWER_LEVEL && t.merge_level < MAX_MERGE_LEVEL)
        .collect();
    maxed.sort_by(|a, b| a.id.0.cmp(&b.id.0));
    for (i, kept) in maxed.iter().enumerate() {
        for consumed in &maxed[i + 1..] {
            if kept.weapon == consumed.weapon && kept.merge_level == consumed.merge_level {
                return Some((kept.id.clone(), consumed.id.clone()));
            }
        }
    }
    None
}

/// First purchasable sector within budget, in map order.
fn affordable_sector(state: &GameState, content: &GameContent, budget: i64) -> Option<SectorId> {
    content.map.sectors.iter().find_map(|sector| {
        match sector_unlock_status(state, content, &sector.id) {
            Ok(UnlockStatus::Purchasable { cost }) if cost <= budget => Some(sector.id.clone()),
            _ => None,
        }
    })
}

// ---------------------------------------------------------------------------
// AutoDefender
// ---------------------------------------------------------------------------

impl CommandSource for AutoDefender {
    fn generate_commands(
        &mut self,
        state: &GameState,
        content: &GameContent,
        next_command_id: &mut u64,
    ) -> Vec<CommandEnvelope> {
        let tick = state.meta.tick;
        let mut commands = Vec::new();

        if state.victory {
            return commands;
        }
        if state.frozen {
            commands.push(make_cmd(
                tick,
                next_command_id,
                recovery_command(state, content),
            ));
            return commands;
        }

        if state.pending_loot.is_some() {
            commands.push(make_cmd(tick, next_command_id, Command::CollectBossReward));
        }
        if let Some(boss) = &state.boss {
            let command = if boss.engaged {
                Command::ResolveBossFight {
                    outcome: FightOutcome::Victory,
                }
            } else {
                Command::EngageBoss {
                    difficulty: BossDifficulty::Easy,
                }
            };
            commands.push(make_cmd(tick, next_command_id, command));
        }
        if state.zero_day_active() {
            commands.push(make_cmd(
                tick,
                next_command_id,
                Command::ResolveZeroDayOverride {
                    outcome: FightOutcome::Victory,
                },
            ));
        }

        // Keep the flush fund intact so a freeze stays recoverable.
        let budget = state.hash - content.constants.flush_cost_floor;

        // One build action per tick. Commands validate against evolving state,
        // so stacking spends in a single tick only produces rejection noise.
        if let Some(slot) = first_open_slot(state, content) {
            // Save up for the open slot rather than upgrading past it.
            if let Some(def) = cheapest_weapon(state, content, budget) {
                commands.push(make_cmd(
                    tick,
                    next_command_id,
                    Command::PlaceTower {
                        weapon: def.id.clone(),
                        slot,
                    },
                ));
            }
        } else if let Some((kept, consumed)) = merge_pair(state) {
            commands.push(make_cmd(
                tick,
                next_command_id,
                Command::MergeTowers { kept, consumed },
            ));
        } else if let Some(tower) = best_upgrade(state, content, budget) {
            commands.push(make_cmd(
                tick,
                next_command_id,
                Command::UpgradeTower { tower },
            ));
        } else if let Some(sector) = affordable_sector(state, content, budget) {
            commands.push(make_cmd(
                tick,
                next_command_id,
                Command::UnlockSector { sector },
            ));
        }

        commands
    }
}
