//! Tower lifecycle: placement, upgrades, selling, and merging.
//!
//! All four operations validate fully before touching state. Placement and
//! merging reserve/release power draw against the shared capacity pool.

use crate::economy::{earn, spend};
use crate::errors::CommandError;
use crate::types::{
    Constants, Event, EventEnvelope, GameContent, GameState, SlotId, TowerId, TowerState,
    WeaponDef, WeaponTypeId, MAX_MERGE_LEVEL,
};

/// Derived combat stats for a weapon at the given level and merge tier.
///
/// Level scales damage, range, and attack speed along the weapon's growth
/// curves. Merge tier multiplies damage only.
pub fn tower_stats(
    def: &WeaponDef,
    level: u8,
    merge_level: u8,
    constants: &Constants,
) -> (f64, f64, f64) {
    let level_steps = f64::from(level.saturating_sub(1));
    let merge_factor = 1.0 + constants.merge_damage_bonus * f64::from(merge_level);

    let damage = def.damage * (1.0 + def.damage_growth_per_level * level_steps) * merge_factor;
    let range = def.range * (1.0 + def.range_growth_per_level * level_steps);
    let attack_speed = def.attack_speed * (1.0 + def.speed_growth_per_level * level_steps);
    (damage, range, attack_speed)
}

/// Upgrade cost scales linearly with the level being purchased.
pub fn upgrade_cost(def: &WeaponDef, current_level: u8) -> i64 {
    def.base_upgrade_cost * i64::from(current_level)
}

/// Total hash sunk into a tower: placement plus every purchased upgrade.
fn invested_hash(def: &WeaponDef, level: u8, constants: &Constants) -> i64 {
    let upgrades: i64 = (1..level).map(|l| upgrade_cost(def, l)).sum();
    constants.placement_cost(def.rarity) + upgrades
}

fn apply_stats(tower: &mut TowerState, def: &WeaponDef, constants: &Constants) {
    let (damage, range, attack_speed) =
        tower_stats(def, tower.level, tower.merge_level, constants);
    tower.damage = damage;
    tower.range = range;
    tower.attack_speed = attack_speed;
}

pub(crate) fn place_tower(
    state: &mut GameState,
    content: &GameContent,
    weapon: &WeaponTypeId,
    slot_id: &SlotId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    let def = content
        .weapon(weapon)
        .ok_or_else(|| CommandError::UnknownWeapon(weapon.clone()))?;
    if !state.loadout.contains(weapon) {
        return Err(CommandError::WeaponNotInLoadout(weapon.clone()));
    }

    let slot = state
        .slots
        .iter()
        .find(|s| &s.id == slot_id)
        .ok_or_else(|| CommandError::SlotNotFound(slot_id.clone()))?;
    if slot.occupied {
        return Err(CommandError::SlotOccupied(slot_id.clone()));
    }
    if !state.unlocked_sectors.contains(&slot.sector) {
        return Err(CommandError::SectorLocked(slot.sector.clone()));
    }
    let sector = slot.sector.clone();
    let lane_position = slot.lane_position;

    let free_power = state.power_capacity - state.power_used;
    if def.power_draw > free_power {
        return Err(CommandError::InsufficientPower {
            required: def.power_draw,
            available: free_power,
        });
    }

    spend(state, content.constants.placement_cost(def.rarity))?;
    state.power_used += def.power_draw;

    let tower_id = TowerId(format!("tower_{:04}", state.counters.next_tower_id));
    state.counters.next_tower_id += 1;

    let mut tower = TowerState {
        id: tower_id.clone(),
        weapon: weapon.clone(),
        slot: slot_id.clone(),
        sector,
        lane_position,
        level: 1,
        merge_level: 0,
        damage: 0.0,
        range: 0.0,
        attack_speed: 0.0,
    };
    apply_stats(&mut tower, def, &content.constants);
    state.towers.push(tower);
    state.stats.towers_placed += 1;

    if let Some(slot) = state.slots.iter_mut().find(|s| &s.id == slot_id) {
        slot.occupied = true;
    }

    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::TowerPlaced {
            tower_id,
            weapon: weapon.clone(),
            slot: slot_id.clone(),
        },
    ));
    Ok(())
}

pub(crate) fn upgrade_tower(
    state: &mut GameState,
    content: &GameContent,
    tower_id: &TowerId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    let tower = state
        .towers
        .iter()
        .find(|t| &t.id == tower_id)
        .ok_or_else(|| CommandError::TowerNotFound(tower_id.clone()))?;
    if !tower.can_upgrade() {
        return Err(CommandError::MaxLevelReached(tower_id.clone()));
    }
    let def = content
        .weapon(&tower.weapon)
        .ok_or_else(|| CommandError::UnknownWeapon(tower.weapon.clone()))?;
    let cost = upgrade_cost(def, tower.level);

    spend(state, cost)?;

    let mut new_level = 0;
    if let Some(tower) = state.towers.iter_mut().find(|t| &t.id == tower_id) {
        tower.level += 1;
        new_level = tower.level;
        apply_stats(tower, def, &content.constants);
    }

    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::TowerUpgraded {
            tower_id: tower_id.clone(),
            level: new_level,
        },
    ));
    Ok(())
}

pub(crate) fn sell_tower(
    state: &mut GameState,
    content: &GameContent,
    tower_id: &TowerId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    let index = state
        .towers
        .iter()
        .position(|t| &t.id == tower_id)
        .ok_or_else(|| CommandError::TowerNotFound(tower_id.clone()))?;
    let tower = state.towers.remove(index);

    let refund = content.weapon(&tower.weapon).map_or(0, |def| {
        let invested = invested_hash(def, tower.level, &content.constants);
        #[allow(clippy::cast_possible_truncation)]
        let refund = (invested as f64 * content.constants.sell_refund_fraction).floor() as i64;
        state.power_used = state.power_used.saturating_sub(def.power_draw);
        refund
    });
    earn(state, refund);

    if let Some(slot) = state.slots.iter_mut().find(|s| s.id == tower.slot) {
        slot.occupied = false;
    }

    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::TowerSold {
            tower_id: tower_id.clone(),
            refund,
        },
    ));
    Ok(())
}

/// Merge `consumed` into `kept`: same weapon, same level, same merge tier.
/// The consumed tower's slot and power draw are released.
pub(crate) fn merge_towers(
    state: &mut GameState,
    content: &GameContent,
    kept_id: &TowerId,
    consumed_id: &TowerId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    if kept_id == consumed_id {
        return Err(CommandError::MergeMismatch(
            "a tower cannot merge with itself".to_string(),
        ));
    }
    let kept = state
        .towers
        .iter()
        .find(|t| &t.id == kept_id)
        .ok_or_else(|| CommandError::TowerNotFound(kept_id.clone()))?;
    let consumed = state
        .towers
        .iter()
        .find(|t| &t.id == consumed_id)
        .ok_or_else(|| CommandError::TowerNotFound(consumed_id.clone()))?;

    if kept.weapon != consumed.weapon {
        return Err(CommandError::MergeMismatch(
            "weapon types differ".to_string(),
        ));
    }
    if kept.level != consumed.level || kept.merge_level != consumed.merge_level {
        return Err(CommandError::MergeMismatch(
            "levels and merge tiers must match".to_string(),
        ));
    }
    if kept.merge_level >= MAX_MERGE_LEVEL {
        return Err(CommandError::MergeMismatch(
            "kept tower is at max merge tier".to_string(),
        ));
    }
    let def = content
        .weapon(&kept.weapon)
        .ok_or_else(|| CommandError::UnknownWeapon(kept.weapon.clone()))?;

    // Validation done; commit.
    let consumed_index = state
        .towers
        .iter()
        .position(|t| &t.id == consumed_id)
        .ok_or_else(|| CommandError::TowerNotFound(consumed_id.clone()))?;
    let consumed = state.towers.remove(consumed_index);
    state.power_used = state.power_used.saturating_sub(def.power_draw);
    if let Some(slot) = state.slots.iter_mut().find(|s| s.id == consumed.slot) {
        slot.occupied = false;
    }

    let mut merge_level = 0;
    if let Some(kept) = state.towers.iter_mut().find(|t| &t.id == kept_id) {
        kept.merge_level += 1;
        merge_level = kept.merge_level;
        apply_stats(kept, def, &content.constants);
    }

    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::TowersMerged {
            kept: kept_id.clone(),
            consumed: consumed_id.clone(),
            merge_level,
        },
    ));
    Ok(())
}
