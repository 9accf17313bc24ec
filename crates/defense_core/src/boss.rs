//! Boss lifecycle: threat-triggered spawn, approach, engagement, resolution,
//! and two-phase loot collection.
//!
//! At most one boss exists at a time. Loot from a victory is computed
//! immediately but only committed to the ledger and profile deltas when the
//! player collects it, so a dropped session cannot double-pay.

use rand::Rng;

use crate::errors::CommandError;
use crate::freeze::add_leaks;
use crate::sectors::grant_sector;
use crate::types::{
    BossDifficulty, BossLoot, BossState, Event, EventEnvelope, FightOutcome, GameContent,
    GameState, ProfileDelta,
};

/// Threat level at which the next boss appears; each defeated or expired
/// boss raises the bar.
fn spawn_threshold(state: &GameState, content: &GameContent) -> f64 {
    content.constants.boss_threat_threshold
        + content.constants.boss_threat_step * f64::from(state.bosses_spawned)
}

/// Advance the boss on the field and spawn a new one when threat warrants.
pub(crate) fn advance_boss(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) {
    if let Some(boss) = &mut state.boss {
        if boss.engaged {
            return;
        }
        boss.approach_ticks_left = boss.approach_ticks_left.saturating_sub(1);
        if boss.approach_ticks_left > 0 {
            return;
        }
        let boss_id = boss.boss_id.clone();
        state.boss = None;
        let penalty = content.constants.boss_leak_penalty;
        let counter_after = (state.leak_counter + penalty).min(content.constants.leak_cap);
        events.push(crate::emit(
            &mut state.counters,
            state.meta.tick,
            Event::BossReachedCore {
                boss_id,
                leak_counter: counter_after,
            },
        ));
        add_leaks(state, content, penalty, events);
        return;
    }

    // No concurrent crises, and no boss while the system is overclocked.
    if state.zero_day_active() || state.overclock_active() {
        return;
    }
    if state.idle_threat_level < spawn_threshold(state, content) {
        return;
    }
    let Some(district) = pick_district(state, content) else {
        return;
    };
    let Some(sector_def) = content.sector(&district) else {
        return;
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let approach_ticks = (content.constants.boss_approach_seconds
        / content.constants.tick_seconds)
        .ceil() as u64;

    let boss = BossState {
        boss_id: sector_def.boss.id.clone(),
        kind: sector_def.boss.kind.clone(),
        district: district.clone(),
        engaged: false,
        difficulty: None,
        approach_ticks_left: approach_ticks.max(1),
    };
    state.bosses_spawned += 1;
    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::BossSpawned {
            boss_id: boss.boss_id.clone(),
            district,
            kind: boss.kind.clone(),
        },
    ));
    state.boss = Some(boss);
}

/// First unlocked district whose boss is undefeated, in map order; falls
/// back to the first unlocked district once every boss has been beaten.
fn pick_district(state: &GameState, content: &GameContent) -> Option<crate::types::SectorId> {
    let unlocked = content
        .map
        .sectors
        .iter()
        .filter(|s| state.unlocked_sectors.contains(&s.id));
    unlocked
        .clone()
        .find(|s| !state.defeated_bosses.contains(&s.boss.id))
        .or_else(|| unlocked.clone().next())
        .map(|s| s.id.clone())
}

pub(crate) fn engage_boss(
    state: &mut GameState,
    difficulty: BossDifficulty,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    let Some(boss) = &mut state.boss else {
        return Err(CommandError::NoBossActive);
    };
    if boss.engaged {
        return Err(CommandError::AlreadyEngaged);
    }
    boss.engaged = true;
    boss.difficulty = Some(difficulty);
    let boss_id = boss.boss_id.clone();

    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::BossEngaged { boss_id, difficulty },
    ));
    Ok(())
}

/// Report the result of the engaged boss fight.
///
/// Victory clears the boss and stages loot for collection. Defeat and
/// fleeing put the boss back on approach, unengaged.
pub(crate) fn resolve_boss_fight(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut impl Rng,
    outcome: FightOutcome,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    let Some(boss) = &state.boss else {
        return Err(CommandError::NoBossActive);
    };
    if !boss.engaged {
        return Err(CommandError::NotEngaged);
    }
    let Some(difficulty) = boss.difficulty else {
        return Err(CommandError::NotEngaged);
    };
    let boss_id = boss.boss_id.clone();

    match outcome {
        FightOutcome::Victory => {
            let params = difficulty.params();
            let blueprint = content
                .sector(&boss.district)
                .and_then(|s| s.boss.blueprint.clone())
                .filter(|_| rng.gen::<f64>() < params.blueprint_chance);
            state.pending_loot = Some(BossLoot {
                boss_id: boss_id.clone(),
                difficulty,
                hash_reward: params.hash_reward,
                blueprint,
                first_defeat: !state.defeated_bosses.contains(&boss_id),
            });
            state.boss = None;
        }
        FightOutcome::Defeat | FightOutcome::Fled => {
            if let Some(boss) = &mut state.boss {
                boss.engaged = false;
                boss.difficulty = None;
            }
        }
    }

    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::BossFightResolved { boss_id, outcome },
    ));
    Ok(())
}

/// Commit staged loot: hash, blueprint, first-defeat record, and any sector
/// gate the boss was holding shut. Idempotent — the loot slot empties on the
/// first collect.
pub(crate) fn collect_boss_reward(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    let Some(loot) = state.pending_loot.take() else {
        return Err(CommandError::NothingToCollect);
    };

    crate::economy::earn(state, loot.hash_reward);
    if let Some(blueprint) = &loot.blueprint {
        state
            .profile_deltas
            .push(ProfileDelta::BlueprintEarned(blueprint.clone()));
    }
    if loot.first_defeat {
        state.defeated_bosses.insert(loot.boss_id.clone());
        state
            .profile_deltas
            .push(ProfileDelta::BossDefeated(loot.boss_id.clone()));

        let gated = content
            .map
            .sectors
            .iter()
            .find(|s| s.boss.id == loot.boss_id)
            .and_then(|s| s.boss.unlocks_sector.clone());
        if let Some(sector) = gated {
            grant_sector(state, &sector, events);
        }
    }

    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::BossRewardCollected {
            boss_id: loot.boss_id,
            hash_reward: loot.hash_reward,
            blueprint: loot.blueprint,
        },
    ));
    Ok(())
}
