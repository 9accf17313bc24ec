//! Combat resolution: towers deal damage, enemies advance, leaks accrue.

use smallvec::SmallVec;

use crate::freeze::add_leaks;
use crate::types::{
    EnemyId, Event, EventEnvelope, EventLevel, GameContent, GameState, TowerId,
};

/// Each tower spends its per-tick damage budget on the enemy closest to the
/// core within range of its lane position. Breach enemies are untargetable
/// only while the Zero-Day that carried them in is still active.
pub(crate) fn resolve_tower_fire(
    state: &mut GameState,
    content: &GameContent,
    event_level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) {
    let dt = content.constants.tick_seconds;
    let breach_shielded = state.zero_day_active();
    let mut killed: SmallVec<[(EnemyId, TowerId, i64); 8]> = SmallVec::new();

    for tower in &state.towers {
        let budget = tower.dps() * dt;

        let target = state
            .enemies
            .iter_mut()
            .filter(|e| {
                e.sector == tower.sector
                    && !(e.breach && breach_shielded)
                    && e.health > 0.0
                    && (e.distance_to_core - tower.lane_position).abs() <= tower.range
            })
            .min_by(|a, b| {
                a.distance_to_core
                    .partial_cmp(&b.distance_to_core)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        if let Some(enemy) = target {
            enemy.health -= budget;
            if enemy.health <= 0.0 {
                killed.push((enemy.id.clone(), tower.id.clone(), enemy.bounty));
            }
        }
    }

    for (enemy_id, tower_id, bounty) in killed {
        state.enemies.retain(|e| e.id != enemy_id);
        crate::economy::earn(state, bounty);
        state.stats.enemies_killed += 1;

        if event_level == EventLevel::Debug {
            events.push(crate::emit(
                &mut state.counters,
                state.meta.tick,
                Event::EnemyKilled {
                    enemy_id,
                    tower_id,
                    bounty,
                },
            ));
        }
    }
}

/// Move every enemy toward the core; each arrival removes the enemy and
/// charges one leak.
pub(crate) fn advance_enemies(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) {
    let dt = content.constants.tick_seconds;
    let mut leaked: SmallVec<[EnemyId; 8]> = SmallVec::new();

    for enemy in &mut state.enemies {
        enemy.distance_to_core -= enemy.speed * dt;
        if enemy.distance_to_core <= 0.0 {
            leaked.push(enemy.id.clone());
        }
    }

    for enemy_id in leaked {
        state.enemies.retain(|e| e.id != enemy_id);
        add_leaks(state, content, 1, events);

        // Carries the post-leak counter.
        let leak_counter = state.leak_counter;
        let efficiency = state.efficiency();
        events.push(crate::emit(
            &mut state.counters,
            state.meta.tick,
            Event::EnemyLeaked {
                enemy_id,
                leak_counter,
                efficiency,
            },
        ));
    }
}
