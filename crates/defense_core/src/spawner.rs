//! Threat spawning: the scripted wave campaign plus the open-ended idle
//! pressure that scales with unlocked territory.

use crate::sectors::active_sectors;
use crate::types::{
    Constants, EnemyId, EnemyState, Event, EventEnvelope, EventLevel, GameContent, GameState,
    SectorId, WavePlan,
};

/// Build the full wave schedule from content constants. Enemy count grows
/// linearly, health compounds.
pub fn wave_schedule(constants: &Constants) -> Vec<WavePlan> {
    (0..constants.total_waves)
        .map(|wave| WavePlan {
            enemies: constants.wave_base_enemies + constants.wave_enemies_growth * wave,
            health_multiplier: (1.0 + constants.wave_health_growth).powi(wave as i32),
            spawn_interval: constants.wave_spawn_interval,
        })
        .collect()
}

fn spawn_enemy(
    state: &mut GameState,
    sector: SectorId,
    lane_length: f64,
    health: f64,
    constants: &Constants,
    wave_member: bool,
    event_level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) {
    let id = EnemyId(format!("enemy_{:04}", state.counters.next_enemy_id));
    state.counters.next_enemy_id += 1;

    // Breach processes ride in on an active Zero-Day and ignore towers.
    let breach = state.zero_day_active();
    state.enemies.push(EnemyState {
        id: id.clone(),
        sector: sector.clone(),
        distance_to_core: lane_length,
        health,
        speed: constants.enemy_speed,
        bounty: constants.enemy_bounty,
        wave_member,
        breach,
    });

    if event_level == EventLevel::Debug {
        events.push(crate::emit(
            &mut state.counters,
            state.meta.tick,
            Event::EnemySpawned {
                enemy_id: id,
                sector,
                wave_member,
                breach,
            },
        ));
    }
}

/// Advance the scripted wave campaign. Waves spawn into the starter sector
/// on a fixed interval; a wave completes once every member is off the field.
pub(crate) fn advance_waves(
    state: &mut GameState,
    content: &GameContent,
    event_level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) {
    let constants = &content.constants;
    let wave_index = state.waves_completed as usize;
    let Some(plan) = state.wave.schedule.get(wave_index).cloned() else {
        return;
    };
    let Some(starter) = content.map.sectors.iter().find(|s| s.starter) else {
        return;
    };
    let starter_id = starter.id.clone();
    let lane_length = starter.lane_length;

    if state.wave.spawned_in_wave < plan.enemies {
        state.wave.spawn_timer += constants.tick_seconds;
        while state.wave.spawn_timer >= plan.spawn_interval
            && state.wave.spawned_in_wave < plan.enemies
        {
            state.wave.spawn_timer -= plan.spawn_interval;
            if state.wave.spawned_in_wave == 0 {
                let wave = state.current_wave();
                events.push(crate::emit(
                    &mut state.counters,
                    state.meta.tick,
                    Event::WaveStarted { wave },
                ));
            }
            state.wave.spawned_in_wave += 1;
            spawn_enemy(
                state,
                starter_id.clone(),
                lane_length,
                constants.enemy_base_health * plan.health_multiplier,
                constants,
                true,
                event_level,
                events,
            );
        }
        return;
    }

    // Fully spawned; the wave ends when the field is clear of its members.
    if state.enemies.iter().any(|e| e.wave_member) {
        return;
    }
    let completed = state.current_wave();
    state.waves_completed += 1;
    state.wave.spawned_in_wave = 0;
    state.wave.spawn_timer = 0.0;
    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::WaveCompleted { wave: completed },
    ));
}

/// Advance idle threat pressure and its spawn accumulator.
///
/// The threat level ratchets: it never drops when sectors are paused, and it
/// creeps upward over time. One enemy spawns per whole unit of accumulated
/// pressure, rotated across active sectors.
pub(crate) fn advance_idle_threat(
    state: &mut GameState,
    content: &GameContent,
    event_level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) {
    let constants = &content.constants;
    let active = active_sectors(state, content);

    let floor = constants.idle_threat_per_sector * active.len() as f64;
    state.idle_threat_level = state.idle_threat_level.max(floor);
    state.idle_threat_level += constants.idle_threat_growth_per_second * constants.tick_seconds;

    // The grace period ends with the first tower; until then the accumulator
    // stays parked below zero.
    if state.stats.towers_placed == 0 || active.is_empty() {
        return;
    }

    let spawn_factor = if state.overclock_active() {
        constants.overclock_spawn_multiplier
    } else {
        1.0
    };
    state.idle_spawn_timer +=
        state.idle_threat_level * spawn_factor * constants.tick_seconds;

    while state.idle_spawn_timer >= 1.0 {
        state.idle_spawn_timer -= 1.0;
        let sector_id = active[(state.counters.next_enemy_id as usize) % active.len()].clone();
        let Some(sector) = content.sector(&sector_id) else {
            continue;
        };
        let lane_length = sector.lane_length;
        spawn_enemy(
            state,
            sector_id,
            lane_length,
            constants.enemy_base_health,
            constants,
            false,
            event_level,
            events,
        );
    }
}
