use rand::Rng;

use crate::types::{CommandEnvelope, Event, EventLevel, GameContent, GameState, ProfileDelta};

/// Advance the simulation by one tick.
///
/// Order of operations:
/// 1. Apply commands scheduled for this tick.
/// 2. Skip the world while frozen or after victory (commands still apply,
///    so recovery and reward collection keep working).
/// 3. Count down the overclock buff.
/// 4. Produce passive hash income.
/// 5. Spawn wave and idle threats.
/// 6. Resolve tower fire.
/// 7. Advance enemies; charge leaks for arrivals.
/// 8. Advance the Zero-Day drain and boss approach; roll new triggers.
/// 9. Check campaign victory: every wave completed and the field clear.
/// 10. Increment tick counter.
///
/// Returns all events produced this tick.
pub fn tick(
    state: &mut GameState,
    commands: &[CommandEnvelope],
    content: &GameContent,
    rng: &mut impl Rng,
    event_level: EventLevel,
) -> Vec<crate::EventEnvelope> {
    let mut events = Vec::new();

    crate::commands::apply_commands(state, commands, content, rng, &mut events);

    if state.frozen || state.victory {
        state.meta.tick += 1;
        return events;
    }

    crate::overclock::advance_overclock(state, content, &mut events);
    crate::economy::produce_hash(state, content, event_level, &mut events);
    crate::spawner::advance_waves(state, content, event_level, &mut events);
    crate::spawner::advance_idle_threat(state, content, event_level, &mut events);
    crate::combat::resolve_tower_fire(state, content, event_level, &mut events);
    crate::combat::advance_enemies(state, content, &mut events);
    crate::zero_day::advance_zero_day(state, content, rng, &mut events);
    crate::boss::advance_boss(state, content, &mut events);

    if !state.victory
        && state.waves_completed >= content.constants.total_waves
        && state.enemies.is_empty()
    {
        state.victory = true;
        // The session balance carries into the profile once the campaign ends.
        state.profile_deltas.push(ProfileDelta::HashBanked(state.hash));
        events.push(crate::emit(&mut state.counters, state.meta.tick, Event::Victory));
    }

    state.meta.tick += 1;
    events
}
