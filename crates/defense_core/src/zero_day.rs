//! Zero-Day events: a random breach that drains efficiency until the player
//! resolves the override challenge.
//!
//! At most one Zero-Day at a time, and never while a boss is on the field.

use rand::Rng;

use crate::errors::CommandError;
use crate::freeze::add_leaks;
use crate::types::{
    Event, EventEnvelope, FightOutcome, GameContent, GameState, ZeroDayState,
};

/// Percentage of efficiency represented by one leak unit.
const EFFICIENCY_PER_LEAK: f64 = 5.0;

/// Advance the active Zero-Day drain, then roll for a new trigger.
pub(crate) fn advance_zero_day(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    let constants = &content.constants;

    if let Some(zero_day) = &mut state.zero_day {
        // Drain accumulates fractionally; only whole leak units transfer to
        // the counter so efficiency keeps a single source of truth.
        zero_day.drain_accum +=
            constants.zero_day_drain_per_second * constants.tick_seconds / EFFICIENCY_PER_LEAK;
        if zero_day.drain_accum >= 1.0 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let whole = zero_day.drain_accum.floor() as u32;
            zero_day.drain_accum -= zero_day.drain_accum.floor();
            add_leaks(state, content, whole, events);
        }
        return;
    }

    // No concurrent crises: a boss on the field suppresses new Zero-Days.
    if state.boss_active() {
        return;
    }
    let chance = constants.zero_day_chance_per_second * constants.tick_seconds;
    if rng.gen::<f64>() < chance {
        state.zero_day = Some(ZeroDayState { drain_accum: 0.0 });
        events.push(crate::emit(
            &mut state.counters,
            state.meta.tick,
            Event::ZeroDayTriggered,
        ));
    }
}

/// Resolve the override challenge. Only victory clears the event: it pays a
/// hash bonus and repairs leaks. Defeat adds a leak penalty and fleeing does
/// nothing; both leave the breach active for another attempt.
pub(crate) fn resolve_zero_day(
    state: &mut GameState,
    content: &GameContent,
    outcome: FightOutcome,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    if state.zero_day.is_none() {
        return Err(CommandError::NoZeroDayActive);
    }
    let constants = &content.constants;

    match outcome {
        FightOutcome::Victory => {
            state.zero_day = None;
            crate::economy::earn(state, constants.zero_day_hash_bonus);
            state.leak_counter = state
                .leak_counter
                .saturating_sub(constants.zero_day_restore_leaks);
        }
        FightOutcome::Defeat => {
            add_leaks(state, content, constants.zero_day_fail_leak_penalty, events);
        }
        FightOutcome::Fled => {}
    }

    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::ZeroDayResolved { outcome },
    ));
    Ok(())
}
