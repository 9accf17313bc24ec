//! Overclock: a timed buff that doubles hash production and speeds up
//! spawning. One at a time, and never while a boss is on the field.

use crate::errors::CommandError;
use crate::types::{Event, EventEnvelope, GameContent, GameState, OverclockState};

pub(crate) fn activate_overclock(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    if state.overclock_active() || state.boss_active() {
        return Err(CommandError::OverclockUnavailable);
    }
    let duration = content.constants.overclock_duration_seconds;
    state.overclock = Some(OverclockState {
        time_remaining: duration,
    });
    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::OverclockActivated { duration },
    ));
    Ok(())
}

/// Count down the active overclock; expires exactly when the timer runs out.
pub(crate) fn advance_overclock(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) {
    let Some(overclock) = &mut state.overclock else {
        return;
    };
    overclock.time_remaining -= content.constants.tick_seconds;
    if overclock.time_remaining > 0.0 {
        return;
    }
    state.overclock = None;
    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::OverclockExpired,
    ));
}
