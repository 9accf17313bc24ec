//! Leak accounting, the System Freeze edge, and the two recovery paths.
//!
//! `leak_counter` only changes through [`add_leaks`] and the recovery
//! functions, which keeps the freeze transition edge-triggered: the
//! `SystemFrozen` event fires exactly once per freeze.

use crate::errors::CommandError;
use crate::types::{
    Event, EventEnvelope, FightOutcome, GameContent, GameState, RecoveryPath,
};

/// Raise the leak counter by `count`, clamped to the cap, freezing the
/// system when efficiency bottoms out.
pub(crate) fn add_leaks(
    state: &mut GameState,
    content: &GameContent,
    count: u32,
    events: &mut Vec<EventEnvelope>,
) {
    if count == 0 {
        return;
    }
    let cap = content.constants.leak_cap;
    state.leak_counter = (state.leak_counter + count).min(cap);

    if state.leak_counter >= cap && !state.frozen {
        state.frozen = true;
        events.push(crate::emit(
            &mut state.counters,
            state.meta.tick,
            Event::SystemFrozen {
                leak_counter: state.leak_counter,
            },
        ));
    }
}

/// Flush Memory recovery: pay hash to restore the system at half efficiency.
///
/// Cost is the larger of the content floor and 10% of the current balance,
/// so the price stays meaningful for rich sessions.
pub(crate) fn flush_memory(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    if !state.frozen {
        return Err(CommandError::NotFrozen);
    }
    let cost = content.constants.flush_cost_floor.max(state.hash / 10);
    crate::economy::spend(state, cost)?;

    state.leak_counter = content.constants.flush_restore_leak_counter;
    state.frozen = false;
    let efficiency = state.efficiency();
    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::SystemRestored {
            path: RecoveryPath::FlushMemory,
            efficiency,
        },
    ));
    Ok(())
}

/// Manual Override recovery: report the result of the external override
/// challenge. Victory restores full efficiency; anything else leaves the
/// system frozen.
pub(crate) fn resolve_manual_override(
    state: &mut GameState,
    outcome: FightOutcome,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    if !state.frozen {
        return Err(CommandError::NotFrozen);
    }
    if outcome != FightOutcome::Victory {
        return Ok(());
    }
    state.leak_counter = 0;
    state.frozen = false;
    let efficiency = state.efficiency();
    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::SystemRestored {
            path: RecoveryPath::ManualOverride,
            efficiency,
        },
    ));
    Ok(())
}
