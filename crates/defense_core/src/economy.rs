//! Hash ledger: passive production and atomic spends.
//!
//! `hash` never goes negative. Every debit checks the balance first and
//! fails without side effects; every credit flows through [`earn`] so the
//! session total stays consistent.

use crate::errors::CommandError;
use crate::types::{Event, EventEnvelope, EventLevel, GameContent, GameState};

/// Debit `amount` hash, or fail with no state change.
pub(crate) fn spend(state: &mut GameState, amount: i64) -> Result<(), CommandError> {
    if state.hash < amount {
        return Err(CommandError::InsufficientFunds {
            required: amount,
            available: state.hash,
        });
    }
    state.hash -= amount;
    Ok(())
}

/// Credit `amount` hash and count it toward session earnings.
pub(crate) fn earn(state: &mut GameState, amount: i64) {
    state.hash += amount;
    state.stats.hash_earned += amount;
}

/// Passive hash production for one tick.
///
/// Rate is `base_hash_per_second * sector_factor * production_multiplier *
/// efficiency%`, doubled (per content) while overclocked. Each unlocked
/// sector carries an equal share of the base rate and paused sectors forfeit
/// theirs, so the starter sector alone still produces at full rate.
/// Fractions accumulate across ticks; only whole hash units hit the ledger.
pub(crate) fn produce_hash(
    state: &mut GameState,
    content: &GameContent,
    event_level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) {
    let constants = &content.constants;
    let efficiency_factor = f64::from(state.efficiency()) / 100.0;
    let active = crate::sectors::active_sectors(state, content).len();
    let sector_factor = active as f64 / state.unlocked_sectors.len().max(1) as f64;
    let overclock_factor = if state.overclock_active() {
        constants.overclock_hash_multiplier
    } else {
        1.0
    };

    let per_second = constants.base_hash_per_second
        * sector_factor
        * state.production_multiplier
        * efficiency_factor
        * overclock_factor;
    state.production_accum += per_second * constants.tick_seconds;

    if state.production_accum < 1.0 {
        return;
    }

    #[allow(clippy::cast_possible_truncation)]
    let whole = state.production_accum.floor() as i64;
    state.production_accum -= state.production_accum.floor();
    earn(state, whole);

    if event_level == EventLevel::Debug {
        events.push(crate::emit(
            &mut state.counters,
            state.meta.tick,
            Event::HashProduced {
                amount: whole,
                balance_after: state.hash,
            },
        ));
    }
}
