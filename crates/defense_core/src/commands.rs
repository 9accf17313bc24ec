//! Command application: validate-then-commit.
//!
//! Every command either succeeds atomically or rejects with no state change;
//! rejections surface as `CommandRejected` events rather than errors so a
//! stale client cannot wedge the tick loop.

use rand::Rng;

use crate::errors::CommandError;
use crate::types::{Command, CommandEnvelope, Event, EventEnvelope, GameContent, GameState};

pub(crate) fn apply_commands(
    state: &mut GameState,
    commands: &[CommandEnvelope],
    content: &GameContent,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    let current_tick = state.meta.tick;

    for envelope in commands {
        if envelope.execute_at_tick != current_tick {
            continue;
        }
        let result = if state.frozen && !envelope.command.allowed_while_frozen() {
            Err(CommandError::SystemFrozen)
        } else {
            apply_command(state, content, rng, &envelope.command, events)
        };

        if let Err(err) = result {
            events.push(crate::emit(
                &mut state.counters,
                current_tick,
                Event::CommandRejected {
                    command: envelope.command.label().to_string(),
                    reason: err.to_string(),
                },
            ));
        }
    }
}

fn apply_command(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut impl Rng,
    command: &Command,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    match command {
        Command::PlaceTower { weapon, slot } => {
            crate::towers::place_tower(state, content, weapon, slot, events)
        }
        Command::UpgradeTower { tower } => {
            crate::towers::upgrade_tower(state, content, tower, events)
        }
        Command::SellTower { tower } => crate::towers::sell_tower(state, content, tower, events),
        Command::MergeTowers { kept, consumed } => {
            crate::towers::merge_towers(state, content, kept, consumed, events)
        }
        Command::ActivateOverclock => crate::overclock::activate_overclock(state, content, events),
        Command::UnlockSector { sector } => {
            crate::sectors::unlock_sector(state, content, sector, events)
        }
        Command::ToggleSectorPause { sector } => {
            crate::sectors::toggle_sector_pause(state, content, sector, events)
        }
        Command::EngageBoss { difficulty } => crate::boss::engage_boss(state, *difficulty, events),
        Command::ResolveBossFight { outcome } => {
            crate::boss::resolve_boss_fight(state, content, rng, *outcome, events)
        }
        Command::CollectBossReward => crate::boss::collect_boss_reward(state, content, events),
        Command::ResolveZeroDayOverride { outcome } => {
            crate::zero_day::resolve_zero_day(state, content, *outcome, events)
        }
        Command::FlushMemory => crate::freeze::flush_memory(state, content, events),
        Command::ResolveManualOverride { outcome } => {
            crate::freeze::resolve_manual_override(state, *outcome, events)
        }
    }
}
