use super::*;
use crate::test_fixtures::{base_content, base_state, make_rng, GATED_SECTOR, PURCHASABLE_SECTOR};

mod freeze;
mod integration;
mod sectors;
mod towers;

// --- Shared test helpers ------------------------------------------------

fn test_content() -> GameContent {
    base_content()
}

fn test_state(content: &GameContent) -> GameState {
    base_state(content)
}

fn cmd(state: &GameState, n: u64, command: Command) -> CommandEnvelope {
    CommandEnvelope {
        id: CommandId(format!("cmd_{n:06}")),
        issued_tick: state.meta.tick,
        execute_at_tick: state.meta.tick,
        command,
    }
}

fn place_cmd(state: &GameState, n: u64, weapon: &str, slot: &str) -> CommandEnvelope {
    cmd(
        state,
        n,
        Command::PlaceTower {
            weapon: WeaponTypeId(weapon.to_string()),
            slot: SlotId(slot.to_string()),
        },
    )
}

fn run_ticks(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut rand_chacha::ChaCha8Rng,
    n: u64,
) {
    for _ in 0..n {
        tick(state, &[], content, rng, EventLevel::Normal);
    }
}

/// First `CommandRejected` reason in the event batch, if any.
fn rejection_reason(events: &[EventEnvelope]) -> Option<String> {
    events.iter().find_map(|e| match &e.event {
        Event::CommandRejected { reason, .. } => Some(reason.clone()),
        _ => None,
    })
}

fn has_event(events: &[EventEnvelope], pred: impl Fn(&Event) -> bool) -> bool {
    events.iter().any(|e| pred(&e.event))
}

/// Insert an enemy directly, bypassing the spawner.
fn insert_enemy(state: &mut GameState, id: &str, distance: f64, health: f64, breach: bool) {
    state.enemies.push(EnemyState {
        id: EnemyId(id.to_string()),
        sector: SectorId(test_fixtures::STARTER_SECTOR.to_string()),
        distance_to_core: distance,
        health,
        speed: 1.0,
        bounty: 5,
        wave_member: false,
        breach,
    });
}

/// State with a firewall already placed in `slot_cpu_a` (one tick elapsed).
fn state_with_tower(content: &GameContent) -> (GameState, TowerId) {
    let mut state = test_state(content);
    let mut rng = make_rng();
    let place = place_cmd(&state, 0, "weapon_firewall", "slot_cpu_a");
    tick(&mut state, &[place], content, &mut rng, EventLevel::Normal);
    let tower_id = state.towers[0].id.clone();
    (state, tower_id)
}
