use super::*;

fn frozen_state(content: &GameContent) -> GameState {
    let mut state = test_state(content);
    state.leak_counter = content.constants.leak_cap;
    state.frozen = true;
    state
}

#[test]
fn frozen_blocks_gameplay_commands() {
    let content = test_content();
    let mut state = frozen_state(&content);
    let mut rng = make_rng();

    let place = place_cmd(&state, 0, "weapon_firewall", "slot_cpu_a");
    let events = tick(&mut state, &[place], &content, &mut rng, EventLevel::Normal);

    assert!(state.towers.is_empty());
    assert!(rejection_reason(&events).is_some_and(|r| r.contains("frozen")));
}

#[test]
fn flush_memory_restores_half_efficiency() {
    let content = test_content();
    let mut state = frozen_state(&content);
    let mut rng = make_rng();

    state.hash = 2000;
    let flush = cmd(&state, 0, Command::FlushMemory);
    let events = tick(&mut state, &[flush], &content, &mut rng, EventLevel::Normal);

    assert!(!state.frozen);
    assert_eq!(state.leak_counter, content.constants.flush_restore_leak_counter);
    assert_eq!(state.efficiency(), 50);
    // 10% of 2000 beats the floor: cost 200, then production resumes at
    // half rate the same tick.
    assert_eq!(state.hash, 1805);
    assert!(has_event(&events, |e| matches!(
        e,
        Event::SystemRestored {
            path: RecoveryPath::FlushMemory,
            efficiency: 50
        }
    )));
}

#[test]
fn flush_memory_uses_floor_cost_when_poor() {
    let content = test_content();
    let mut state = frozen_state(&content);
    let mut rng = make_rng();

    // 10% of 500 is below the 100 floor.
    let flush = cmd(&state, 0, Command::FlushMemory);
    tick(&mut state, &[flush], &content, &mut rng, EventLevel::Normal);

    assert!(!state.frozen);
    assert_eq!(state.hash, 405);
}

#[test]
fn flush_memory_rejects_when_unaffordable() {
    let content = test_content();
    let mut state = frozen_state(&content);
    let mut rng = make_rng();

    state.hash = 50;
    let flush = cmd(&state, 0, Command::FlushMemory);
    let events = tick(&mut state, &[flush], &content, &mut rng, EventLevel::Normal);

    assert!(state.frozen);
    assert_eq!(state.hash, 50);
    assert!(rejection_reason(&events).is_some_and(|r| r.contains("insufficient hash")));
}

#[test]
fn flush_memory_rejects_when_not_frozen() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();

    let flush = cmd(&state, 0, Command::FlushMemory);
    let events = tick(&mut state, &[flush], &content, &mut rng, EventLevel::Normal);

    assert!(rejection_reason(&events).is_some_and(|r| r.contains("not frozen")));
}

#[test]
fn manual_override_victory_restores_fully() {
    let content = test_content();
    let mut state = frozen_state(&content);
    let mut rng = make_rng();

    let resolve = cmd(
        &state,
        0,
        Command::ResolveManualOverride {
            outcome: FightOutcome::Victory,
        },
    );
    let events = tick(&mut state, &[resolve], &content, &mut rng, EventLevel::Normal);

    assert!(!state.frozen);
    assert_eq!(state.leak_counter, 0);
    assert_eq!(state.efficiency(), 100);
    assert!(has_event(&events, |e| matches!(
        e,
        Event::SystemRestored {
            path: RecoveryPath::ManualOverride,
            efficiency: 100
        }
    )));
}

#[test]
fn manual_override_defeat_stays_frozen() {
    let content = test_content();
    let mut state = frozen_state(&content);
    let mut rng = make_rng();

    let resolve = cmd(
        &state,
        0,
        Command::ResolveManualOverride {
            outcome: FightOutcome::Defeat,
        },
    );
    let events = tick(&mut state, &[resolve], &content, &mut rng, EventLevel::Normal);

    assert!(state.frozen);
    assert_eq!(state.hash, 500);
    assert!(rejection_reason(&events).is_none());
    assert!(!has_event(&events, |e| matches!(
        e,
        Event::SystemRestored { .. }
    )));
}
