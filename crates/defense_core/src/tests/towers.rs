use super::*;

#[test]
fn place_tower_charges_cost_and_power() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();

    let place = place_cmd(&state, 0, "weapon_firewall", "slot_cpu_a");
    let events = tick(&mut state, &[place], &content, &mut rng, EventLevel::Normal);

    // 500 - 50 placement + 10 production.
    assert_eq!(state.hash, 460);
    assert_eq!(state.power_used, 10);
    assert_eq!(state.towers.len(), 1);
    assert_eq!(state.stats.towers_placed, 1);
    assert!(state
        .slots
        .iter()
        .find(|s| s.id.0 == "slot_cpu_a")
        .is_some_and(|s| s.occupied));
    assert!(has_event(&events, |e| matches!(
        e,
        Event::TowerPlaced { .. }
    )));
}

#[test]
fn place_rejects_occupied_slot() {
    let content = test_content();
    let (mut state, _) = state_with_tower(&content);
    let mut rng = make_rng();

    let place = place_cmd(&state, 1, "weapon_scrubber", "slot_cpu_a");
    let events = tick(&mut state, &[place], &content, &mut rng, EventLevel::Normal);

    assert_eq!(state.towers.len(), 1);
    assert!(rejection_reason(&events).is_some_and(|r| r.contains("occupied")));
}

#[test]
fn place_rejects_locked_sector() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();

    let place = place_cmd(&state, 0, "weapon_firewall", "slot_ram_a");
    let events = tick(&mut state, &[place], &content, &mut rng, EventLevel::Normal);

    assert!(state.towers.is_empty());
    assert!(rejection_reason(&events).is_some_and(|r| r.contains("locked")));
}

#[test]
fn place_rejects_insufficient_funds() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();

    state.hash = 10;
    let place = place_cmd(&state, 0, "weapon_firewall", "slot_cpu_a");
    let events = tick(&mut state, &[place], &content, &mut rng, EventLevel::Normal);

    assert!(state.towers.is_empty());
    assert_eq!(state.power_used, 0);
    assert!(rejection_reason(&events).is_some_and(|r| r.contains("insufficient hash")));
}

#[test]
fn place_rejects_insufficient_power() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();

    state.power_used = 95;
    let place = place_cmd(&state, 0, "weapon_firewall", "slot_cpu_a");
    let events = tick(&mut state, &[place], &content, &mut rng, EventLevel::Normal);

    assert!(state.towers.is_empty());
    // The failed placement must not have charged anything.
    assert_eq!(state.hash, 510);
    assert!(rejection_reason(&events).is_some_and(|r| r.contains("insufficient power")));
}

#[test]
fn place_rejects_weapon_outside_loadout() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();

    state.loadout.retain(|w| w.0 != "weapon_scrubber");
    let place = place_cmd(&state, 0, "weapon_scrubber", "slot_cpu_a");
    let events = tick(&mut state, &[place], &content, &mut rng, EventLevel::Normal);

    assert!(state.towers.is_empty());
    assert!(rejection_reason(&events).is_some_and(|r| r.contains("loadout")));
}

#[test]
fn upgrade_increases_level_and_stats() {
    let content = test_content();
    let (mut state, tower_id) = state_with_tower(&content);
    let mut rng = make_rng();

    let upgrade = cmd(
        &state,
        1,
        Command::UpgradeTower {
            tower: tower_id.clone(),
        },
    );
    let events = tick(&mut state, &[upgrade], &content, &mut rng, EventLevel::Normal);

    let tower = &state.towers[0];
    assert_eq!(tower.level, 2);
    // 5.0 base * (1 + 0.2 damage growth).
    assert!((tower.damage - 6.0).abs() < 1e-9);
    assert!(has_event(&events, |e| matches!(
        e,
        Event::TowerUpgraded { level: 2, .. }
    )));
}

#[test]
fn upgrade_rejects_at_max_level() {
    let content = test_content();
    let (mut state, tower_id) = state_with_tower(&content);
    let mut rng = make_rng();

    state.towers[0].level = MAX_TOWER_LEVEL;
    let upgrade = cmd(&state, 1, Command::UpgradeTower { tower: tower_id });
    let events = tick(&mut state, &[upgrade], &content, &mut rng, EventLevel::Normal);

    assert_eq!(state.towers[0].level, MAX_TOWER_LEVEL);
    assert!(rejection_reason(&events).is_some_and(|r| r.contains("max level")));
}

#[test]
fn sell_refunds_and_frees_slot() {
    let content = test_content();
    let (mut state, tower_id) = state_with_tower(&content);
    let mut rng = make_rng();

    let sell = cmd(&state, 1, Command::SellTower { tower: tower_id });
    let events = tick(&mut state, &[sell], &content, &mut rng, EventLevel::Normal);

    // 460 after placement tick, + 25 refund + 10 production.
    assert_eq!(state.hash, 495);
    assert_eq!(state.power_used, 0);
    assert!(state.towers.is_empty());
    assert!(state
        .slots
        .iter()
        .find(|s| s.id.0 == "slot_cpu_a")
        .is_some_and(|s| !s.occupied));
    assert!(has_event(&events, |e| matches!(
        e,
        Event::TowerSold { refund: 25, .. }
    )));
}

#[test]
fn merge_consumes_and_boosts_damage() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();

    let a = place_cmd(&state, 0, "weapon_firewall", "slot_cpu_a");
    let b = place_cmd(&state, 1, "weapon_firewall", "slot_cpu_b");
    tick(&mut state, &[a, b], &content, &mut rng, EventLevel::Normal);
    assert_eq!(state.towers.len(), 2);
    let kept = state.towers[0].id.clone();
    let consumed = state.towers[1].id.clone();

    let merge = cmd(
        &state,
        2,
        Command::MergeTowers {
            kept: kept.clone(),
            consumed,
        },
    );
    let events = tick(&mut state, &[merge], &content, &mut rng, EventLevel::Normal);

    assert_eq!(state.towers.len(), 1);
    let tower = &state.towers[0];
    assert_eq!(tower.id, kept);
    assert_eq!(tower.merge_level, 1);
    // 5.0 base * 1.25 merge bonus.
    assert!((tower.damage - 6.25).abs() < 1e-9);
    assert_eq!(state.power_used, 10);
    assert!(state
        .slots
        .iter()
        .find(|s| s.id.0 == "slot_cpu_b")
        .is_some_and(|s| !s.occupied));
    assert!(has_event(&events, |e| matches!(
        e,
        Event::TowersMerged { merge_level: 1, .. }
    )));
}

#[test]
fn merge_rejects_mismatched_weapons() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();

    let a = place_cmd(&state, 0, "weapon_firewall", "slot_cpu_a");
    let b = place_cmd(&state, 1, "weapon_scrubber", "slot_cpu_b");
    tick(&mut state, &[a, b], &content, &mut rng, EventLevel::Normal);
    let kept = state.towers[0].id.clone();
    let consumed = state.towers[1].id.clone();

    let merge = cmd(&state, 2, Command::MergeTowers { kept, consumed });
    let events = tick(&mut state, &[merge], &content, &mut rng, EventLevel::Normal);

    assert_eq!(state.towers.len(), 2);
    assert!(rejection_reason(&events).is_some_and(|r| r.contains("weapon types differ")));
}

#[test]
fn merge_rejects_at_max_tier() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();

    let a = place_cmd(&state, 0, "weapon_firewall", "slot_cpu_a");
    let b = place_cmd(&state, 1, "weapon_firewall", "slot_cpu_b");
    tick(&mut state, &[a, b], &content, &mut rng, EventLevel::Normal);
    state.towers[0].merge_level = MAX_MERGE_LEVEL;
    state.towers[1].merge_level = MAX_MERGE_LEVEL;
    let kept = state.towers[0].id.clone();
    let consumed = state.towers[1].id.clone();

    let merge = cmd(&state, 2, Command::MergeTowers { kept, consumed });
    let events = tick(&mut state, &[merge], &content, &mut rng, EventLevel::Normal);

    assert_eq!(state.towers.len(), 2);
    assert!(rejection_reason(&events).is_some_and(|r| r.contains("max merge tier")));
}
