use super::*;

#[test]
fn unlock_purchasable_sector_charges_cost() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();

    let unlock = cmd(
        &state,
        0,
        Command::UnlockSector {
            sector: SectorId(PURCHASABLE_SECTOR.to_string()),
        },
    );
    let events = tick(&mut state, &[unlock], &content, &mut rng, EventLevel::Normal);

    // 500 - 250 unlock + 10 production.
    assert_eq!(state.hash, 260);
    assert!(state
        .unlocked_sectors
        .contains(&SectorId(PURCHASABLE_SECTOR.to_string())));
    assert!(state
        .profile_deltas
        .contains(&ProfileDelta::SectorUnlocked(SectorId(
            PURCHASABLE_SECTOR.to_string()
        ))));
    assert!(has_event(&events, |e| matches!(
        e,
        Event::SectorUnlocked { .. }
    )));
}

#[test]
fn unlock_rejects_boss_gated_sector() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();

    let unlock = cmd(
        &state,
        0,
        Command::UnlockSector {
            sector: SectorId(GATED_SECTOR.to_string()),
        },
    );
    let events = tick(&mut state, &[unlock], &content, &mut rng, EventLevel::Normal);

    assert!(!state
        .unlocked_sectors
        .contains(&SectorId(GATED_SECTOR.to_string())));
    assert!(rejection_reason(&events).is_some_and(|r| r.contains("gated")));
}

#[test]
fn unlock_rejects_already_unlocked() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();

    let unlock = cmd(
        &state,
        0,
        Command::UnlockSector {
            sector: SectorId(test_fixtures::STARTER_SECTOR.to_string()),
        },
    );
    let events = tick(&mut state, &[unlock], &content, &mut rng, EventLevel::Normal);

    assert!(rejection_reason(&events).is_some_and(|r| r.contains("already unlocked")));
}

#[test]
fn unlock_rejects_insufficient_funds() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();

    state.hash = 100;
    let unlock = cmd(
        &state,
        0,
        Command::UnlockSector {
            sector: SectorId(PURCHASABLE_SECTOR.to_string()),
        },
    );
    let events = tick(&mut state, &[unlock], &content, &mut rng, EventLevel::Normal);

    assert!(!state
        .unlocked_sectors
        .contains(&SectorId(PURCHASABLE_SECTOR.to_string())));
    assert!(rejection_reason(&events).is_some_and(|r| r.contains("insufficient hash")));
}

#[test]
fn pause_toggles_on_and_off() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let sector = SectorId(PURCHASABLE_SECTOR.to_string());
    state.unlocked_sectors.insert(sector.clone());

    let toggle = cmd(
        &state,
        0,
        Command::ToggleSectorPause {
            sector: sector.clone(),
        },
    );
    let events = tick(&mut state, &[toggle], &content, &mut rng, EventLevel::Normal);
    assert!(state.paused_sectors.contains(&sector));
    assert!(has_event(&events, |e| matches!(
        e,
        Event::SectorPauseToggled { paused: true, .. }
    )));

    let toggle = cmd(
        &state,
        1,
        Command::ToggleSectorPause {
            sector: sector.clone(),
        },
    );
    let events = tick(&mut state, &[toggle], &content, &mut rng, EventLevel::Normal);
    assert!(!state.paused_sectors.contains(&sector));
    assert!(has_event(&events, |e| matches!(
        e,
        Event::SectorPauseToggled { paused: false, .. }
    )));
}

#[test]
fn starter_sector_cannot_pause() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();

    let toggle = cmd(
        &state,
        0,
        Command::ToggleSectorPause {
            sector: SectorId(test_fixtures::STARTER_SECTOR.to_string()),
        },
    );
    let events = tick(&mut state, &[toggle], &content, &mut rng, EventLevel::Normal);

    assert!(state.paused_sectors.is_empty());
    assert!(rejection_reason(&events).is_some_and(|r| r.contains("starter")));
}

#[test]
fn unlock_status_reflects_gates_and_defeats() {
    let content = test_content();
    let mut state = test_state(&content);

    let starter = SectorId(test_fixtures::STARTER_SECTOR.to_string());
    let purchasable = SectorId(PURCHASABLE_SECTOR.to_string());
    let gated = SectorId(GATED_SECTOR.to_string());

    assert_eq!(
        sector_unlock_status(&state, &content, &starter),
        Ok(UnlockStatus::Unlocked)
    );
    assert_eq!(
        sector_unlock_status(&state, &content, &purchasable),
        Ok(UnlockStatus::Purchasable { cost: 250 })
    );
    assert_eq!(
        sector_unlock_status(&state, &content, &gated),
        Ok(UnlockStatus::BossGated {
            boss: BossId("boss_trojan_titan".to_string())
        })
    );

    // Once the gating boss falls the sector becomes purchasable.
    state
        .defeated_bosses
        .insert(BossId("boss_trojan_titan".to_string()));
    assert_eq!(
        sector_unlock_status(&state, &content, &gated),
        Ok(UnlockStatus::Purchasable { cost: 300 })
    );

    let unknown = SectorId("sector_missing".to_string());
    assert!(sector_unlock_status(&state, &content, &unknown).is_err());
}
