//! Sector unlocking and spawn pausing.

use smallvec::SmallVec;

use crate::economy::spend;
use crate::errors::CommandError;
use crate::types::{Event, EventEnvelope, GameContent, GameState, ProfileDelta, SectorId};

/// Answer to "can this sector be unlocked right now?".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockStatus {
    Unlocked,
    /// Unlockable for hash.
    Purchasable { cost: i64 },
    /// Requires a first defeat of the named boss.
    BossGated { boss: crate::types::BossId },
}

/// Query the unlock status of a sector without mutating state.
pub fn sector_unlock_status(
    state: &GameState,
    content: &GameContent,
    sector: &SectorId,
) -> Result<UnlockStatus, CommandError> {
    let def = content
        .sector(sector)
        .ok_or_else(|| CommandError::SectorNotFound(sector.clone()))?;
    if state.unlocked_sectors.contains(sector) {
        return Ok(UnlockStatus::Unlocked);
    }

    // A sector gated behind a boss can only be opened by defeating it.
    let gate = content.map.sectors.iter().find(|s| {
        s.boss.unlocks_sector.as_ref() == Some(sector)
            && !state.defeated_bosses.contains(&s.boss.id)
    });
    if let Some(gating) = gate {
        return Ok(UnlockStatus::BossGated {
            boss: gating.boss.id.clone(),
        });
    }
    Ok(UnlockStatus::Purchasable {
        cost: def.unlock_cost,
    })
}

pub(crate) fn unlock_sector(
    state: &mut GameState,
    content: &GameContent,
    sector: &SectorId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    match sector_unlock_status(state, content, sector)? {
        UnlockStatus::Unlocked => Err(CommandError::AlreadyUnlocked(sector.clone())),
        UnlockStatus::BossGated { boss } => Err(CommandError::BossGated(sector.clone(), boss)),
        UnlockStatus::Purchasable { cost } => {
            spend(state, cost)?;
            grant_sector(state, sector, events);
            Ok(())
        }
    }
}

/// Unlock without payment. Used by purchases (after the spend) and by
/// boss-reward gates.
pub(crate) fn grant_sector(
    state: &mut GameState,
    sector: &SectorId,
    events: &mut Vec<EventEnvelope>,
) {
    if !state.unlocked_sectors.insert(sector.clone()) {
        return;
    }
    state
        .profile_deltas
        .push(ProfileDelta::SectorUnlocked(sector.clone()));
    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::SectorUnlocked {
            sector: sector.clone(),
        },
    ));
}

pub(crate) fn toggle_sector_pause(
    state: &mut GameState,
    content: &GameContent,
    sector: &SectorId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    let def = content
        .sector(sector)
        .ok_or_else(|| CommandError::SectorNotFound(sector.clone()))?;
    if def.starter {
        return Err(CommandError::StarterSectorAlwaysActive);
    }
    if !state.unlocked_sectors.contains(sector) {
        return Err(CommandError::SectorLocked(sector.clone()));
    }

    let paused = if state.paused_sectors.contains(sector) {
        state.paused_sectors.remove(sector);
        false
    } else {
        state.paused_sectors.insert(sector.clone());
        true
    };

    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::SectorPauseToggled {
            sector: sector.clone(),
            paused,
        },
    ));
    Ok(())
}

/// Sectors currently receiving spawns, in map order for determinism.
pub(crate) fn active_sectors(
    state: &GameState,
    content: &GameContent,
) -> SmallVec<[SectorId; 8]> {
    content
        .map
        .sectors
        .iter()
        .filter(|s| {
            state.unlocked_sectors.contains(&s.id) && !state.paused_sectors.contains(&s.id)
        })
        .map(|s| s.id.clone())
        .collect()
}
