//! Command rejection reasons.
//!
//! Commands validate against the current state before mutating anything; a
//! rejected command leaves the state untouched and surfaces one of these.

use thiserror::Error;

use crate::types::{BossId, SectorId, SlotId, TowerId, WeaponTypeId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("insufficient hash: need {required}, have {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("insufficient power: need {required}, have {available} free")]
    InsufficientPower { required: u32, available: u32 },

    #[error("slot {0} is already occupied")]
    SlotOccupied(SlotId),

    #[error("slot {0} does not exist")]
    SlotNotFound(SlotId),

    #[error("sector {0} is locked")]
    SectorLocked(SectorId),

    #[error("sector {0} does not exist")]
    SectorNotFound(SectorId),

    #[error("sector {0} is already unlocked")]
    AlreadyUnlocked(SectorId),

    #[error("sector {0} is gated behind boss {1}")]
    BossGated(SectorId, BossId),

    #[error("the starter sector cannot be paused")]
    StarterSectorAlwaysActive,

    #[error("tower {0} does not exist")]
    TowerNotFound(TowerId),

    #[error("tower {0} is already at max level")]
    MaxLevelReached(TowerId),

    #[error("towers cannot be merged: {0}")]
    MergeMismatch(String),

    #[error("unknown weapon type {0}")]
    UnknownWeapon(WeaponTypeId),

    #[error("weapon {0} is not in the compiled loadout")]
    WeaponNotInLoadout(WeaponTypeId),

    #[error("a boss is already engaged")]
    AlreadyEngaged,

    #[error("no boss is active")]
    NoBossActive,

    #[error("the boss has not been engaged")]
    NotEngaged,

    #[error("no reward is pending collection")]
    NothingToCollect,

    #[error("overclock is unavailable right now")]
    OverclockUnavailable,

    #[error("no zero-day event is active")]
    NoZeroDayActive,

    #[error("the system is frozen")]
    SystemFrozen,

    #[error("the system is not frozen")]
    NotFrozen,
}
