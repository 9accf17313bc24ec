//! `defense_core` — deterministic defense simulation tick.
//!
//! No IO, no network. All randomness via the passed-in Rng.

mod boss;
mod combat;
mod commands;
mod economy;
mod engine;
mod errors;
mod freeze;
mod id;
mod overclock;
mod sectors;
pub mod snapshot;
mod spawner;
mod towers;
mod types;
mod zero_day;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use engine::tick;
pub use errors::CommandError;
pub use id::generate_uuid;
pub use sectors::{sector_unlock_status, UnlockStatus};
pub use snapshot::{compute_snapshot, write_snapshot_csv, SessionSnapshot, SnapshotFileWriter};
pub use spawner::wave_schedule;
pub use towers::{tower_stats, upgrade_cost};
pub use types::*;

pub(crate) fn emit(counters: &mut Counters, tick: u64, event: Event) -> EventEnvelope {
    let id = EventId(format!("evt_{:06}", counters.next_event_id));
    counters.next_event_id += 1;
    EventEnvelope { id, tick, event }
}

#[cfg(test)]
mod tests;
