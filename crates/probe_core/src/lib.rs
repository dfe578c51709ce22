//! `probe_core` — deterministic wizard, catalog, and launch-minigame core.
//!
//! No IO, no network. All randomness via the passed-in Rng; timers live in
//! the frontends, which drive this crate through commands.

mod catalog;
mod id;
mod minigame;
mod navigator;
mod reveal;
mod store;
mod types;

pub use catalog::generate_catalog;
pub use id::mint_part_id;
pub use minigame::{grade_for_distance, LaunchGrade, MinigameSession, SweepBand};
pub use navigator::{apply, Command, Session, SessionMeta};
pub use reveal::{reward_for_score, RevealState};
pub use store::{ConfigStore, MemoryStore, StoreError};
pub use types::*;

pub(crate) fn emit(counters: &mut Counters, epoch: u64, event: Event) -> EventEnvelope {
    let id = EventId(format!("evt_{:06}", counters.next_event_id));
    counters.next_event_id += 1;
    EventEnvelope { id, epoch, event }
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

#[cfg(test)]
mod tests;
