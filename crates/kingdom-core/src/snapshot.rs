//! Owned session snapshots.
//!
//! A snapshot copies everything it reports. Consumers may hold on to it,
//! compare it with later snapshots or serialize it without touching the
//! live session.

use std::collections::VecDeque;

use chrono::Utc;
use kingdom_effects::PlayerState;
use kingdom_ledger::ResourceCatalog;
use kingdom_types::{ResourceGain, SessionId, SessionSnapshot};

use crate::clock::TurnClock;

/// Assemble a snapshot of the session at the clock's current position.
pub fn session_snapshot(
    session_id: SessionId,
    clock: &TurnClock,
    players: &[PlayerState],
    catalog: &ResourceCatalog,
    recent_gains: &VecDeque<ResourceGain>,
) -> SessionSnapshot {
    SessionSnapshot {
        session_id,
        taken_at: Utc::now(),
        game: clock.progress(),
        players: players.iter().map(|player| player.snapshot(catalog)).collect(),
        recent_gains: recent_gains.iter().cloned().collect(),
    }
}
