//! A fixed playbook standing in for human or AI players.
//!
//! Each player, on reaching an action phase, tries the actions suggested by
//! [`plan`] in order. Rejected actions are logged and skipped; the session
//! reports exactly why, which is the point of running them.

use kingdom_core::{ActionParams, SessionError, SessionHandle};
use kingdom_types::{ActionOutcome, PlayerSnapshot};
use serde_json::json;
use tracing::{info, warn};

/// Upper bound on advances while looking for the next action phase.
const MAX_ADVANCES_PER_PHASE: usize = 256;

/// Actions a player attempts during one action phase, in order.
pub fn plan(player: &PlayerSnapshot) -> Vec<(&'static str, ActionParams)> {
    let mut actions = Vec::new();

    let free_land = player.lands.iter().find(|land| land.free_slots() > 0);
    match free_land {
        Some(land) => {
            let mut params = ActionParams::new();
            params.insert("id".to_owned(), json!("farm"));
            params.insert("landId".to_owned(), json!(land.id));
            actions.push(("develop", params));
        }
        None => actions.push(("expand", ActionParams::new())),
    }

    if let Some(land) = player.lands.iter().find(|land| land.slots_max < 2) {
        let mut params = ActionParams::new();
        params.insert("landId".to_owned(), json!(land.id));
        actions.push(("till", params));
    }

    actions.push(("raise_council", ActionParams::new()));
    actions.push(("tax", ActionParams::new()));
    actions
}

/// Play `turns` full turns through `handle`.
pub async fn play(handle: &SessionHandle, turns: u32) -> Result<(), SessionError> {
    let last_turn = handle.latest_snapshot().game.turn.saturating_add(turns);
    loop {
        advance_to_action_phase(handle).await?;
        let snapshot = handle.latest_snapshot();
        if snapshot.game.turn >= last_turn {
            return Ok(());
        }

        let active = snapshot.game.active_player.clone();
        let Some(player) = snapshot.players.iter().find(|p| p.id == active) else {
            return Err(SessionError::OutOfRange);
        };
        for (action, params) in plan(player) {
            match handle.perform_action(action, params).await? {
                ActionOutcome::Completed { gains, .. } => {
                    info!(player = %active, action, changes = gains.len(), "Scripted action completed");
                }
                ActionOutcome::Rejected { failures, .. } => {
                    let reasons: Vec<&str> = failures.iter().map(|f| f.message.as_str()).collect();
                    warn!(player = %active, action, ?reasons, "Scripted action rejected");
                }
            }
        }
        handle.end_phase().await?;
    }
}

async fn advance_to_action_phase(handle: &SessionHandle) -> Result<(), SessionError> {
    for _ in 0..MAX_ADVANCES_PER_PHASE {
        if handle.latest_snapshot().game.action_phase {
            return Ok(());
        }
        handle.advance().await?;
    }
    Err(SessionError::AllPhasesSkipped)
}
