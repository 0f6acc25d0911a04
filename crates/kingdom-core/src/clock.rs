//! Turn clock for a game session.
//!
//! The clock is the single source of truth for where the session is in the
//! turn cycle: turn number, active player, phase and step. It advances one
//! step at a time and rolls over step → phase → player → turn.
//!
//! # Design Principles
//!
//! - The clock knows nothing about skips. The session decides whether an
//!   entered phase is skipped and asks the clock to move on.
//! - All counters use checked arithmetic (no silent overflow).
//! - Positions are indices into the configured layout, which is validated
//!   to be non-empty at construction.

use kingdom_types::{GameProgress, PlayerId};

use crate::config::{PhaseConfig, StepConfig};

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Turn counter would overflow.
    #[error("turn counter overflow: cannot advance beyond u32::MAX")]
    TurnOverflow,

    /// Invalid turn layout (no players, no phases, or an empty phase).
    #[error("invalid turn layout: {reason}")]
    InvalidLayout {
        /// Explanation of what is wrong with the layout.
        reason: String,
    },
}

/// The widest boundary crossed by an advance.
///
/// Ordered from narrowest to widest so that `boundary >= Boundary::Phase`
/// means "a new phase was entered".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Boundary {
    /// Moved to the next step of the same phase.
    Step,
    /// Entered the next phase of the same player.
    Phase,
    /// Handed the turn to the next player.
    Player,
    /// Wrapped around to the first player of a new turn.
    Turn,
}

impl Boundary {
    /// Whether a new phase was entered.
    pub fn enters_phase(self) -> bool {
        self >= Self::Phase
    }
}

/// Turn clock tracking the session's position in the turn cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnClock {
    /// Current turn number (1-indexed).
    turn: u32,

    /// Index of the active player.
    player: usize,

    /// Index of the current phase.
    phase: usize,

    /// Index of the current step within the phase.
    step: usize,

    /// Players in turn order.
    players: Vec<PlayerId>,

    /// Phase cycle of every player turn.
    phases: Vec<PhaseConfig>,
}

impl TurnClock {
    /// Create a clock positioned at the first step of the first phase of
    /// the first player on turn 1.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidLayout`] if there are no players, no
    /// phases, or a phase without steps.
    pub fn new(players: Vec<PlayerId>, phases: Vec<PhaseConfig>) -> Result<Self, ClockError> {
        if players.is_empty() {
            return Err(ClockError::InvalidLayout {
                reason: "at least one player is required".to_owned(),
            });
        }
        if phases.is_empty() {
            return Err(ClockError::InvalidLayout {
                reason: "at least one phase is required".to_owned(),
            });
        }
        if let Some(empty) = phases.iter().find(|phase| phase.steps.is_empty()) {
            return Err(ClockError::InvalidLayout {
                reason: format!("phase `{}` has no steps", empty.id),
            });
        }
        Ok(Self {
            turn: 1,
            player: 0,
            phase: 0,
            step: 0,
            players,
            phases,
        })
    }

    /// Current turn number.
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Index of the active player in turn order.
    pub const fn player_index(&self) -> usize {
        self.player
    }

    /// The active player.
    pub fn active_player(&self) -> Option<&PlayerId> {
        self.players.get(self.player)
    }

    /// The current phase.
    pub fn phase(&self) -> Option<&PhaseConfig> {
        self.phases.get(self.phase)
    }

    /// The current step.
    pub fn step(&self) -> Option<&StepConfig> {
        self.phase().and_then(|phase| phase.steps.get(self.step))
    }

    /// Number of `(player, phase)` slots in one full turn.
    pub fn phase_slots(&self) -> usize {
        self.players.len().saturating_mul(self.phases.len())
    }

    /// Move to the next step, rolling over into the next phase, player or
    /// turn as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TurnOverflow`] if the turn counter would
    /// overflow.
    pub fn advance(&mut self) -> Result<Boundary, ClockError> {
        let steps = self.phase().map_or(0, |phase| phase.steps.len());
        let next_step = self.step.saturating_add(1);
        if next_step < steps {
            self.step = next_step;
            return Ok(Boundary::Step);
        }
        self.next_phase()
    }

    /// Abandon the rest of the current phase and enter the next one.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TurnOverflow`] if the turn counter would
    /// overflow.
    pub fn next_phase(&mut self) -> Result<Boundary, ClockError> {
        self.step = 0;
        let next_phase = self.phase.saturating_add(1);
        if next_phase < self.phases.len() {
            self.phase = next_phase;
            return Ok(Boundary::Phase);
        }

        self.phase = 0;
        let next_player = self.player.saturating_add(1);
        if next_player < self.players.len() {
            self.player = next_player;
            return Ok(Boundary::Player);
        }

        self.turn = self.turn.checked_add(1).ok_or(ClockError::TurnOverflow)?;
        self.player = 0;
        Ok(Boundary::Turn)
    }

    /// The current position as exposed in snapshots.
    pub fn progress(&self) -> GameProgress {
        let phase = self.phase();
        GameProgress {
            turn: self.turn,
            active_player: self.active_player().cloned().unwrap_or_default(),
            phase: phase.map(|phase| phase.id.clone()).unwrap_or_default(),
            step: self.step().map(|step| step.id.clone()).unwrap_or_default(),
            action_phase: phase.is_some_and(|phase| phase.action),
        }
    }
}
