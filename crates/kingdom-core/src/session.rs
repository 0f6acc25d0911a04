//! The game session: phase advancement and action execution.
//!
//! A [`GameSession`] owns every player's state, the static content and the
//! turn clock. It is the only place where the effect interpreter and the
//! requirement evaluator are invoked on live state:
//!
//! 1. **Setup** -- each player receives the configured start state, then the
//!    clock enters the first phase.
//! 2. **Advance** -- [`GameSession::advance`] moves to the next step. A phase
//!    skipped for the active player is passed over entirely; a skipped step
//!    does not run its effects. Entering a phase expires passives bound to
//!    it and runs the `onPhase` triggers of the remaining passives.
//! 3. **Actions** -- [`GameSession::perform_action`] checks requirements and
//!    costs, then runs the action against a working copy of the player that
//!    is committed only if every effect succeeds.
//!
//! Tier tracks are re-synchronised after every batch of mutations.

use std::collections::{BTreeMap, VecDeque};

use kingdom_effects::{
    ContentError, ContentRegistry, EffectContext, EffectError, EffectRegistry, EvaluationMode,
    PlayerState, RequirementEvaluator, add_building, remove_passive, sync_tiers,
};
use kingdom_ledger::ResourceDelta;
use kingdom_types::{
    ActionDefinition, ActionId, ActionOutcome, CompareOperator, EffectDef, EvaluatorOperand,
    GameProgress, Operand, PhaseId, Reconciliation, RequirementDef, ResourceGain, ResourceId,
    SessionId, SessionSnapshot,
};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::clock::{Boundary, ClockError, TurnClock};
use crate::config::{ConfigError, EngineConfig, PhaseConfig, StartConfig};
use crate::placeholders::{ActionParams, MissingParam, substitute_effect, substitute_requirement};
use crate::snapshot;

/// Errors that can occur while running a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The configuration is unplayable.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The content failed validation.
    #[error("content error: {0}")]
    Content(#[from] ContentError),

    /// The turn clock could not advance.
    #[error("clock error: {0}")]
    Clock(#[from] ClockError),

    /// A setup, phase or step effect failed. Player state is unchanged.
    #[error("effect failed: {0}")]
    Effect(#[from] EffectError),

    /// An action's costs or effects failed. Player state is unchanged.
    #[error("action `{action}` failed: {source}")]
    ActionFailed {
        /// The action attempted.
        action: ActionId,
        /// The underlying effect error.
        source: EffectError,
    },

    /// No action with this id exists in the content.
    #[error("unknown action `{0}`")]
    UnknownAction(String),

    /// Actions may only be performed during an action phase.
    #[error("action `{action}` cannot be performed during phase `{phase}`")]
    NotActionPhase {
        /// The action attempted.
        action: ActionId,
        /// The current phase.
        phase: PhaseId,
    },

    /// An action placeholder had no value.
    #[error("action `{action}`: {source}")]
    MissingParam {
        /// The action attempted.
        action: ActionId,
        /// The missing placeholder.
        source: MissingParam,
    },

    /// Every phase is skipped for every player, so no phase can be entered.
    #[error("every phase is skipped for every player")]
    AllPhasesSkipped,

    /// The clock points at a player or phase the session does not have.
    #[error("session position out of range")]
    OutOfRange,
}

/// A running game.
#[derive(Debug)]
pub struct GameSession {
    /// Session id.
    id: SessionId,

    /// Engine configuration (rules, phases, start state).
    config: EngineConfig,

    /// Effect handler dispatch table.
    registry: EffectRegistry,

    /// Static content.
    content: ContentRegistry,

    /// Position in the turn cycle.
    clock: TurnClock,

    /// Players in turn order.
    players: Vec<PlayerState>,

    /// Most recent resource changes, oldest first.
    recent_gains: VecDeque<ResourceGain>,
}

impl GameSession {
    /// Start a session with the built-in effect handlers.
    pub fn new(config: EngineConfig, content: ContentRegistry) -> Result<Self, SessionError> {
        Self::with_registry(config, content, EffectRegistry::with_builtin())
    }

    /// Start a session with a custom effect registry.
    ///
    /// Validates the configuration and the content, applies the start state
    /// to every player and enters the first phase.
    pub fn with_registry(
        config: EngineConfig,
        content: ContentRegistry,
        registry: EffectRegistry,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        content.validate(&registry)?;

        let clock = TurnClock::new(
            config.players.iter().map(|seat| seat.id.clone()).collect(),
            config.phases.clone(),
        )?;
        let players = config
            .players
            .iter()
            .map(|seat| PlayerState::new(seat.id.clone(), seat.name.clone(), content.catalog()))
            .collect();

        let mut session = Self {
            id: SessionId::new(),
            config,
            registry,
            content,
            clock,
            players,
            recent_gains: VecDeque::new(),
        };

        let start = session.config.start.clone();
        for index in 0..session.players.len() {
            session.setup_player(index, &start)?;
        }
        session.settle(Boundary::Turn)?;

        info!(
            session_id = %session.id,
            players = session.players.len(),
            phases = session.config.phases.len(),
            "Session started"
        );
        Ok(session)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Session id.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Engine configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Static content.
    pub const fn content(&self) -> &ContentRegistry {
        &self.content
    }

    /// The turn clock.
    pub const fn clock(&self) -> &TurnClock {
        &self.clock
    }

    /// Current turn position.
    pub fn progress(&self) -> GameProgress {
        self.clock.progress()
    }

    /// Players in turn order.
    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    /// Look up a player.
    pub fn player(&self, id: &str) -> Option<&PlayerState> {
        self.players.iter().find(|player| player.id.as_str() == id)
    }

    /// The player whose turn it is.
    pub fn active_player(&self) -> Result<&PlayerState, SessionError> {
        self.players
            .get(self.clock.player_index())
            .ok_or(SessionError::OutOfRange)
    }

    /// Recent resource changes, oldest first.
    pub fn recent_gains(&self) -> impl Iterator<Item = &ResourceGain> {
        self.recent_gains.iter()
    }

    /// A deep, owned snapshot of the whole session.
    pub fn snapshot(&self) -> SessionSnapshot {
        snapshot::session_snapshot(
            self.id,
            &self.clock,
            &self.players,
            self.content.catalog(),
            &self.recent_gains,
        )
    }

    // -----------------------------------------------------------------------
    // Phase advancement
    // -----------------------------------------------------------------------

    /// Move to the next step and run it.
    ///
    /// Returns the position reached.
    ///
    /// On error the session is left exactly where it was: the clock, every
    /// player and the gain history are restored.
    pub fn advance(&mut self) -> Result<GameProgress, SessionError> {
        self.move_clock(TurnClock::advance)
    }

    /// Skip the remaining steps of the current phase and enter the next.
    ///
    /// Rolls back like [`GameSession::advance`] on error.
    pub fn end_phase(&mut self) -> Result<GameProgress, SessionError> {
        self.move_clock(TurnClock::next_phase)
    }

    fn move_clock(
        &mut self,
        step: fn(&mut TurnClock) -> Result<Boundary, ClockError>,
    ) -> Result<GameProgress, SessionError> {
        let clock = self.clock.clone();
        let players = self.players.clone();
        let recent_gains = self.recent_gains.clone();
        let result = step(&mut self.clock)
            .map_err(SessionError::from)
            .and_then(|boundary| self.settle(boundary));
        if let Err(err) = result {
            warn!(
                turn = clock.turn(),
                error = %err,
                "Advance failed, session restored"
            );
            self.clock = clock;
            self.players = players;
            self.recent_gains = recent_gains;
            return Err(err);
        }
        Ok(self.clock.progress())
    }

    /// Run whatever the clock just moved to, passing over skipped phases.
    fn settle(&mut self, mut boundary: Boundary) -> Result<(), SessionError> {
        let mut remaining = self.clock.phase_slots();
        loop {
            if !boundary.enters_phase() {
                return self.run_step();
            }
            let phase = self.current_phase()?.id.clone();
            if !self.active_player()?.skips.is_phase_skipped(phase.as_str()) {
                self.enter_phase(&phase)?;
                return self.run_step();
            }

            info!(
                turn = self.clock.turn(),
                player = %self.active_player()?.id,
                phase = %phase,
                "Phase skipped"
            );
            remaining = remaining.checked_sub(1).ok_or(SessionError::AllPhasesSkipped)?;
            boundary = self.clock.next_phase()?;
        }
    }

    /// Expire passives bound to `phase`, then run the `onPhase` triggers of
    /// the active player's remaining passives.
    fn enter_phase(&mut self, phase: &PhaseId) -> Result<(), SessionError> {
        let index = self.clock.player_index();
        let mut working = self.working_copy(index)?;
        let ((expired, triggered), gains) = self.run(&mut working, |ctx| {
            let expired = ctx.player.passives.expiring_on(phase.as_str());
            for id in &expired {
                remove_passive(ctx, id.as_str())?;
            }
            let triggers = ctx.player.passives.triggers_for(phase);
            for (passive, effects) in &triggers {
                debug!(player = %ctx.player.id, passive = %passive, phase = %phase, "Passive triggered");
                ctx.apply_all(effects)?;
            }
            Ok((expired.len(), triggers.len()))
        })?;
        self.commit(index, working, gains);

        info!(
            turn = self.clock.turn(),
            player = %self.clock.active_player().map_or("", |id| id.as_str()),
            phase = %phase,
            expired,
            triggered,
            "Phase entered"
        );
        Ok(())
    }

    /// Run the current step's effects unless the step is skipped.
    fn run_step(&mut self) -> Result<(), SessionError> {
        let index = self.clock.player_index();
        let phase = self.current_phase()?.id.clone();
        let step = self.clock.step().cloned().ok_or(SessionError::OutOfRange)?;

        let player = self.working_copy(index)?;
        if player.skips.is_step_skipped(phase.as_str(), step.id.as_str()) {
            info!(player = %player.id, phase = %phase, step = %step.id, "Step skipped");
            return Ok(());
        }
        if step.effects.is_empty() {
            return Ok(());
        }

        let mut working = player;
        let ((), gains) = self.run(&mut working, |ctx| ctx.apply_all(&step.effects))?;
        debug!(phase = %phase, step = %step.id, gains = gains.len(), "Step resolved");
        self.commit(index, working, gains);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Perform an action for the active player.
    ///
    /// Requirements and costs are checked together and every unmet one is
    /// reported in [`ActionOutcome::Rejected`]. Otherwise the costs are paid
    /// and the effects applied left to right against a working copy of the
    /// player, which replaces the live state only if nothing failed.
    pub fn perform_action(
        &mut self,
        action_id: &str,
        params: &ActionParams,
    ) -> Result<ActionOutcome, SessionError> {
        let phase = self.current_phase()?;
        if !phase.action {
            return Err(SessionError::NotActionPhase {
                action: ActionId::new(action_id),
                phase: phase.id.clone(),
            });
        }
        let action = self
            .content
            .action(action_id)
            .ok_or_else(|| SessionError::UnknownAction(action_id.to_owned()))?;
        let action_id = action.id.clone();
        let missing = |source| SessionError::MissingParam {
            action: action.id.clone(),
            source,
        };

        let effects = action
            .effects
            .iter()
            .map(|effect| substitute_effect(effect, params))
            .collect::<Result<Vec<_>, _>>()
            .map_err(missing)?;
        let mut requirements = action
            .requirements
            .iter()
            .map(|requirement| substitute_requirement(requirement, params))
            .collect::<Result<Vec<_>, _>>()
            .map_err(missing)?;
        let costs = self.action_costs(action);
        requirements.extend(costs.iter().map(|(resource, cost)| cost_requirement(resource, *cost)));

        let index = self.clock.player_index();
        let player = self.players.get(index).ok_or(SessionError::OutOfRange)?;
        let failures = RequirementEvaluator::new(&self.content, &self.config.rules)
            .evaluate(player, &requirements, EvaluationMode::CollectAll)
            .map_err(|source| SessionError::ActionFailed {
                action: action_id.clone(),
                source,
            })?;
        if !failures.is_empty() {
            warn!(
                player = %player.id,
                action = %action_id,
                failures = failures.len(),
                first = failures.first().map_or("", |failure| failure.message.as_str()),
                "Action rejected"
            );
            return Ok(ActionOutcome::Rejected { action_id, failures });
        }

        let mut working = player.clone();
        let ((), gains) = self
            .run(&mut working, |ctx| {
                let catalog = ctx.catalog();
                for (resource, cost) in &costs {
                    let change = ctx
                        .player
                        .resources
                        .apply(catalog, &ResourceDelta::remove(resource.clone(), *cost))?;
                    ctx.record(&change);
                }
                ctx.apply_all(&effects)
            })
            .map_err(|source| {
                warn!(action = %action_id, %source, "Action failed, state left unchanged");
                SessionError::ActionFailed {
                    action: action_id.clone(),
                    source,
                }
            })?;

        info!(
            turn = self.clock.turn(),
            player = %working.id,
            action = %action_id,
            changes = gains.len(),
            "Action performed"
        );
        self.commit(index, working, gains.clone());
        Ok(ActionOutcome::Completed { action_id, gains })
    }

    /// Action costs plus every resource's global action cost.
    fn action_costs(&self, action: &ActionDefinition) -> BTreeMap<ResourceId, f64> {
        let mut costs = action.costs.clone();
        for (resource, cost) in self.content.catalog().global_action_costs() {
            *costs.entry(resource.clone()).or_insert(0.0) += cost;
        }
        costs.retain(|_, cost| *cost > 0.0);
        costs
    }

    // -----------------------------------------------------------------------
    // Clone-and-commit
    // -----------------------------------------------------------------------

    fn current_phase(&self) -> Result<&PhaseConfig, SessionError> {
        self.clock.phase().ok_or(SessionError::OutOfRange)
    }

    fn working_copy(&self, index: usize) -> Result<PlayerState, SessionError> {
        self.players.get(index).cloned().ok_or(SessionError::OutOfRange)
    }

    /// Run `op` against `player`, then re-synchronise its tier tracks.
    fn run<T>(
        &self,
        player: &mut PlayerState,
        op: impl FnOnce(&mut EffectContext<'_>) -> Result<T, EffectError>,
    ) -> Result<(T, Vec<ResourceGain>), EffectError> {
        let mut ctx = EffectContext::new(&self.registry, &self.content, &self.config.rules, player);
        let value = op(&mut ctx)?;
        sync_tiers(&mut ctx)?;
        Ok((value, ctx.take_gains()))
    }

    /// Replace the live state of player `index` and record `gains`.
    fn commit(&mut self, index: usize, player: PlayerState, gains: Vec<ResourceGain>) {
        if let Some(slot) = self.players.get_mut(index) {
            *slot = player;
        }
        let limit = self.config.session.recent_gain_limit;
        self.recent_gains.extend(gains);
        while self.recent_gains.len() > limit {
            self.recent_gains.pop_front();
        }
    }

    fn setup_player(&mut self, index: usize, start: &StartConfig) -> Result<(), SessionError> {
        let mut working = self.working_copy(index)?;
        self.run(&mut working, |ctx| {
            let catalog = ctx.catalog();
            for (resource, amount) in &start.resources {
                let change = ctx
                    .player
                    .resources
                    .set_amount(catalog, resource, *amount, Reconciliation::Reject)?;
                ctx.record(&change);
            }
            if start.lands > 0 {
                let lands = EffectDef::new("land", "add").with_params(json!({ "count": start.lands }));
                ctx.apply(&lands, 1)?;
            }
            for building in &start.buildings {
                add_building(ctx, building)?;
            }
            ctx.apply_all(&start.effects)
        })?;
        debug!(player = %working.id, lands = working.lands.len(), "Player set up");
        self.commit(index, working, Vec::new());
        Ok(())
    }
}

/// `resource >= cost`, so an unaffordable cost reads like any other unmet
/// requirement.
fn cost_requirement(resource: &ResourceId, cost: f64) -> RequirementDef {
    RequirementDef::compare(
        Operand::Evaluator(EvaluatorOperand::Resource {
            key: resource.clone(),
        }),
        CompareOperator::Gte,
        Operand::Literal(cost),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::{PlayerConfig, StepConfig};

    fn content() -> ContentRegistry {
        ContentRegistry::from_value(json!({
            "resources": [
                { "id": "gold", "label": "Gold", "lowerBound": 0 },
                { "id": "ap", "label": "Action Points", "lowerBound": 0,
                  "globalActionCost": { "amount": 1 } }
            ],
            "actions": [
                { "id": "tax", "name": "Tax", "effects": [
                    { "type": "resource", "method": "add", "params": { "resourceId": "gold", "amount": 2 } }
                ] },
                { "id": "build", "name": "Build", "costs": { "gold": 5 } }
            ]
        }))
        .unwrap()
    }

    fn config() -> EngineConfig {
        EngineConfig {
            phases: vec![
                PhaseConfig::new("growth").with_steps(vec![StepConfig::new("income").with_effects(vec![
                    EffectDef::new("resource", "add").with_params(json!({ "resourceId": "ap", "amount": 1 })),
                ])]),
                PhaseConfig::new("main").with_actions(),
            ],
            players: vec![PlayerConfig {
                id: "A".into(),
                name: "Alice".to_owned(),
            }],
            ..EngineConfig::default()
        }
    }

    #[test]
    fn first_step_runs_at_start() {
        let session = GameSession::new(config(), content()).unwrap();
        let player = session.active_player().unwrap();
        assert!((player.resources.amount("ap") - 1.0).abs() < f64::EPSILON);
        assert_eq!(session.progress().phase.as_str(), "growth");
    }

    #[test]
    fn actions_outside_action_phases_are_refused() {
        let mut session = GameSession::new(config(), content()).unwrap();
        let err = session.perform_action("tax", &ActionParams::new()).unwrap_err();
        assert!(matches!(err, SessionError::NotActionPhase { .. }));
    }

    #[test]
    fn global_action_cost_is_charged() {
        let mut session = GameSession::new(config(), content()).unwrap();
        session.advance().unwrap();
        let outcome = session.perform_action("tax", &ActionParams::new()).unwrap();
        assert!(outcome.is_completed());
        let player = session.active_player().unwrap();
        assert!(player.resources.amount("ap").abs() < f64::EPSILON);
        assert!((player.resources.amount("gold") - 2.0).abs() < f64::EPSILON);

        let again = session.perform_action("tax", &ActionParams::new()).unwrap();
        assert_eq!(
            again.first_failure().map(|failure| failure.message.as_str()),
            Some("Action Points (0) must be at least 1")
        );
    }

    #[test]
    fn costs_and_requirements_are_reported_together() {
        let mut session = GameSession::new(config(), content()).unwrap();
        session.advance().unwrap();
        session.perform_action("tax", &ActionParams::new()).unwrap();

        let outcome = session.perform_action("build", &ActionParams::new()).unwrap();
        let messages: Vec<String> = match outcome {
            ActionOutcome::Rejected { failures, .. } => failures.into_iter().map(|f| f.message).collect(),
            ActionOutcome::Completed { .. } => Vec::new(),
        };
        assert_eq!(
            messages,
            ["Action Points (0) must be at least 1", "Gold (2) must be at least 5"]
        );
        let player = session.active_player().unwrap();
        assert!((player.resources.amount("gold") - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_actions_are_errors() {
        let mut session = GameSession::new(config(), content()).unwrap();
        session.advance().unwrap();
        assert!(matches!(
            session.perform_action("conquer", &ActionParams::new()),
            Err(SessionError::UnknownAction(_))
        ));
    }

    #[test]
    fn recent_gains_are_bounded() {
        let mut config = config();
        config.session.recent_gain_limit = 2;
        let mut session = GameSession::new(config, content()).unwrap();
        for _ in 0..6 {
            session.advance().unwrap();
        }
        assert_eq!(session.recent_gains().count(), 2);
    }
}
