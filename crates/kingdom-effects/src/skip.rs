//! Per-player phase and step suppression.
//!
//! A phase (or a step within a phase) is skipped while at least one source
//! suppresses it. Sources are kept as sets, so adding the same source twice
//! is a no-op and a single removal clears it. Removing the last source
//! deletes the entry entirely: the registry never stores an empty set, and
//! "is skipped" is simply "has an entry".
//!
//! The maps are private; all mutation goes through [`SkipRegistry`]
//! methods. Deserialisation prunes empty entries left behind by older or
//! hand-edited data.

use std::collections::{BTreeMap, BTreeSet};

use kingdom_types::{PhaseId, SkipSnapshot, SourceId, StepId};
use serde::{Deserialize, Serialize};

/// Phase and step suppression table of one player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawSkipRegistry")]
pub struct SkipRegistry {
    skip_phases: BTreeMap<PhaseId, BTreeSet<SourceId>>,
    skip_steps: BTreeMap<PhaseId, BTreeMap<StepId, BTreeSet<SourceId>>>,
}

/// Unvalidated wire form of [`SkipRegistry`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSkipRegistry {
    #[serde(default)]
    skip_phases: BTreeMap<PhaseId, BTreeSet<SourceId>>,
    #[serde(default)]
    skip_steps: BTreeMap<PhaseId, BTreeMap<StepId, BTreeSet<SourceId>>>,
}

impl From<RawSkipRegistry> for SkipRegistry {
    fn from(raw: RawSkipRegistry) -> Self {
        let mut skip_phases = raw.skip_phases;
        skip_phases.retain(|_, sources| !sources.is_empty());

        let mut skip_steps = raw.skip_steps;
        for steps in skip_steps.values_mut() {
            steps.retain(|_, sources| !sources.is_empty());
        }
        skip_steps.retain(|_, steps| !steps.is_empty());

        Self {
            skip_phases,
            skip_steps,
        }
    }
}

impl SkipRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress `phase` on behalf of `source`.
    ///
    /// Returns `true` if the source was not already suppressing the phase.
    pub fn add_phase(&mut self, phase: &PhaseId, source: &SourceId) -> bool {
        self.skip_phases
            .entry(phase.clone())
            .or_default()
            .insert(source.clone())
    }

    /// Withdraw `source`'s suppression of `phase`.
    ///
    /// Removing a source that was never added is a no-op. Returns `true` if
    /// the source was present.
    pub fn remove_phase(&mut self, phase: &PhaseId, source: &SourceId) -> bool {
        let Some(sources) = self.skip_phases.get_mut(phase) else {
            return false;
        };
        let removed = sources.remove(source);
        if sources.is_empty() {
            self.skip_phases.remove(phase);
        }
        removed
    }

    /// Suppress `step` of `phase` on behalf of `source`.
    pub fn add_step(&mut self, phase: &PhaseId, step: &StepId, source: &SourceId) -> bool {
        self.skip_steps
            .entry(phase.clone())
            .or_default()
            .entry(step.clone())
            .or_default()
            .insert(source.clone())
    }

    /// Withdraw `source`'s suppression of `step` of `phase`.
    pub fn remove_step(&mut self, phase: &PhaseId, step: &StepId, source: &SourceId) -> bool {
        let Some(steps) = self.skip_steps.get_mut(phase) else {
            return false;
        };
        let Some(sources) = steps.get_mut(step) else {
            return false;
        };
        let removed = sources.remove(source);
        if sources.is_empty() {
            steps.remove(step);
        }
        if steps.is_empty() {
            self.skip_steps.remove(phase);
        }
        removed
    }

    /// Whether any source suppresses `phase`.
    pub fn is_phase_skipped(&self, phase: &str) -> bool {
        self.skip_phases.contains_key(phase)
    }

    /// Whether any source suppresses `step` of `phase`.
    pub fn is_step_skipped(&self, phase: &str, step: &str) -> bool {
        self.skip_steps
            .get(phase)
            .is_some_and(|steps| steps.contains_key(step))
    }

    /// Sources currently suppressing `phase`.
    pub fn phase_sources(&self, phase: &str) -> impl Iterator<Item = &SourceId> {
        self.skip_phases.get(phase).into_iter().flatten()
    }

    /// Whether nothing is suppressed.
    pub fn is_empty(&self) -> bool {
        self.skip_phases.is_empty() && self.skip_steps.is_empty()
    }

    /// Owned copy for the session snapshot.
    pub fn snapshot(&self) -> SkipSnapshot {
        SkipSnapshot {
            phases: self
                .skip_phases
                .iter()
                .map(|(phase, sources)| (phase.clone(), sources.iter().cloned().collect()))
                .collect(),
            steps: self
                .skip_steps
                .iter()
                .map(|(phase, steps)| {
                    let steps = steps
                        .iter()
                        .map(|(step, sources)| (step.clone(), sources.iter().cloned().collect()))
                        .collect();
                    (phase.clone(), steps)
                })
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn phase(id: &str) -> PhaseId {
        PhaseId::new(id)
    }

    fn source(id: &str) -> SourceId {
        SourceId::new(id)
    }

    #[test]
    fn duplicate_add_then_single_remove_clears() {
        let mut skips = SkipRegistry::new();
        assert!(skips.add_phase(&phase("growth"), &source("A")));
        assert!(!skips.add_phase(&phase("growth"), &source("A")));
        assert!(skips.remove_phase(&phase("growth"), &source("A")));
        assert!(!skips.is_phase_skipped("growth"));
        assert!(skips.is_empty());
    }

    #[test]
    fn phase_stays_skipped_until_all_sources_removed() {
        let mut skips = SkipRegistry::new();
        skips.add_phase(&phase("growth"), &source("A"));
        skips.add_phase(&phase("growth"), &source("B"));
        skips.remove_phase(&phase("growth"), &source("A"));
        assert!(skips.is_phase_skipped("growth"));
        let remaining: Vec<&str> = skips.phase_sources("growth").map(SourceId::as_str).collect();
        assert_eq!(remaining, vec!["B"]);
        skips.remove_phase(&phase("growth"), &source("B"));
        assert!(!skips.is_phase_skipped("growth"));
    }

    #[test]
    fn removing_unknown_source_is_a_no_op() {
        let mut skips = SkipRegistry::new();
        assert!(!skips.remove_phase(&phase("growth"), &source("ghost")));
        skips.add_phase(&phase("growth"), &source("A"));
        assert!(!skips.remove_phase(&phase("growth"), &source("ghost")));
        assert!(skips.is_phase_skipped("growth"));
        assert!(!skips.remove_step(&phase("growth"), &StepId::new("gain-income"), &source("A")));
    }

    #[test]
    fn step_removal_cleans_both_levels() {
        let mut skips = SkipRegistry::new();
        let step = StepId::new("war-recovery");
        skips.add_step(&phase("upkeep"), &step, &source("A"));
        assert!(skips.is_step_skipped("upkeep", "war-recovery"));
        assert!(!skips.is_phase_skipped("upkeep"));
        skips.remove_step(&phase("upkeep"), &step, &source("A"));
        assert!(!skips.is_step_skipped("upkeep", "war-recovery"));
        assert!(skips.is_empty());
        assert!(skips.snapshot().steps.is_empty());
    }

    #[test]
    fn deserialisation_prunes_empty_entries() {
        let json = r#"{
            "skipPhases": { "growth": [], "upkeep": ["A"] },
            "skipSteps": { "growth": { "income": [] }, "upkeep": {} }
        }"#;
        let skips: SkipRegistry = serde_json::from_str(json).unwrap();
        assert!(!skips.is_phase_skipped("growth"));
        assert!(skips.is_phase_skipped("upkeep"));
        assert!(!skips.is_step_skipped("growth", "income"));
        let snapshot = skips.snapshot();
        assert_eq!(snapshot.phases.len(), 1);
        assert!(snapshot.steps.is_empty());
    }

    #[test]
    fn json_round_trip_preserves_sources() {
        let mut skips = SkipRegistry::new();
        skips.add_phase(&phase("growth"), &source("A"));
        skips.add_step(&phase("upkeep"), &StepId::new("pay"), &source("B"));
        let json = serde_json::to_string(&skips).unwrap();
        let restored: SkipRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, skips);
    }
}
