//! Requirement evaluation.
//!
//! Requirements are `{type: "evaluator", method: "compare", params}` nodes
//! comparing two operands. Each operand is a literal or an evaluator that
//! reads the player's state (a resource, a stat, population, owned
//! buildings, lands or developments).
//!
//! An unmet requirement is data: it yields a [`RequirementFailure`] with the
//! resolved operand values and a display message. Only structural problems
//! (unknown evaluator, malformed params, unknown resource) are errors.

use kingdom_types::{
    CompareParams, EvaluatorOperand, FailureDetails, Operand, RequirementDef, RequirementFailure,
};
use tracing::debug;

use crate::config::RulesConfig;
use crate::content::ContentRegistry;
use crate::error::EffectError;
use crate::player::PlayerState;

/// How many failures to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationMode {
    /// Stop at the first unmet requirement.
    FirstFailure,
    /// Report every unmet requirement.
    CollectAll,
}

/// Validate the node's `(type, method)` and parse its params.
pub fn compare_params(requirement: &RequirementDef) -> Result<CompareParams, EffectError> {
    if requirement.kind != "evaluator" || requirement.method != "compare" {
        return Err(EffectError::UnknownRequirement {
            kind: requirement.kind.clone(),
            method: requirement.method.clone(),
        });
    }
    serde_json::from_value(requirement.params.clone()).map_err(|err| EffectError::InvalidParams {
        effect: "evaluator.compare".to_owned(),
        reason: err.to_string(),
    })
}

/// Evaluates requirements against one player.
#[derive(Debug, Clone, Copy)]
pub struct RequirementEvaluator<'a> {
    content: &'a ContentRegistry,
    rules: &'a RulesConfig,
}

impl<'a> RequirementEvaluator<'a> {
    /// Create an evaluator over static content and rules.
    pub const fn new(content: &'a ContentRegistry, rules: &'a RulesConfig) -> Self {
        Self { content, rules }
    }

    /// Evaluate `requirements` in order.
    ///
    /// Returns the unmet requirements; an empty list means every
    /// requirement holds. Each failure is an owned copy.
    pub fn evaluate(
        &self,
        player: &PlayerState,
        requirements: &[RequirementDef],
        mode: EvaluationMode,
    ) -> Result<Vec<RequirementFailure>, EffectError> {
        let mut failures = Vec::new();
        for requirement in requirements {
            if let Some(failure) = self.check(player, requirement)? {
                failures.push(failure);
                if mode == EvaluationMode::FirstFailure {
                    break;
                }
            }
        }
        debug!(player = %player.id, checked = requirements.len(), failed = failures.len(), "requirements evaluated");
        Ok(failures)
    }

    /// Evaluate one requirement.
    pub fn check(
        &self,
        player: &PlayerState,
        requirement: &RequirementDef,
    ) -> Result<Option<RequirementFailure>, EffectError> {
        let params = compare_params(requirement)?;
        let left = self.resolve(player, &params.left)?;
        let right = self.resolve(player, &params.right)?;
        if params.operator.holds(left, right) {
            return Ok(None);
        }
        let details = FailureDetails { left, right };
        Ok(Some(RequirementFailure {
            requirement: requirement.clone(),
            details,
            message: self.message(&params, details),
        }))
    }

    /// Resolve an operand to a number.
    pub fn resolve(&self, player: &PlayerState, operand: &Operand) -> Result<f64, EffectError> {
        let catalog = self.content.catalog();
        let value = match operand {
            Operand::Literal(value) => *value,
            Operand::Evaluator(evaluator) => match evaluator {
                EvaluatorOperand::Resource { key } | EvaluatorOperand::Stat { key } => {
                    player.resources.amount_of(catalog, key.as_str())?
                }
                EvaluatorOperand::Population { role } => {
                    let key = role.as_ref().unwrap_or(&self.rules.population_resource);
                    player.resources.amount_of(catalog, key.as_str())?
                }
                EvaluatorOperand::Building { id } => {
                    if player.buildings.contains(id) { 1.0 } else { 0.0 }
                }
                EvaluatorOperand::Land {} => count(player.lands.len()),
                EvaluatorOperand::Development { id } => count(player.development_count(id.as_str())),
            },
        };
        Ok(value)
    }

    fn message(&self, params: &CompareParams, details: FailureDetails) -> String {
        if self.is_capacity_check(params) {
            return format!(
                "Population is at capacity ({}/{})",
                details.left, details.right
            );
        }
        format!(
            "{} must be {} {}",
            self.describe(&params.left, details.left),
            params.operator.phrase(),
            self.describe(&params.right, details.right),
        )
    }

    /// Roleless population on the left, the max-population stat on the right.
    fn is_capacity_check(&self, params: &CompareParams) -> bool {
        let roleless_population = matches!(
            params.left,
            Operand::Evaluator(EvaluatorOperand::Population { role: None })
        );
        let capacity_stat = matches!(
            &params.right,
            Operand::Evaluator(EvaluatorOperand::Stat { key }) if *key == self.rules.max_population_stat
        );
        roleless_population && capacity_stat
    }

    fn describe(&self, operand: &Operand, value: f64) -> String {
        let catalog = self.content.catalog();
        let label = match operand {
            Operand::Literal(_) => return value.to_string(),
            Operand::Evaluator(evaluator) => match evaluator {
                EvaluatorOperand::Resource { key } | EvaluatorOperand::Stat { key } => {
                    catalog.label(key.as_str())
                }
                EvaluatorOperand::Population { role } => {
                    let key = role.as_ref().unwrap_or(&self.rules.population_resource);
                    catalog.label(key.as_str())
                }
                EvaluatorOperand::Building { id } => self
                    .content
                    .building(id.as_str())
                    .map_or_else(|| id.to_string(), |b| b.name.clone()),
                EvaluatorOperand::Land {} => "Lands".to_owned(),
                EvaluatorOperand::Development { id } => self
                    .content
                    .development(id.as_str())
                    .map_or_else(|| id.to_string(), |d| d.name.clone()),
            },
        };
        format!("{label} ({value})")
    }
}

fn count(n: usize) -> f64 {
    f64::from(u32::try_from(n).unwrap_or(u32::MAX))
}

/// Evaluate `requirements` for `player`; see [`RequirementEvaluator::evaluate`].
pub fn evaluate_requirements(
    requirements: &[RequirementDef],
    player: &PlayerState,
    content: &ContentRegistry,
    rules: &RulesConfig,
    mode: EvaluationMode,
) -> Result<Vec<RequirementFailure>, EffectError> {
    RequirementEvaluator::new(content, rules).evaluate(player, requirements, mode)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kingdom_ledger::ResourceDelta;
    use kingdom_types::{BuildingId, CompareOperator, Land, ResourceId};
    use serde_json::json;

    use super::*;
    use crate::handlers::fixtures::{content, player};

    fn resource(key: &str) -> Operand {
        Operand::Evaluator(EvaluatorOperand::Resource {
            key: ResourceId::new(key),
        })
    }

    fn capacity_requirement() -> RequirementDef {
        serde_json::from_value(json!({
            "type": "evaluator",
            "method": "compare",
            "params": {
                "left": { "type": "population", "params": {} },
                "right": { "type": "stat", "params": { "key": "maxPopulation" } },
                "operator": "lt"
            }
        }))
        .unwrap()
    }

    #[test]
    fn capacity_message_for_roleless_population() {
        let content = content();
        let rules = RulesConfig::default();
        let mut p = player(&content);
        let catalog = content.catalog();
        p.resources.apply(catalog, &ResourceDelta::add("maxPopulation", 5.0)).unwrap();
        p.resources.apply(catalog, &ResourceDelta::add("council", 2.0)).unwrap();
        p.resources.apply(catalog, &ResourceDelta::add("legion", 3.0)).unwrap();

        let failures = evaluate_requirements(
            &[capacity_requirement()],
            &p,
            &content,
            &rules,
            EvaluationMode::CollectAll,
        )
        .unwrap();
        let failure = failures.first().unwrap();
        assert_eq!(failure.details, FailureDetails { left: 5.0, right: 5.0 });
        assert!(failure.message.contains("Population is at capacity (5/5)"));
        assert_eq!(failure.requirement, capacity_requirement());
    }

    #[test]
    fn population_with_role_uses_generic_message() {
        let content = content();
        let rules = RulesConfig::default();
        let p = player(&content);
        let requirement = RequirementDef::compare(
            Operand::Evaluator(EvaluatorOperand::Population {
                role: Some(ResourceId::new("legion")),
            }),
            CompareOperator::Gte,
            Operand::Literal(1.0),
        );
        let failure = RequirementEvaluator::new(&content, &rules)
            .check(&p, &requirement)
            .unwrap()
            .unwrap();
        assert_eq!(failure.message, "Legion (0) must be at least 1");
    }

    #[test]
    fn first_failure_short_circuits_and_collect_all_does_not() {
        let content = content();
        let rules = RulesConfig::default();
        let p = player(&content);
        let requirements = vec![
            RequirementDef::compare(resource("gold"), CompareOperator::Gte, Operand::Literal(3.0)),
            RequirementDef::compare(resource("happiness"), CompareOperator::Gt, Operand::Literal(0.0)),
            RequirementDef::compare(resource("gold"), CompareOperator::Lt, Operand::Literal(10.0)),
        ];
        let evaluator = RequirementEvaluator::new(&content, &rules);
        let first = evaluator
            .evaluate(&p, &requirements, EvaluationMode::FirstFailure)
            .unwrap();
        let all = evaluator
            .evaluate(&p, &requirements, EvaluationMode::CollectAll)
            .unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(all.len(), 2);
        assert_eq!(
            all.first().map(|f| f.message.as_str()),
            Some("Gold (0) must be at least 3")
        );
    }

    #[test]
    fn structural_evaluators_count_state() {
        let content = content();
        let rules = RulesConfig::default();
        let mut p = player(&content);
        p.buildings.insert(BuildingId::new("mill"));
        let mut land = Land::new("A-L1", 2);
        land.developments.push(kingdom_types::DevelopmentId::new("farm"));
        p.lands.push(land);
        p.lands.push(Land::new("A-L2", 1));

        let evaluator = RequirementEvaluator::new(&content, &rules);
        let building = Operand::Evaluator(EvaluatorOperand::Building {
            id: BuildingId::new("mill"),
        });
        let lands = Operand::Evaluator(EvaluatorOperand::Land {});
        let farms = Operand::Evaluator(EvaluatorOperand::Development {
            id: kingdom_types::DevelopmentId::new("farm"),
        });
        assert!((evaluator.resolve(&p, &building).unwrap() - 1.0).abs() < f64::EPSILON);
        assert!((evaluator.resolve(&p, &lands).unwrap() - 2.0).abs() < f64::EPSILON);
        assert!((evaluator.resolve(&p, &farms).unwrap() - 1.0).abs() < f64::EPSILON);

        let requirement = RequirementDef::compare(building, CompareOperator::Eq, Operand::Literal(0.0));
        let failure = evaluator.check(&p, &requirement).unwrap().unwrap();
        assert_eq!(failure.message, "Mill (1) must be exactly 0");
    }

    #[test]
    fn structural_problems_are_errors() {
        let content = content();
        let rules = RulesConfig::default();
        let p = player(&content);
        let evaluator = RequirementEvaluator::new(&content, &rules);

        let unknown = RequirementDef {
            kind: "oracle".to_owned(),
            method: "ask".to_owned(),
            params: json!({}),
        };
        assert!(matches!(
            evaluator.check(&p, &unknown),
            Err(EffectError::UnknownRequirement { .. })
        ));

        let missing = RequirementDef::compare(resource("mana"), CompareOperator::Gt, Operand::Literal(0.0));
        assert!(matches!(evaluator.check(&p, &missing), Err(EffectError::Ledger(_))));
    }
}
