//! Resource handlers: flat and percent deltas, and upper-bound increases.

use kingdom_ledger::{PlayerResources, ResourceCatalog, ResourceDelta, round};
use kingdom_types::{DeltaKind, EffectDef, Reconciliation, ResourceBounds, ResourceId, RoundingMode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::context::EffectContext;
use crate::error::EffectError;
use crate::registry::parse_params;

/// Params of `resource.add` and `resource.remove`.
///
/// Exactly one of `amount` or `percent` must be present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceChangeParams {
    /// The resource to change.
    pub resource_id: ResourceId,
    /// Flat magnitude, scaled by `mult`.
    #[serde(default)]
    pub amount: Option<f64>,
    /// Percentage of the current amount, scaled by `mult`.
    #[serde(default)]
    pub percent: Option<f64>,
    /// Rounding mode. Percent deltas default to `nearest`; flat deltas are
    /// only rounded when a mode is given.
    #[serde(default)]
    pub rounding: Option<RoundingMode>,
}

/// Params of `resource.increase_upper_bound`.
///
/// `amount` and `key` are kept as raw JSON so that malformed definitions
/// are reported as [`EffectError::InvalidBoundIncrease`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpperBoundParams {
    /// The resource whose upper bound is raised.
    pub resource_id: ResourceId,
    /// Non-negative increase.
    #[serde(default)]
    pub amount: Option<Value>,
    /// Legacy field; its presence is rejected.
    #[serde(default)]
    pub key: Option<Value>,
}

/// `resource.add`
pub fn handle_add(ctx: &mut EffectContext<'_>, effect: &EffectDef, mult: u32) -> Result<(), EffectError> {
    change_resource(ctx, effect, mult, DeltaKind::Add)
}

/// `resource.remove`
pub fn handle_remove(ctx: &mut EffectContext<'_>, effect: &EffectDef, mult: u32) -> Result<(), EffectError> {
    change_resource(ctx, effect, mult, DeltaKind::Remove)
}

fn change_resource(
    ctx: &mut EffectContext<'_>,
    effect: &EffectDef,
    mult: u32,
    kind: DeltaKind,
) -> Result<(), EffectError> {
    let params: ResourceChangeParams = parse_params(effect)?;
    let catalog = ctx.catalog();

    let delta = match (params.amount, params.percent) {
        (Some(amount), None) => {
            let magnitude = amount * f64::from(mult);
            let delta = match kind {
                DeltaKind::Add => ResourceDelta::add(params.resource_id, magnitude),
                DeltaKind::Remove => ResourceDelta::remove(params.resource_id, magnitude),
            };
            match params.rounding {
                Some(mode) => delta.rounded(mode),
                None => delta,
            }
        }
        (None, Some(percent)) => {
            let signed = resolve_percent_delta(
                &ctx.player.resources,
                catalog,
                &params.resource_id,
                percent,
                mult,
                params.rounding.unwrap_or_default(),
                kind,
            )?;
            ResourceDelta::signed(params.resource_id, signed)
        }
        _ => {
            return Err(EffectError::InvalidParams {
                effect: effect.key(),
                reason: "exactly one of amount or percent is required".to_owned(),
            });
        }
    };

    let change = ctx
        .player
        .resources
        .apply(catalog, &delta.reconcile(effect.reconciliation()))?;
    ctx.record(&change);
    Ok(())
}

/// Compute a percent-based delta against the current amount.
///
/// `current * percent * mult / 100`, rounded with `rounding`, negated for
/// [`DeltaKind::Remove`].
///
/// # Examples
///
/// ```
/// use kingdom_effects::handlers::resource::resolve_percent_delta;
/// use kingdom_ledger::{PlayerResources, ResourceCatalog, ResourceDelta};
/// use kingdom_types::{DeltaKind, ResourceDefinition, ResourceId, RoundingMode};
///
/// let catalog = ResourceCatalog::new(vec![ResourceDefinition::new("gold", "Gold")], Vec::new())
///     .unwrap_or_default();
/// let mut resources = PlayerResources::new(&catalog);
/// let _ = resources.apply(&catalog, &ResourceDelta::add("gold", 10.0));
///
/// let delta = resolve_percent_delta(
///     &resources,
///     &catalog,
///     &ResourceId::new("gold"),
///     50.0,
///     1,
///     RoundingMode::Nearest,
///     DeltaKind::Remove,
/// );
/// assert_eq!(delta.ok(), Some(-5.0));
/// ```
pub fn resolve_percent_delta(
    resources: &PlayerResources,
    catalog: &ResourceCatalog,
    resource: &ResourceId,
    percent: f64,
    mult: u32,
    rounding: RoundingMode,
    kind: DeltaKind,
) -> Result<f64, EffectError> {
    let current = resources.amount_of(catalog, resource.as_str())?;
    let raw = current * percent * f64::from(mult) / 100.0;
    if !raw.is_finite() {
        return Err(EffectError::NonFiniteResult {
            resource: resource.clone(),
            value: raw,
        });
    }
    let rounded = round(raw, rounding);
    Ok(match kind {
        DeltaKind::Add => rounded,
        DeltaKind::Remove => -rounded,
    })
}

/// `resource.increase_upper_bound`
///
/// Requires `reconciliation: clamp`, a numeric non-negative `amount` and no
/// `key`. The increase is additive and an existing lower bound is preserved.
/// A resource without an upper bound is already unbounded above, so its
/// bounds are left alone.
pub fn handle_increase_upper_bound(
    ctx: &mut EffectContext<'_>,
    effect: &EffectDef,
    mult: u32,
) -> Result<(), EffectError> {
    let params: UpperBoundParams = parse_params(effect)?;
    let resource = params.resource_id;
    let invalid = |reason: &str| EffectError::InvalidBoundIncrease {
        resource: resource.clone(),
        reason: reason.to_owned(),
    };

    if effect.reconciliation() != Reconciliation::Clamp {
        return Err(invalid("reconciliation must be clamp"));
    }
    if params.key.is_some() {
        return Err(invalid("key is not allowed, use resourceId"));
    }
    let amount = params
        .amount
        .as_ref()
        .and_then(Value::as_f64)
        .ok_or_else(|| invalid("amount must be a number"))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(invalid("amount must be non-negative"));
    }

    let catalog = ctx.catalog();
    let current = ctx.player.resources.bounds(resource.as_str());
    let Some(upper) = current.upper_bound else {
        debug!(resource = %resource, "no upper bound to increase");
        return Ok(());
    };
    let upper = upper + amount * f64::from(mult);
    let bounds = ResourceBounds::new(current.lower_bound, Some(upper));
    let change = ctx
        .player
        .resources
        .set_bounds(catalog, &resource, bounds, Reconciliation::Clamp)?;
    ctx.record(&change);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::handlers::fixtures::{Harness, player};

    fn add(resource: &str, amount: f64) -> EffectDef {
        EffectDef::new("resource", "add").with_params(json!({ "resourceId": resource, "amount": amount }))
    }

    #[test]
    fn mult_scales_before_rounding() {
        let h = Harness::new();
        let mut p = player(&h.content);
        let mut ctx = EffectContext::new(&h.registry, &h.content, &h.rules, &mut p);
        let effect = EffectDef::new("resource", "add").with_params(json!({
            "resourceId": "gold", "amount": 0.4, "rounding": "nearest"
        }));
        ctx.apply(&effect, 2).unwrap();
        // 0.4 * 2 = 0.8 -> 1; rounding each unit separately would give 0.
        assert!((ctx.player.resources.amount("gold") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn repeat_multiplies_into_mult() {
        let h = Harness::new();
        let mut p = player(&h.content);
        let mut ctx = EffectContext::new(&h.registry, &h.content, &h.rules, &mut p);
        ctx.apply(&add("gold", 2.0).repeated(3), 2).unwrap();
        assert!((ctx.player.resources.amount("gold") - 12.0).abs() < f64::EPSILON);
        assert_eq!(ctx.gains.len(), 1);
    }

    #[test]
    fn remove_below_bound_rejects_unless_clamped() {
        let h = Harness::new();
        let mut p = player(&h.content);
        let mut ctx = EffectContext::new(&h.registry, &h.content, &h.rules, &mut p);
        ctx.apply(&add("gold", 3.0), 1).unwrap();
        let remove = EffectDef::new("resource", "remove")
            .with_params(json!({ "resourceId": "gold", "amount": 5 }));
        assert!(matches!(
            ctx.apply(&remove, 1),
            Err(EffectError::Ledger(kingdom_ledger::LedgerError::BoundViolation { .. }))
        ));
        ctx.apply(&remove.clamped(), 1).unwrap();
        assert!(ctx.player.resources.amount("gold").abs() < f64::EPSILON);
    }

    #[test]
    fn percent_remove_is_negated_after_rounding() {
        let h = Harness::new();
        let mut p = player(&h.content);
        let catalog = h.content.catalog();
        p.resources.apply(catalog, &ResourceDelta::add("gold", 10.0)).unwrap();
        let delta = resolve_percent_delta(
            &p.resources,
            catalog,
            &ResourceId::new("gold"),
            50.0,
            1,
            RoundingMode::Nearest,
            DeltaKind::Remove,
        );
        assert_eq!(delta.ok(), Some(-5.0));

        let mut ctx = EffectContext::new(&h.registry, &h.content, &h.rules, &mut p);
        let effect = EffectDef::new("resource", "remove")
            .with_params(json!({ "resourceId": "gold", "percent": 25 }));
        ctx.apply(&effect, 1).unwrap();
        // 10 * 25% = 2.5 -> nearest 3
        assert!((ctx.player.resources.amount("gold") - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn percent_delta_rejects_non_finite_results() {
        let h = Harness::new();
        let mut p = player(&h.content);
        let catalog = h.content.catalog();
        p.resources.apply(catalog, &ResourceDelta::add("gold", 10.0)).unwrap();
        let result = resolve_percent_delta(
            &p.resources,
            catalog,
            &ResourceId::new("gold"),
            f64::INFINITY,
            1,
            RoundingMode::Nearest,
            DeltaKind::Add,
        );
        assert!(matches!(result, Err(EffectError::NonFiniteResult { .. })));
    }

    #[test]
    fn amount_and_percent_are_exclusive() {
        let h = Harness::new();
        let mut p = player(&h.content);
        let mut ctx = EffectContext::new(&h.registry, &h.content, &h.rules, &mut p);
        let both = EffectDef::new("resource", "add")
            .with_params(json!({ "resourceId": "gold", "amount": 1, "percent": 5 }));
        assert!(matches!(ctx.apply(&both, 1), Err(EffectError::InvalidParams { .. })));
        let missing = EffectDef::new("resource", "add").with_params(json!({ "amount": 1 }));
        assert!(matches!(ctx.apply(&missing, 1), Err(EffectError::InvalidParams { .. })));
    }

    #[test]
    fn unknown_resource_surfaces_as_ledger_error() {
        let h = Harness::new();
        let mut p = player(&h.content);
        let mut ctx = EffectContext::new(&h.registry, &h.content, &h.rules, &mut p);
        assert!(matches!(
            ctx.apply(&add("mana", 1.0), 1),
            Err(EffectError::Ledger(kingdom_ledger::LedgerError::UnknownResource(_)))
        ));
    }

    fn raise(params: Value) -> EffectDef {
        EffectDef::new("resource", "increase_upper_bound").with_params(params)
    }

    #[test]
    fn upper_bound_increase_is_additive_and_keeps_lower_bound() {
        let h = Harness::new();
        let mut p = player(&h.content);
        let mut ctx = EffectContext::new(&h.registry, &h.content, &h.rules, &mut p);
        let effect = raise(json!({ "resourceId": "happiness", "amount": 5 })).clamped();
        ctx.apply(&effect, 1).unwrap();
        let bounds = ctx.player.resources.bounds("happiness");
        assert_eq!(bounds.upper_bound, Some(15.0));
        assert_eq!(bounds.lower_bound, Some(-10.0));
    }

    #[test]
    fn upper_bound_increase_leaves_unbounded_resource_alone() {
        let h = Harness::new();
        let mut p = player(&h.content);
        let mut ctx = EffectContext::new(&h.registry, &h.content, &h.rules, &mut p);
        ctx.apply(&add("gold", 10.0), 1).unwrap();
        let effect = raise(json!({ "resourceId": "gold", "amount": 5 })).clamped();
        ctx.apply(&effect, 1).unwrap();
        assert!((ctx.player.resources.amount("gold") - 10.0).abs() < f64::EPSILON);
        let bounds = ctx.player.resources.bounds("gold");
        assert_eq!(bounds.upper_bound, None);
        assert_eq!(bounds.lower_bound, Some(0.0));
    }

    #[test]
    fn upper_bound_increase_rejects_negative_amount() {
        let h = Harness::new();
        let mut p = player(&h.content);
        let mut ctx = EffectContext::new(&h.registry, &h.content, &h.rules, &mut p);
        let effect = raise(json!({ "resourceId": "happiness", "amount": -5 })).clamped();
        assert!(matches!(
            ctx.apply(&effect, 1),
            Err(EffectError::InvalidBoundIncrease { .. })
        ));
        assert_eq!(ctx.player.resources.bounds("happiness").upper_bound, Some(10.0));
    }

    #[test]
    fn upper_bound_increase_guards() {
        let h = Harness::new();
        let mut p = player(&h.content);
        let mut ctx = EffectContext::new(&h.registry, &h.content, &h.rules, &mut p);
        let not_clamped = raise(json!({ "resourceId": "happiness", "amount": 5 }));
        let with_key = raise(json!({ "resourceId": "happiness", "amount": 5, "key": "happiness" })).clamped();
        let not_numeric = raise(json!({ "resourceId": "happiness", "amount": "5" })).clamped();
        for effect in [not_clamped, with_key, not_numeric] {
            assert!(matches!(
                ctx.apply(&effect, 1),
                Err(EffectError::InvalidBoundIncrease { .. })
            ));
        }
    }
}
