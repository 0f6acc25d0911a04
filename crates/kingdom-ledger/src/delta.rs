//! Builder for validated resource mutations.
//!
//! A [`ResourceDelta`] names the resource, the direction and magnitude of the
//! change, an optional rounding mode and the bound reconciliation policy.
//! [`PlayerResources::apply`](crate::PlayerResources::apply) consumes it.

use kingdom_types::{DeltaKind, Reconciliation, ResourceId, RoundingMode};

use crate::LedgerError;
use crate::rounding::round;

// ---------------------------------------------------------------------------
// Delta builder
// ---------------------------------------------------------------------------

/// A single pending change to one resource.
///
/// # Examples
///
/// ```
/// use kingdom_ledger::ResourceDelta;
/// use kingdom_types::{Reconciliation, RoundingMode};
///
/// let delta = ResourceDelta::remove("gold", 2.4)
///     .rounded(RoundingMode::Up)
///     .clamped();
///
/// assert_eq!(delta.reconciliation(), Reconciliation::Clamp);
/// assert_eq!(delta.signed_amount().ok(), Some(-3.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDelta {
    resource: ResourceId,
    kind: DeltaKind,
    magnitude: f64,
    rounding: Option<RoundingMode>,
    reconciliation: Reconciliation,
}

impl ResourceDelta {
    /// Increase `resource` by `amount`.
    pub fn add(resource: impl Into<ResourceId>, amount: f64) -> Self {
        Self::new(resource.into(), DeltaKind::Add, amount)
    }

    /// Decrease `resource` by `amount`.
    pub fn remove(resource: impl Into<ResourceId>, amount: f64) -> Self {
        Self::new(resource.into(), DeltaKind::Remove, amount)
    }

    /// Change `resource` by an already-signed amount.
    pub fn signed(resource: impl Into<ResourceId>, amount: f64) -> Self {
        Self::add(resource, amount)
    }

    const fn new(resource: ResourceId, kind: DeltaKind, magnitude: f64) -> Self {
        Self {
            resource,
            kind,
            magnitude,
            rounding: None,
            reconciliation: Reconciliation::Reject,
        }
    }

    /// Round the magnitude with `mode` before mutating.
    #[must_use]
    pub const fn rounded(mut self, mode: RoundingMode) -> Self {
        self.rounding = Some(mode);
        self
    }

    /// Set the bound reconciliation policy.
    #[must_use]
    pub const fn reconcile(mut self, policy: Reconciliation) -> Self {
        self.reconciliation = policy;
        self
    }

    /// Shorthand for `reconcile(Reconciliation::Clamp)`.
    #[must_use]
    pub const fn clamped(self) -> Self {
        self.reconcile(Reconciliation::Clamp)
    }

    /// The resource being changed.
    pub const fn resource(&self) -> &ResourceId {
        &self.resource
    }

    /// Direction of the change.
    pub const fn kind(&self) -> DeltaKind {
        self.kind
    }

    /// The bound reconciliation policy.
    pub const fn reconciliation(&self) -> Reconciliation {
        self.reconciliation
    }

    /// Validate the magnitude and produce the signed amount to add.
    ///
    /// Rounding is applied to the magnitude before the sign, so removing
    /// `2.5` with `nearest` removes `3`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] if the magnitude is NaN or
    /// infinite.
    pub fn signed_amount(&self) -> Result<f64, LedgerError> {
        if !self.magnitude.is_finite() {
            return Err(LedgerError::InvalidAmount {
                resource: self.resource.clone(),
                amount: self.magnitude,
            });
        }
        let magnitude = self
            .rounding
            .map_or(self.magnitude, |mode| round(self.magnitude, mode));
        Ok(match self.kind {
            DeltaKind::Add => magnitude,
            DeltaKind::Remove => -magnitude,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_negates_after_rounding() {
        let delta = ResourceDelta::remove("gold", 2.5).rounded(RoundingMode::Nearest);
        assert_eq!(delta.signed_amount().ok(), Some(-3.0));
    }

    #[test]
    fn add_without_rounding_keeps_fraction() {
        let delta = ResourceDelta::add("gold", 1.25);
        assert_eq!(delta.signed_amount().ok(), Some(1.25));
        assert_eq!(delta.kind(), DeltaKind::Add);
        assert_eq!(delta.reconciliation(), Reconciliation::Reject);
    }

    #[test]
    fn non_finite_amounts_are_rejected() {
        for amount in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = ResourceDelta::add("gold", amount).signed_amount();
            assert!(matches!(result, Err(LedgerError::InvalidAmount { .. })));
        }
    }
}
