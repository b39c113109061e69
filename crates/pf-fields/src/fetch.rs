//! Top-level fetch paths for direct and derived quantities.

use pf_core::{Real, UnitInfo};
use tracing::trace;

use crate::availability::{check_requested_quantity, check_snapshot_support};
use crate::error::FieldResult;
use crate::evaluator::Evaluator;
use crate::quantity::{DerivedQuantity, DirectQuantity, Quantity, QuantityKind};
use crate::registry::QuantityRegistry;
use crate::snapshot::Snapshot;

/// Result of fetching a derived quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFetch {
    /// Unit metadata as registered.
    pub unit: UnitInfo,
    /// Per-particle values, already multiplied by `scaling_factor`.
    pub values: Vec<Real>,
    /// Factor that was applied to `values`.
    pub scaling_factor: i64,
}

/// Result of [`fetch`], shaped by the quantity's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    /// Raw snapshot array in the requested unit.
    Direct(Vec<Real>),
    Derived(DerivedFetch),
}

impl Fetched {
    pub fn kind(&self) -> QuantityKind {
        match self {
            Self::Direct(_) => QuantityKind::Direct,
            Self::Derived(_) => QuantityKind::Derived,
        }
    }

    pub fn values(&self) -> &[Real] {
        match self {
            Self::Direct(values) => values,
            Self::Derived(fetched) => &fetched.values,
        }
    }

    pub fn into_values(self) -> Vec<Real> {
        match self {
            Self::Direct(values) => values,
            Self::Derived(fetched) => fetched.values,
        }
    }
}

impl DirectQuantity {
    /// Extract this quantity from the snapshot, converted to `unit`.
    pub fn fetch(self, snapshot: &dyn Snapshot, unit: &str) -> FieldResult<Vec<Real>> {
        check_snapshot_support(self.name(), snapshot.dimensionality(), snapshot.is_live())?;
        Ok(snapshot.extract_array(self.name(), unit)?)
    }
}

impl DerivedQuantity {
    /// Evaluate this quantity, apply its scaling factor once, and attach its
    /// unit metadata.
    pub fn fetch(
        &self,
        registry: &QuantityRegistry,
        snapshot: &dyn Snapshot,
    ) -> FieldResult<DerivedFetch> {
        check_snapshot_support(self.name(), snapshot.dimensionality(), snapshot.is_live())?;
        let mut values = Evaluator::new(registry, snapshot).evaluate_quantity(self)?;
        self.apply_scaling(&mut values);
        Ok(DerivedFetch {
            unit: self.unit().clone(),
            values,
            scaling_factor: self.scaling_factor(),
        })
    }
}

/// Validate `name` against the snapshot, then fetch it.
///
/// `unit` applies to direct quantities only; derived quantities carry their
/// registered unit metadata and read their operands in the snapshot's
/// default unit.
pub fn fetch(
    registry: &QuantityRegistry,
    name: &str,
    snapshot: &dyn Snapshot,
    unit: &str,
) -> FieldResult<Fetched> {
    let kind = check_requested_quantity(registry, name, snapshot)?;
    trace!(name, %kind, unit, "fetching quantity");
    match registry.resolve(name)? {
        Quantity::Direct(direct) => Ok(Fetched::Direct(direct.fetch(snapshot, unit)?)),
        Quantity::Derived(derived) => Ok(Fetched::Derived(derived.fetch(registry, snapshot)?)),
    }
}
