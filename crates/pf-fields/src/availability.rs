//! Availability checks run before any array is touched.
//!
//! Whether a quantity can be fetched depends on the snapshot being queried
//! (its dimensionality and whether it is live), so the check runs on every
//! fetch and is never cached.

use crate::error::{FieldError, FieldResult};
use crate::quantity::QuantityKind;
use crate::registry::QuantityRegistry;
use crate::snapshot::Snapshot;

/// Quantities that need at least two spatial dimensions.
const NEEDS_2D: [&str; 5] = ["y", "vy", "ay", "R", "phi"];

/// Quantities that need three spatial dimensions.
const NEEDS_3D: [&str; 5] = ["z", "vz", "az", "r", "theta"];

/// Quantities only a live snapshot can provide.
const LIVE_ONLY: [&str; 4] = ["ax", "ay", "az", "dudt"];

/// Minimum dimensionality required to fetch `name`.
pub fn required_ndim(name: &str) -> u32 {
    if NEEDS_3D.contains(&name) {
        3
    } else if NEEDS_2D.contains(&name) {
        2
    } else {
        1
    }
}

/// True if `name` exists only on live snapshots.
pub fn is_live_only(name: &str) -> bool {
    LIVE_ONLY.contains(&name)
}

/// Dimensionality and liveness rules alone, without the existence check.
pub fn check_snapshot_support(name: &str, ndim: u32, is_live: bool) -> FieldResult<()> {
    let required = required_ndim(name);
    if ndim < required {
        return Err(FieldError::Dimensionality {
            name: name.to_string(),
            required,
            ndim,
        });
    }

    if !is_live && is_live_only(name) {
        return Err(FieldError::LiveOnly {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Decide whether `name` may be fetched from a snapshot with the given
/// metadata, and report its kind.
///
/// Rules, in order: dimensionality, liveness, existence.
pub fn validate(
    registry: &QuantityRegistry,
    name: &str,
    ndim: u32,
    is_live: bool,
) -> FieldResult<QuantityKind> {
    check_snapshot_support(name, ndim, is_live)?;
    registry.resolve(name).map(|q| q.kind())
}

/// [`validate`] against a snapshot's own metadata.
pub fn check_requested_quantity(
    registry: &QuantityRegistry,
    name: &str,
    snapshot: &dyn Snapshot,
) -> FieldResult<QuantityKind> {
    validate(registry, name, snapshot.dimensionality(), snapshot.is_live())
}
