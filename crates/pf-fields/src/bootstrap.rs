//! Derived quantities every registry starts with.

use pf_core::UnitInfo;
use tracing::debug;

use crate::registry::QuantityRegistry;

/// `(name, formula)` pairs installed by [`install_bootstrap`].
///
/// Order matters only for readability; formulas resolve their variables at
/// evaluation time.
pub const BOOTSTRAP_QUANTITIES: [(&str, &str); 6] = [
    ("r", "sqrt(x^2+y^2+z^2)"),
    ("R", "sqrt(x^2+y^2)"),
    ("phi", "arctan2(y,x)"),
    ("theta", "arccos(z/r)"),
    (
        "vr",
        "sin(theta)*cos(phi)*vx+sin(theta)*sin(phi)*vy+cos(theta)*vz",
    ),
    (
        "ar",
        "sin(theta)*cos(phi)*ax+sin(theta)*sin(phi)*ay+cos(theta)*az",
    ),
];

/// Register (or re-register) the bootstrap quantities.
///
/// Replaces any caller overrides of the same names.
pub fn install_bootstrap(registry: &mut QuantityRegistry) {
    for (name, formula) in BOOTSTRAP_QUANTITIES {
        registry
            .register(name, formula, UnitInfo::empty(), 1)
            .expect("bootstrap formulas are valid");
    }
    debug!(count = BOOTSTRAP_QUANTITIES.len(), "installed bootstrap quantities");
}
