//! Quantity types: direct snapshot fields and formula-derived fields.

use core::fmt;
use std::str::FromStr;

use pf_core::{Real, UnitInfo};
use pf_formula::Program;

use crate::error::{FieldError, FieldResult};

/// Fields stored natively in every snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DirectQuantity {
    X,
    Y,
    Z,
    Vx,
    Vy,
    Vz,
    Ax,
    Ay,
    Az,
    /// Mass.
    M,
    /// Smoothing length.
    H,
    /// Density.
    Rho,
    /// Specific internal energy.
    U,
    /// Rate of change of specific internal energy.
    Dudt,
}

impl DirectQuantity {
    pub const ALL: [DirectQuantity; 14] = [
        Self::X,
        Self::Y,
        Self::Z,
        Self::Vx,
        Self::Vy,
        Self::Vz,
        Self::Ax,
        Self::Ay,
        Self::Az,
        Self::M,
        Self::H,
        Self::Rho,
        Self::U,
        Self::Dudt,
    ];

    /// Look up a direct quantity by its snapshot name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.name() == name)
    }

    /// Name the snapshot stores this field under.
    pub fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::Vx => "vx",
            Self::Vy => "vy",
            Self::Vz => "vz",
            Self::Ax => "ax",
            Self::Ay => "ay",
            Self::Az => "az",
            Self::M => "m",
            Self::H => "h",
            Self::Rho => "rho",
            Self::U => "u",
            Self::Dudt => "dudt",
        }
    }
}

impl fmt::Display for DirectQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DirectQuantity {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| FieldError::unknown(s))
    }
}

/// A named quantity computed from a compiled formula.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedQuantity {
    name: String,
    formula: String,
    program: Program,
    unit: UnitInfo,
    scaling_factor: i64,
}

impl DerivedQuantity {
    /// Compile `formula` and build the quantity. Fails on any syntax error.
    pub fn new(
        name: impl Into<String>,
        formula: &str,
        unit: UnitInfo,
        scaling_factor: i64,
    ) -> FieldResult<Self> {
        let program = pf_formula::compile(formula)?;
        Ok(Self {
            name: name.into(),
            formula: formula.to_string(),
            program,
            unit,
            scaling_factor,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Formula text as registered.
    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn unit(&self) -> &UnitInfo {
        &self.unit
    }

    pub fn scaling_factor(&self) -> i64 {
        self.scaling_factor
    }

    /// Multiply evaluated values by the scaling factor.
    pub(crate) fn apply_scaling(&self, values: &mut [Real]) {
        if self.scaling_factor != 1 {
            let factor = self.scaling_factor as Real;
            values.iter_mut().for_each(|v| *v *= factor);
        }
    }
}

/// Whether a name refers to a stored or a computed quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantityKind {
    Direct,
    Derived,
}

impl QuantityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Derived => "derived",
        }
    }
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved quantity, borrowed from its registry when derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Quantity<'a> {
    Direct(DirectQuantity),
    Derived(&'a DerivedQuantity),
}

impl Quantity<'_> {
    pub fn name(&self) -> &str {
        match self {
            Self::Direct(q) => q.name(),
            Self::Derived(q) => q.name(),
        }
    }

    pub fn kind(&self) -> QuantityKind {
        match self {
            Self::Direct(_) => QuantityKind::Direct,
            Self::Derived(_) => QuantityKind::Derived,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_names_round_trip() {
        for q in DirectQuantity::ALL {
            assert_eq!(DirectQuantity::from_name(q.name()), Some(q));
            assert_eq!(q.name().parse::<DirectQuantity>().unwrap(), q);
        }
        assert_eq!(DirectQuantity::from_name("r"), None);
        assert!(matches!(
            "bogus".parse::<DirectQuantity>(),
            Err(FieldError::UnknownQuantity { .. })
        ));
    }

    #[test]
    fn derived_quantity_compiles_formula() {
        let q = DerivedQuantity::new("double_m", "m*2", UnitInfo::new("M", "msun"), 3).unwrap();
        assert_eq!(q.name(), "double_m");
        assert_eq!(q.formula(), "m*2");
        assert_eq!(q.program().to_string(), "m 2 *");
        assert_eq!(q.unit(), &UnitInfo::new("M", "msun"));
        assert_eq!(q.scaling_factor(), 3);

        let mut values = vec![1.0, 2.0];
        q.apply_scaling(&mut values);
        assert_eq!(values, vec![3.0, 6.0]);
    }

    #[test]
    fn derived_quantity_rejects_bad_formula() {
        let err = DerivedQuantity::new("bad", "sqrt(x", UnitInfo::empty(), 1).unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn kind_strings() {
        assert_eq!(QuantityKind::Direct.as_str(), "direct");
        assert_eq!(QuantityKind::Derived.to_string(), "derived");
        assert_eq!(Quantity::Direct(DirectQuantity::Rho).kind(), QuantityKind::Direct);
        assert_eq!(Quantity::Direct(DirectQuantity::Rho).name(), "rho");
    }
}
