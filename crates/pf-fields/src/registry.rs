//! Registry of derived quantities.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

use pf_core::UnitInfo;
use pf_formula::named_constant;
use tracing::debug;

use crate::bootstrap::install_bootstrap;
use crate::error::{FieldError, FieldResult};
use crate::quantity::{DerivedQuantity, DirectQuantity, Quantity};

/// Longest chain of derived quantities referring to one another that
/// evaluation and dependency walks will follow.
pub const MAX_DEFINITION_DEPTH: usize = 256;

/// Process-lifetime table of derived quantities, keyed by name.
///
/// Entries are only ever added or replaced, never removed. Build the
/// registry during startup, then hand out `&QuantityRegistry` for fetching;
/// re-registering while evaluations are in flight is not supported.
#[derive(Debug, Clone)]
pub struct QuantityRegistry {
    derived: HashMap<String, DerivedQuantity>,
}

impl QuantityRegistry {
    /// Create an empty registry with no derived quantities.
    pub fn new() -> Self {
        Self {
            derived: HashMap::new(),
        }
    }

    /// Create a registry seeded with the bootstrap quantities.
    pub fn with_bootstrap() -> Self {
        let mut registry = Self::new();
        install_bootstrap(&mut registry);
        registry
    }

    /// Compile `formula` and store it under `name`, replacing any previous
    /// definition.
    ///
    /// On a compile error nothing is stored and the previous definition, if
    /// any, stays in place.
    pub fn register(
        &mut self,
        name: &str,
        formula: &str,
        unit: UnitInfo,
        scaling_factor: i64,
    ) -> FieldResult<&DerivedQuantity> {
        validate_name(name)?;
        let quantity = DerivedQuantity::new(name, formula, unit, scaling_factor)?;

        match self.derived.entry(name.to_string()) {
            Entry::Occupied(mut slot) => {
                debug!(
                    name,
                    old = slot.get().formula(),
                    new = formula,
                    "replaced derived quantity"
                );
                slot.insert(quantity);
                Ok(slot.into_mut())
            }
            Entry::Vacant(slot) => {
                debug!(name, formula, "registered derived quantity");
                Ok(slot.insert(quantity))
            }
        }
    }

    /// [`register`](Self::register) with empty unit metadata and a scaling factor of 1.
    pub fn register_formula(&mut self, name: &str, formula: &str) -> FieldResult<&DerivedQuantity> {
        self.register(name, formula, UnitInfo::empty(), 1)
    }

    /// Look a name up: direct quantities first, then registered derived ones.
    pub fn resolve(&self, name: &str) -> FieldResult<Quantity<'_>> {
        if let Some(direct) = DirectQuantity::from_name(name) {
            return Ok(Quantity::Direct(direct));
        }
        self.derived
            .get(name)
            .map(Quantity::Derived)
            .ok_or_else(|| FieldError::unknown(name))
    }

    /// The derived quantity registered under `name`, if any.
    pub fn derived(&self, name: &str) -> Option<&DerivedQuantity> {
        self.derived.get(name)
    }

    /// True if `name` is a direct quantity or a registered derived one.
    pub fn contains(&self, name: &str) -> bool {
        DirectQuantity::from_name(name).is_some() || self.derived.contains_key(name)
    }

    /// Registered derived quantity names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.derived.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered derived quantities.
    pub fn len(&self) -> usize {
        self.derived.len()
    }

    pub fn is_empty(&self) -> bool {
        self.derived.is_empty()
    }

    /// Every quantity name `name` needs, transitively, excluding itself.
    ///
    /// Direct quantities are leaves. Fails with `UnknownQuantity` for a
    /// missing dependency and `CyclicDefinition` if `name` reaches itself.
    pub fn dependencies(&self, name: &str) -> FieldResult<BTreeSet<String>> {
        let mut found = BTreeSet::new();
        let mut chain = Vec::new();
        self.collect_dependencies(name, &mut chain, &mut found)?;
        Ok(found)
    }

    fn collect_dependencies(
        &self,
        name: &str,
        chain: &mut Vec<String>,
        found: &mut BTreeSet<String>,
    ) -> FieldResult<()> {
        if chain.iter().any(|n| n == name) {
            let mut cycle = chain.clone();
            cycle.push(name.to_string());
            return Err(FieldError::CyclicDefinition { chain: cycle });
        }
        let quantity = match self.resolve(name)? {
            Quantity::Direct(_) => return Ok(()),
            Quantity::Derived(q) => q,
        };
        if chain.len() >= MAX_DEFINITION_DEPTH {
            return Err(FieldError::DefinitionTooDeep {
                name: name.to_string(),
                limit: MAX_DEFINITION_DEPTH,
            });
        }

        chain.push(name.to_string());
        for var in quantity.program().variables() {
            found.insert(var.to_string());
            self.collect_dependencies(var, chain, found)?;
        }
        chain.pop();
        Ok(())
    }
}

impl Default for QuantityRegistry {
    fn default() -> Self {
        Self::with_bootstrap()
    }
}

/// Names must be identifiers so formulas can refer to them, and must not
/// shadow a direct quantity (direct names always resolve first) or a named
/// constant (which formulas always compile to a literal).
fn validate_name(name: &str) -> FieldResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    };
    if !valid {
        return Err(FieldError::InvalidName {
            name: name.to_string(),
        });
    }
    if DirectQuantity::from_name(name).is_some() || named_constant(name).is_some() {
        return Err(FieldError::ReservedName {
            name: name.to_string(),
        });
    }
    Ok(())
}
