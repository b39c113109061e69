//! Error types for field queries.

use pf_formula::FormulaError;
use thiserror::Error;

use crate::snapshot::SnapshotError;

/// Result type for field queries and registration.
pub type FieldResult<T> = Result<T, FieldError>;

/// Errors that can occur while registering, validating or fetching quantities.
#[derive(Error, Debug)]
pub enum FieldError {
    /// Name is neither a direct quantity nor a registered derived quantity.
    #[error("Unknown quantity: we don't know how to compute '{name}'")]
    UnknownQuantity { name: String },

    /// Quantity needs more spatial dimensions than the snapshot has.
    #[error("Quantity '{name}' requires {required} dimensions, but the snapshot has only {ndim}")]
    Dimensionality {
        name: String,
        required: u32,
        ndim: u32,
    },

    /// Quantity exists only on live snapshots.
    #[error("Quantity '{name}' is available only for live snapshots")]
    LiveOnly { name: String },

    /// Formula text failed to compile.
    #[error("Formula error: {0}")]
    Formula(#[from] FormulaError),

    /// Compiled program violated the stack contract during evaluation.
    #[error("Malformed program: {what}")]
    MalformedProgram { what: String },

    /// A derived quantity depends on itself, directly or transitively.
    #[error("Cyclic definition: {}", chain.join(" -> "))]
    CyclicDefinition { chain: Vec<String> },

    /// Derived quantities refer to each other more than `limit` levels deep.
    #[error("Definition of '{name}' nests derived quantities deeper than {limit} levels")]
    DefinitionTooDeep { name: String, limit: usize },

    /// Two operand arrays had different particle counts.
    #[error("Array length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    /// Derived quantity registered under a direct quantity's or a named
    /// constant's name.
    #[error("'{name}' is a direct quantity or named constant and cannot be redefined")]
    ReservedName { name: String },

    /// Quantity name is not an identifier usable inside formulas.
    #[error("Invalid quantity name: '{name}'")]
    InvalidName { name: String },

    /// The snapshot could not provide a requested array.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Configuration was well-formed text but semantically invalid.
    #[error("Configuration error: {what}")]
    Config { what: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FieldError {
    pub(crate) fn unknown(name: &str) -> Self {
        Self::UnknownQuantity {
            name: name.to_string(),
        }
    }

    pub(crate) fn malformed(what: impl Into<String>) -> Self {
        Self::MalformedProgram { what: what.into() }
    }

    /// True for every formula compilation failure.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Formula(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FieldError::Dimensionality {
            name: "z".into(),
            required: 3,
            ndim: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("'z'"));
        assert!(msg.contains('2'));

        let err = FieldError::CyclicDefinition {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert!(err.to_string().contains("a -> b -> a"));
    }

    #[test]
    fn formula_errors_convert() {
        let err: FieldError = pf_formula::compile("(x").unwrap_err().into();
        assert!(err.is_parse_error());
        assert!(!FieldError::unknown("bogus").is_parse_error());
    }
}
