//! Declarative registry configuration (YAML or JSON text).
//!
//! ```yaml
//! bootstrap: true
//! quantities:
//!   - name: double_m
//!     formula: m*2
//!     unit_label: M
//!     unit_name: msun
//!     scaling_factor: 1
//! ```
//!
//! Reading the text from disk is left to the caller.

use pf_core::UnitInfo;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FieldError, FieldResult};
use crate::registry::QuantityRegistry;

fn default_true() -> bool {
    true
}

fn default_scaling() -> i64 {
    1
}

/// One derived quantity declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuantityDef {
    pub name: String,
    pub formula: String,
    #[serde(default)]
    pub unit_label: String,
    #[serde(default)]
    pub unit_name: String,
    #[serde(default = "default_scaling")]
    pub scaling_factor: i64,
}

impl QuantityDef {
    pub fn new(name: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            formula: formula.into(),
            unit_label: String::new(),
            unit_name: String::new(),
            scaling_factor: 1,
        }
    }
}

/// Registry setup: whether to seed the bootstrap set, plus extra quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldsConfig {
    #[serde(default = "default_true")]
    pub bootstrap: bool,
    #[serde(default)]
    pub quantities: Vec<QuantityDef>,
}

impl Default for FieldsConfig {
    fn default() -> Self {
        Self {
            bootstrap: true,
            quantities: Vec::new(),
        }
    }
}

impl FieldsConfig {
    pub fn from_yaml_str(text: &str) -> FieldResult<Self> {
        let config: FieldsConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> FieldResult<Self> {
        let config: FieldsConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject duplicate names within one configuration.
    ///
    /// Registering twice would silently keep only the last entry.
    pub fn validate(&self) -> FieldResult<()> {
        for (i, def) in self.quantities.iter().enumerate() {
            if self.quantities[..i].iter().any(|d| d.name == def.name) {
                return Err(FieldError::Config {
                    what: format!("quantity '{}' is declared more than once", def.name),
                });
            }
        }
        Ok(())
    }

    /// Build a registry: bootstrap set first (if enabled), then each declared
    /// quantity in order, so declarations may override bootstrap entries.
    pub fn build_registry(&self) -> FieldResult<QuantityRegistry> {
        let mut registry = if self.bootstrap {
            QuantityRegistry::with_bootstrap()
        } else {
            QuantityRegistry::new()
        };
        self.apply(&mut registry)?;
        Ok(registry)
    }

    /// Register every declared quantity into an existing registry.
    ///
    /// Stops at the first failing declaration; earlier ones stay registered.
    pub fn apply(&self, registry: &mut QuantityRegistry) -> FieldResult<()> {
        for def in &self.quantities {
            registry.register(
                &def.name,
                &def.formula,
                UnitInfo::new(def.unit_label.as_str(), def.unit_name.as_str()),
                def.scaling_factor,
            )?;
        }
        debug!(
            bootstrap = self.bootstrap,
            count = self.quantities.len(),
            "applied quantity configuration"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_defaults() {
        let config = FieldsConfig::from_yaml_str(
            "quantities:\n  - name: double_m\n    formula: m*2\n",
        )
        .unwrap();
        assert!(config.bootstrap);
        assert_eq!(config.quantities, vec![QuantityDef::new("double_m", "m*2")]);
    }

    #[test]
    fn yaml_full_entry() {
        let text = r#"
bootstrap: false
quantities:
  - name: vr_kms
    formula: "vx + vy"
    unit_label: v_r
    unit_name: km/s
    scaling_factor: 3
"#;
        let config = FieldsConfig::from_yaml_str(text).unwrap();
        let registry = config.build_registry().unwrap();
        assert_eq!(registry.names(), vec!["vr_kms"]);
        let q = registry.derived("vr_kms").unwrap();
        assert_eq!(q.unit(), &UnitInfo::new("v_r", "km/s"));
        assert_eq!(q.scaling_factor(), 3);
    }

    #[test]
    fn json_is_accepted() {
        let config = FieldsConfig::from_json_str(
            r#"{"quantities": [{"name": "R", "formula": "abs(x)"}]}"#,
        )
        .unwrap();
        let registry = config.build_registry().unwrap();
        assert_eq!(registry.derived("R").unwrap().formula(), "abs(x)");
        assert!(registry.contains("theta"));
    }

    #[test]
    fn empty_config_is_bootstrap_only() {
        let registry = FieldsConfig::default().build_registry().unwrap();
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn duplicates_are_rejected() {
        let text = "quantities:\n  - {name: a, formula: m}\n  - {name: a, formula: h}\n";
        assert!(matches!(
            FieldsConfig::from_yaml_str(text),
            Err(FieldError::Config { .. })
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let text = "quantities:\n  - {name: a, formula: m, units: cm}\n";
        assert!(matches!(
            FieldsConfig::from_yaml_str(text),
            Err(FieldError::Yaml(_))
        ));
    }

    #[test]
    fn deeply_nested_formula_fails_build() {
        let formula = format!("{}m{}", "(".repeat(5_000), ")".repeat(5_000));
        let config = FieldsConfig::from_json_str(&format!(
            r#"{{"quantities": [{{"name": "deep", "formula": "{formula}"}}]}}"#
        ))
        .unwrap();
        assert!(config.build_registry().unwrap_err().is_parse_error());
    }

    #[test]
    fn reserved_constant_name_fails_build() {
        let config = FieldsConfig::from_yaml_str("quantities:\n  - {name: PI, formula: m}\n").unwrap();
        assert!(matches!(
            config.build_registry(),
            Err(FieldError::ReservedName { .. })
        ));
    }

    #[test]
    fn bad_formula_fails_build() {
        let config = FieldsConfig {
            bootstrap: false,
            quantities: vec![QuantityDef::new("bad", "sqrt(")],
        };
        assert!(config.build_registry().unwrap_err().is_parse_error());
    }
}
