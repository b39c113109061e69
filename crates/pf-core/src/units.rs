// pf-core/src/units.rs

use core::fmt;

/// Unit metadata attached to a derived quantity.
///
/// The engine never interprets these strings; they are carried from
/// registration to every fetch unchanged so a plotting or reporting layer can
/// label axes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct UnitInfo {
    /// Short axis label, e.g. `"R"` or `"v_r"`.
    pub label: String,
    /// Unit name, e.g. `"au"` or `"km/s"`.
    pub name: String,
}

impl UnitInfo {
    pub fn new(label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            name: name.into(),
        }
    }

    /// Metadata with both fields empty (the default for a new derived quantity).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_empty() && self.name.is_empty()
    }
}

impl fmt::Display for UnitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.label.is_empty(), self.name.is_empty()) {
            (true, true) => Ok(()),
            (false, true) => write!(f, "{}", self.label),
            (true, false) => write!(f, "[{}]", self.name),
            (false, false) => write!(f, "{} [{}]", self.label, self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let u = UnitInfo::new("R", "au");
        assert_eq!(u.label, "R");
        assert_eq!(u.name, "au");
        assert!(!u.is_empty());
        assert!(UnitInfo::empty().is_empty());
    }

    #[test]
    fn display_formats() {
        assert_eq!(UnitInfo::empty().to_string(), "");
        assert_eq!(UnitInfo::new("R", "").to_string(), "R");
        assert_eq!(UnitInfo::new("", "au").to_string(), "[au]");
        assert_eq!(UnitInfo::new("R", "au").to_string(), "R [au]");
    }
}
