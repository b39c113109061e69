//! Error types for formula compilation.

use thiserror::Error;

/// Result type for formula compilation.
pub type FormulaResult<T> = Result<T, FormulaError>;

/// Errors raised while compiling formula text.
///
/// Every variant carries the full formula text that failed to compile.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormulaError {
    /// Malformed expression (bad token, unbalanced parentheses, empty input, trailing tokens).
    #[error("Parse error in '{text}': {message}")]
    Parse { message: String, text: String },

    /// Call syntax used with a name that is not a known function.
    #[error("Unknown function '{name}' in '{text}'")]
    UnknownFunction { name: String, text: String },

    /// Known function called with the wrong number of arguments.
    #[error("Function '{name}' takes {expected} argument(s) but {found} were given in '{text}'")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
        text: String,
    },
}

impl FormulaError {
    /// The formula text that failed to compile.
    pub fn text(&self) -> &str {
        match self {
            Self::Parse { text, .. }
            | Self::UnknownFunction { text, .. }
            | Self::Arity { text, .. } => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FormulaError::Parse {
            message: "missing ')'".into(),
            text: "sqrt(x".into(),
        };
        assert!(err.to_string().contains("sqrt(x"));
        assert_eq!(err.text(), "sqrt(x");

        let err = FormulaError::Arity {
            name: "arctan2".into(),
            expected: 2,
            found: 1,
            text: "arctan2(y)".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("arctan2"));
        assert!(msg.contains('2'));
    }
}
