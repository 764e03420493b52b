//! Formula field results.

use std::fmt;

/// The computed value of a formula field.
///
/// A formula evaluates to a number, a string, or an error. At most one of
/// them is ever present; `Empty` is the value before anything was decoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FormulaResult {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    /// The service's error code, e.g. `#ERROR`.
    Error(String),
}

impl FormulaResult {
    pub fn is_empty(&self) -> bool {
        matches!(self, FormulaResult::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaResult::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormulaResult::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&str> {
        match self {
            FormulaResult::Error(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for FormulaResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaResult::Empty => Ok(()),
            FormulaResult::Number(n) => write!(f, "{n}"),
            FormulaResult::Text(s) => f.write_str(s),
            FormulaResult::Error(e) => f.write_str(e),
        }
    }
}
