use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single cell as handed back by, or written to, a spreadsheet store.
///
/// No per-column type is ever inferred; the header row is the only schema a sheet has.
/// Values are compared by their text rendering.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    Int(i64),
    Number(f64),
    Boolean(bool),
    Text(String),
    #[default]
    Empty,
}

impl Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Boolean(b) => write!(f, "{b}"),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Empty => Ok(()),
        }
    }
}

impl CellValue {
    /// True for `Empty` and for empty text, the two shapes a cleared cell comes back as.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Exact equality against the stringified form of this value.
    pub fn matches_text(&self, expected: &str) -> bool {
        match self {
            CellValue::Text(s) => s == expected,
            other => other.to_string() == expected,
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Int(value as i64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl<'a> From<&'a str> for CellValue {
    fn from(value: &'a str) -> Self {
        CellValue::Text(value.to_string())
    }
}

/// Build a row of text cells; handy for fixtures and header rows.
pub fn text_row<I, S>(cells: I) -> Vec<CellValue>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    cells.into_iter().map(|s| CellValue::Text(s.into())).collect()
}
