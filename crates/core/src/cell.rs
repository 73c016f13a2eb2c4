use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized cell value read from a sheet.
///
/// Text is stored trimmed and dates are stored as an ISO calendar day (`YYYY-MM-DD`).
/// Snapshots serialize values untagged, so a date read back from a snapshot becomes `Text`
/// with the same content; both render and normalize identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(String),
}

impl CellValue {
    /// Build a text value, trimming surrounding whitespace. Blank input becomes `Empty`.
    #[must_use]
    pub fn text<S: AsRef<str>>(s: S) -> Self {
        let trimmed = s.as_ref().trim();
        if trimmed.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(trimmed.to_string())
        }
    }

    /// Build a date value from an ISO timestamp or day, keeping only the calendar day.
    #[must_use]
    pub fn date<S: AsRef<str>>(s: S) -> Self {
        let trimmed = s.as_ref().trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        let day = trimmed.get(..10).unwrap_or(trimmed);
        CellValue::Date(day.to_string())
    }

    /// Infer a value from raw delimited text: blank -> empty, finite number -> number,
    /// anything else -> trimmed text.
    #[must_use]
    pub fn infer(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(trimmed.to_string()),
        }
    }

    /// Check if the value is empty (missing cell, blank text)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) | CellValue::Date(s) => s.trim().is_empty(),
            CellValue::Bool(_) | CellValue::Number(_) => false,
        }
    }

    /// Render the value as text; empty renders as the empty string.
    #[must_use]
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) | CellValue::Date(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::text(s)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Empty,
        }
    }
}
