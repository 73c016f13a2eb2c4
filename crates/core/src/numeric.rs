//! Locale-tolerant numeric normalization.
//!
//! Cells arrive as native numbers or as text written with either `.` or `,` as the decimal
//! separator. When both appear, whichever comes last is the decimal point and the other one is
//! digit grouping, so `"1.234,56"` and `"1,234.56"` both read as `1234.56`.

use crate::cell::CellValue;

/// Normalize a cell into a finite number, or `None` when it is not numeric.
#[must_use]
pub fn normalize(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) => n.is_finite().then_some(*n),
        CellValue::Text(s) => parse_decimal(s),
        CellValue::Empty | CellValue::Bool(_) | CellValue::Date(_) => None,
    }
}

/// Parse a decimal literal that may use `,` or `.` as its decimal separator.
#[must_use]
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replacen(',', ".", 1),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replacen(',', ".", 1),
        (None, _) => cleaned,
    };

    normalized.parse::<f64>().ok().filter(|n| n.is_finite())
}
