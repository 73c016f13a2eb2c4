//! Row filtering.
//!
//! The active subset is derived in a fixed order: sheet, then Q value, then the A-Z secondary
//! column. Every stage borrows the rows it is given and returns a narrower list of references,
//! so stages can be re-run freely (for example to rebuild a value list after an upstream
//! selection changes) without touching the store.

use crate::row::Row;
use crate::store::RowStore;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Current filter selections. `None` means "no filter" for that stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub sheet: Option<String>,
    pub q: Option<String>,
    pub secondary_column: Option<String>,
    pub secondary_value: Option<String>,
}

impl FilterState {
    /// Apply all three stages in order.
    #[must_use]
    pub fn apply<'a>(&self, store: &'a RowStore) -> Vec<&'a Row> {
        let rows = self.apply_upstream(store);
        by_secondary(rows, self.secondary_header(store), self.secondary_value.as_deref())
    }

    /// Apply the sheet and Q stages only; the secondary value list is built from this.
    #[must_use]
    pub fn apply_upstream<'a>(&self, store: &'a RowStore) -> Vec<&'a Row> {
        let rows = by_sheet(store.rows().iter().collect(), self.sheet.as_deref());
        by_q(rows, self.q.as_deref())
    }

    /// Header behind the selected A-Z letter, if the letter is known.
    #[must_use]
    pub fn secondary_header<'a>(&self, store: &'a RowStore) -> Option<&'a str> {
        self.secondary_column
            .as_deref()
            .and_then(|letter| store.header_for_letter(letter))
    }
}

fn non_blank(selection: Option<&str>) -> Option<&str> {
    selection.filter(|s| !s.is_empty())
}

/// Keep rows from the selected sheet.
#[must_use]
pub fn by_sheet<'a>(rows: Vec<&'a Row>, sheet: Option<&str>) -> Vec<&'a Row> {
    match non_blank(sheet) {
        Some(sheet) => rows.into_iter().filter(|r| r.sheet_name == sheet).collect(),
        None => rows,
    }
}

/// Keep rows whose Q value equals the selection.
#[must_use]
pub fn by_q<'a>(rows: Vec<&'a Row>, q: Option<&str>) -> Vec<&'a Row> {
    match non_blank(q) {
        Some(q) => rows.into_iter().filter(|r| r.q == q).collect(),
        None => rows,
    }
}

/// Keep rows whose value under `header` renders exactly as `value`.
///
/// Passes everything through unless both a header and a value are selected.
#[must_use]
pub fn by_secondary<'a>(
    rows: Vec<&'a Row>,
    header: Option<&str>,
    value: Option<&str>,
) -> Vec<&'a Row> {
    match (non_blank(header), non_blank(value)) {
        (Some(header), Some(value)) => rows
            .into_iter()
            .filter(|r| r.text(header) == value)
            .collect(),
        _ => rows,
    }
}

/// Distinct sheet names in first-seen order.
#[must_use]
pub fn sheet_names(rows: &[&Row]) -> Vec<String> {
    rows.iter()
        .map(|r| r.sheet_name.clone())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct Q values in natural order.
#[must_use]
pub fn q_values(rows: &[&Row]) -> Vec<String> {
    let mut values: Vec<String> = rows
        .iter()
        .map(|r| r.q.clone())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect();
    values.sort_by(|a, b| natural_cmp(a, b));
    values
}

/// Distinct non-empty values of a column in natural order.
#[must_use]
pub fn secondary_values(rows: &[&Row], header: &str) -> Vec<String> {
    let mut values: Vec<String> = rows
        .iter()
        .map(|r| r.text(header))
        .filter(|v| !v.is_empty())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect();
    values.sort_by(|a, b| natural_cmp(a, b));
    values
}

enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits = None;

    for (i, c) in s.char_indices() {
        let digit = c.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != digit => {
                out.push(if prev {
                    Chunk::Digits(&s[start..i])
                } else {
                    Chunk::Text(&s[start..i])
                });
                start = i;
            }
            _ => {}
        }
        in_digits = Some(digit);
    }
    if let Some(prev) = in_digits {
        out.push(if prev {
            Chunk::Digits(&s[start..])
        } else {
            Chunk::Text(&s[start..])
        });
    }
    out
}

fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Compare strings the way a person sorts labels: digit runs by numeric value, letters
/// case-insensitively. Falls back to a byte comparison so the order is total.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = chunks(a);
    let right = chunks(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let ord = match (l, r) {
            (Chunk::Digits(x), Chunk::Digits(y)) => cmp_digits(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}
