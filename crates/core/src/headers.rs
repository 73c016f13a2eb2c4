use crate::cell::CellValue;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Only the first 26 headers get a selectable letter (A..Z).
pub const MAX_HEADER_LETTERS: usize = 26;

/// Convert 0-based column index to column letters
/// 0=A, 1=B, ... 25=Z, 26=AA, 27=AB, ...
#[must_use]
pub fn column_name(mut col: usize) -> String {
    let mut result = String::new();
    col += 1;

    while col > 0 {
        col -= 1;
        result.insert(0, char::from((col % 26) as u8 + b'A'));
        col /= 26;
    }

    result
}

/// Turn a sheet's raw header cells into unique column identifiers.
///
/// Blank headers take the positional column name of their slot; repeated names get `_2`, `_3`,
/// ... suffixes in order of appearance. The output always has the same length as the input.
/// A suffix that would clash with a name already emitted keeps counting up.
#[must_use]
pub fn reconcile_headers(raw: &[CellValue]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut emitted: HashSet<String> = HashSet::new();

    raw.iter()
        .enumerate()
        .map(|(index, cell)| {
            let text = cell.as_text();
            let trimmed = text.trim();
            let base = if trimmed.is_empty() {
                column_name(index)
            } else {
                trimmed.to_string()
            };

            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            let mut name = if *count == 1 {
                base.clone()
            } else {
                format!("{base}_{count}")
            };
            while emitted.contains(&name) {
                *count += 1;
                name = format!("{base}_{count}");
            }
            emitted.insert(name.clone());
            name
        })
        .collect()
}

/// A header reachable through the A-Z secondary filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderLetter {
    pub letter: String,
    pub header: String,
    pub label: String,
}

/// Pair the first 26 headers with their positional letters.
#[must_use]
pub fn header_letters<S: AsRef<str>>(headers: &[S]) -> Vec<HeaderLetter> {
    headers
        .iter()
        .take(MAX_HEADER_LETTERS)
        .enumerate()
        .map(|(index, header)| {
            let letter = column_name(index);
            let header = header.as_ref().to_string();
            let label = if header.is_empty() {
                format!("{letter} - {letter}")
            } else {
                format!("{letter} - {header}")
            };
            HeaderLetter {
                letter,
                header,
                label,
            }
        })
        .collect()
}
