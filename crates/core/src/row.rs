use crate::cell::CellValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One normalized sheet row with its grouping key and provenance.
///
/// `q` is always trimmed and non-empty for rows produced by ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub q: String,
    pub source_file: String,
    pub sheet_name: String,
    pub values: IndexMap<String, CellValue>,
}

impl Row {
    /// Create a row, trimming the Q value.
    #[must_use]
    pub fn new(
        q: impl AsRef<str>,
        source_file: impl Into<String>,
        sheet_name: impl Into<String>,
        values: IndexMap<String, CellValue>,
    ) -> Self {
        Row {
            q: q.as_ref().trim().to_string(),
            source_file: source_file.into(),
            sheet_name: sheet_name.into(),
            values,
        }
    }

    /// Get the value under a header, if this row's sheet defines it.
    #[must_use]
    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.values.get(header)
    }

    /// Check whether this row's sheet defines the header.
    #[must_use]
    pub fn has_header(&self, header: &str) -> bool {
        self.values.contains_key(header)
    }

    /// Value under a header rendered as text; missing and empty both give `""`.
    #[must_use]
    pub fn text(&self, header: &str) -> String {
        self.get(header).map(CellValue::as_text).unwrap_or_default()
    }
}
