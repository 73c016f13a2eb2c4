use crate::headers::{header_letters, HeaderLetter};
use crate::row::Row;

/// The normalized rows of one ingestion run plus the header union across all sheets.
///
/// A store is never edited in place; a new run builds a new store and replaces the old one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowStore {
    rows: Vec<Row>,
    headers: Vec<String>,
    header_letters: Vec<HeaderLetter>,
    formula_ignored: usize,
    source_files: Vec<String>,
    q_headers: Vec<String>,
}

impl RowStore {
    /// Create a store. `headers` must already be in first-seen order without duplicates.
    #[must_use]
    pub fn new(
        rows: Vec<Row>,
        headers: Vec<String>,
        formula_ignored: usize,
        source_files: Vec<String>,
    ) -> Self {
        let header_letters = header_letters(&headers);
        RowStore {
            rows,
            headers,
            header_letters,
            formula_ignored,
            source_files,
            q_headers: Vec::new(),
        }
    }

    /// Record the header names found at the Q column position.
    #[must_use]
    pub fn with_q_headers(mut self, q_headers: Vec<String>) -> Self {
        self.q_headers = q_headers;
        self
    }

    /// Create an empty store
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Global header set, in first-seen order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Headers selectable through the A-Z filter.
    #[must_use]
    pub fn header_letters(&self) -> &[HeaderLetter] {
        &self.header_letters
    }

    /// Resolve an A-Z letter to its header.
    #[must_use]
    pub fn header_for_letter(&self, letter: &str) -> Option<&str> {
        self.header_letters
            .iter()
            .find(|item| item.letter.eq_ignore_ascii_case(letter))
            .map(|item| item.header.as_str())
    }

    /// Number of formula cells read by their cached value during the run.
    #[must_use]
    pub fn formula_ignored(&self) -> usize {
        self.formula_ignored
    }

    /// Header names of the Q column across sheets. These are never metric candidates.
    #[must_use]
    pub fn q_headers(&self) -> &[String] {
        &self.q_headers
    }

    #[must_use]
    pub fn source_files(&self) -> &[String] {
        &self.source_files
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
