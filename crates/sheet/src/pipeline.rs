//! Batch ingestion: many workbooks into one [`RowStore`].

use crate::error::{IngestError, Result};
use crate::ingest::ingest_sheet;
use crate::source::WorkbookSource;
use indexmap::IndexSet;
use qtally_core::{Row, RowStore};

/// Accumulation state of one ingestion run.
///
/// Every run starts from a fresh context, so a failed run leaves nothing behind.
#[derive(Debug, Default)]
pub struct IngestContext {
    rows: Vec<Row>,
    headers: IndexSet<String>,
    q_headers: IndexSet<String>,
    formula_ignored: usize,
    source_files: Vec<String>,
}

impl IngestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a workbook and append its sheets' rows in declared order.
    ///
    /// On a decode error nothing from this workbook is appended.
    pub fn ingest_workbook(&mut self, source: &mut dyn WorkbookSource) -> Result<()> {
        let sheets = source.read_sheets()?;
        let file_name = source.file_name().to_string();

        for (sheet_name, grid) in &sheets {
            let sheet = ingest_sheet(&file_name, sheet_name, grid);
            self.headers.extend(sheet.headers);
            self.q_headers.extend(sheet.q_header);
            self.formula_ignored += sheet.stats.formulas;
            self.rows.extend(sheet.rows);
        }

        self.source_files.push(file_name);
        Ok(())
    }

    /// Freeze the context into a store.
    #[must_use]
    pub fn finish(self) -> RowStore {
        RowStore::new(
            self.rows,
            self.headers.into_iter().collect(),
            self.formula_ignored,
            self.source_files,
        )
        .with_q_headers(self.q_headers.into_iter().collect())
    }
}

/// Ingest a batch of workbooks into a new store.
///
/// The batch must not be empty. The first decode failure aborts the run.
pub fn ingest_all(sources: &mut [Box<dyn WorkbookSource>]) -> Result<RowStore> {
    if sources.is_empty() {
        return Err(IngestError::NoSources);
    }

    let mut context = IngestContext::new();
    for source in sources.iter_mut() {
        context.ingest_workbook(source.as_mut())?;
    }

    let store = context.finish();
    tracing::info!(
        files = store.source_files().len(),
        rows = store.len(),
        headers = store.headers().len(),
        formulas_ignored = store.formula_ignored(),
        "Ingestion finished"
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Grid, RawCell};
    use crate::ingest::Q_COLUMN_INDEX;
    use crate::source::MemorySource;
    use qtally_core::CellValue;

    fn sheet(headers: &[&str], rows: &[(&str, &str)]) -> Grid {
        let mut grid = Grid::new();
        for (col, header) in headers.iter().enumerate() {
            grid.set(0, col as u32, RawCell::value(*header));
        }
        grid.set(0, Q_COLUMN_INDEX, RawCell::value("Q"));
        for (i, (value, q)) in rows.iter().enumerate() {
            grid.set(i as u32 + 1, 0, RawCell::value(*value));
            grid.set(i as u32 + 1, Q_COLUMN_INDEX, RawCell::value(*q));
        }
        grid
    }

    struct Failing;

    impl WorkbookSource for Failing {
        fn file_name(&self) -> &str {
            "ruim.xlsx"
        }

        fn read_sheets(&mut self) -> Result<Vec<(String, Grid)>> {
            Err(IngestError::decode("ruim.xlsx", "bad zip"))
        }
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        assert!(matches!(ingest_all(&mut []), Err(IngestError::NoSources)));
    }

    #[test]
    fn test_order_is_file_then_sheet_then_row() {
        let mut sources: Vec<Box<dyn WorkbookSource>> = vec![
            Box::new(
                MemorySource::new("a.xlsx")
                    .with_sheet("S1", sheet(&["Valor"], &[("1", "x"), ("2", "y")]))
                    .with_sheet("S2", sheet(&["Peso"], &[("3", "z")])),
            ),
            Box::new(MemorySource::new("b.xlsx").with_sheet("S1", sheet(&["Valor"], &[("4", "w")]))),
        ];

        let store = ingest_all(&mut sources).unwrap();
        let order: Vec<(&str, &str, &str)> = store
            .rows()
            .iter()
            .map(|r| (r.source_file.as_str(), r.sheet_name.as_str(), r.q.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a.xlsx", "S1", "x"),
                ("a.xlsx", "S1", "y"),
                ("a.xlsx", "S2", "z"),
                ("b.xlsx", "S1", "w"),
            ]
        );
        assert_eq!(store.source_files(), ["a.xlsx", "b.xlsx"]);
    }

    #[test]
    fn test_headers_are_unioned_in_first_seen_order() {
        let mut sources: Vec<Box<dyn WorkbookSource>> = vec![Box::new(
            MemorySource::new("a.xlsx")
                .with_sheet("S1", sheet(&["Valor"], &[("1", "x")]))
                .with_sheet("S2", sheet(&["Peso", "Valor"], &[("2", "y")])),
        )];

        let store = ingest_all(&mut sources).unwrap();
        let headers = store.headers();
        assert_eq!(headers[0], "Valor");
        assert_eq!(headers.iter().filter(|h| *h == "Valor").count(), 1);
        let peso = headers.iter().position(|h| h == "Peso").unwrap();
        assert!(peso > headers.iter().position(|h| h == "Q").unwrap());
        assert_eq!(store.q_headers(), ["Q"]);

        // Rows only carry their own sheet's headers.
        assert!(!store.rows()[0].has_header("Peso"));
        assert_eq!(store.rows()[1].get("Peso"), Some(&CellValue::text("2")));
    }

    #[test]
    fn test_decode_failure_aborts_run() {
        let mut sources: Vec<Box<dyn WorkbookSource>> = vec![
            Box::new(MemorySource::new("a.xlsx").with_sheet("S1", sheet(&["V"], &[("1", "x")]))),
            Box::new(Failing),
        ];

        let err = ingest_all(&mut sources).unwrap_err();
        assert!(matches!(err, IngestError::Decode { ref file, .. } if file == "ruim.xlsx"));
    }

    #[test]
    fn test_formulas_accumulate_across_files() {
        let mut first = sheet(&["V"], &[("1", "x")]);
        first.mark_formula(1, 0);
        let mut second = sheet(&["V"], &[("1", "x")]);
        second.mark_formula(0, 0);
        second.mark_formula(1, 0);

        let mut sources: Vec<Box<dyn WorkbookSource>> = vec![
            Box::new(MemorySource::new("a.xlsx").with_sheet("S1", first)),
            Box::new(MemorySource::new("b.xlsx").with_sheet("S1", second)),
        ];
        assert_eq!(ingest_all(&mut sources).unwrap().formula_ignored(), 3);
    }
}
