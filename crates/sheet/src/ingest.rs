//! Turn one decoded sheet into normalized rows.

use crate::grid::Grid;
use indexmap::IndexMap;
use qtally_core::{reconcile_headers, CellValue, Row};

/// Absolute 0-based column holding the Q value (the 17th column, `Q` in A1 notation).
///
/// The Q column is chosen by position, not by header name. Sheets whose used range does not
/// reach this column contribute no rows.
pub const Q_COLUMN_INDEX: u32 = 16;

/// Counters collected while ingesting one sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SheetStats {
    /// Data rows below the header row.
    pub rows_read: usize,
    /// Rows skipped because every cell was empty.
    pub blank_rows: usize,
    /// Rows dropped because the Q cell was missing or blank.
    pub missing_q: usize,
    pub rows_kept: usize,
    /// Formula cells read by their cached value, header row included.
    pub formulas: usize,
}

/// Output of ingesting one sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetIngest {
    pub headers: Vec<String>,
    /// Header of the Q column, when the used range reaches it.
    pub q_header: Option<String>,
    pub rows: Vec<Row>,
    pub stats: SheetStats,
}

/// Normalize a decoded value: text is trimmed and blank text becomes empty.
fn extract(value: &CellValue) -> CellValue {
    match value {
        CellValue::Text(s) => CellValue::text(s),
        CellValue::Date(s) => CellValue::date(s),
        other => other.clone(),
    }
}

/// Ingest a sheet: the first row of the used range is the header row, every later row becomes
/// a [`Row`] unless it is entirely blank or has no Q value.
#[must_use]
pub fn ingest_sheet(file_name: &str, sheet_name: &str, grid: &Grid) -> SheetIngest {
    let Some(range) = grid.used_range() else {
        return SheetIngest::default();
    };

    let mut stats = SheetStats::default();
    let mut read = |row: u32, col: u32| match grid.cell_at(row, col) {
        Some(cell) => {
            if cell.is_formula {
                stats.formulas += 1;
            }
            extract(&cell.value)
        }
        None => CellValue::Empty,
    };

    let header_row = range.start.0;
    let raw_headers: Vec<CellValue> = range.columns().map(|col| read(header_row, col)).collect();
    let headers = reconcile_headers(&raw_headers);

    let q_offset = Q_COLUMN_INDEX
        .checked_sub(range.start.1)
        .map(|offset| offset as usize)
        .filter(|offset| *offset < headers.len());
    let q_header = q_offset.and_then(|offset| headers.get(offset).cloned());

    let mut rows = Vec::new();
    let mut blank_rows = 0;
    let mut missing_q = 0;
    let mut rows_read = 0;

    for row_idx in header_row + 1..=range.end.0 {
        rows_read += 1;
        let mut values = IndexMap::with_capacity(headers.len());
        let mut has_any = false;

        for (header, col) in headers.iter().zip(range.columns()) {
            let value = read(row_idx, col);
            has_any |= !value.is_empty();
            values.insert(header.clone(), value);
        }

        if !has_any {
            blank_rows += 1;
            continue;
        }

        let q = q_offset
            .and_then(|offset| values.get_index(offset))
            .map(|(_, value)| value.as_text())
            .unwrap_or_default();
        if q.trim().is_empty() {
            missing_q += 1;
            continue;
        }

        rows.push(Row::new(q, file_name, sheet_name, values));
    }

    stats.rows_read = rows_read;
    stats.blank_rows = blank_rows;
    stats.missing_q = missing_q;
    stats.rows_kept = rows.len();

    tracing::debug!(
        file = file_name,
        sheet = sheet_name,
        rows_read = stats.rows_read,
        blank_rows = stats.blank_rows,
        missing_q = stats.missing_q,
        rows_kept = stats.rows_kept,
        formulas = stats.formulas,
        "Ingested sheet"
    );

    SheetIngest {
        headers,
        q_header,
        rows,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{RawCell, UsedRange};

    /// Header row plus data rows, each padded to 17 columns with Q in the last one.
    fn wide_grid(rows: &[(&str, &str)]) -> Grid {
        let mut grid = Grid::new();
        grid.set(0, 0, RawCell::value("Nome"));
        grid.set(0, 1, RawCell::value("Valor"));
        grid.set(0, Q_COLUMN_INDEX, RawCell::value("Codigo"));
        for (i, (valor, q)) in rows.iter().enumerate() {
            let r = i as u32 + 1;
            grid.set(r, 1, RawCell::value(*valor));
            grid.set(r, Q_COLUMN_INDEX, RawCell::value(*q));
        }
        grid
    }

    #[test]
    fn test_no_range_yields_nothing() {
        let out = ingest_sheet("a.xlsx", "Vazia", &Grid::new());
        assert!(out.headers.is_empty());
        assert!(out.rows.is_empty());
    }

    #[test]
    fn test_rows_keyed_by_q_column() {
        let out = ingest_sheet("a.xlsx", "Plan1", &wide_grid(&[("1,5", " 10 "), ("2", "11")]));

        assert_eq!(out.headers.len(), 17);
        assert_eq!(out.headers[0], "Nome");
        assert_eq!(out.headers[2], "C");
        assert_eq!(out.headers[16], "Codigo");
        assert_eq!(out.q_header.as_deref(), Some("Codigo"));

        assert_eq!(out.rows.len(), 2);
        let first = &out.rows[0];
        assert_eq!(first.q, "10");
        assert_eq!(first.source_file, "a.xlsx");
        assert_eq!(first.sheet_name, "Plan1");
        assert_eq!(first.get("Valor"), Some(&CellValue::text("1,5")));
        assert_eq!(first.get("Nome"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_missing_q_drops_row_regardless_of_content() {
        let out = ingest_sheet("a.xlsx", "Plan1", &wide_grid(&[("9", ""), ("", "7"), ("3", "  ")]));

        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].q, "7");
        assert_eq!(out.stats.missing_q, 2);
        assert_eq!(out.stats.rows_kept, 1);
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let mut grid = wide_grid(&[("1", "A")]);
        grid.set(3, 1, RawCell::value(" "));
        grid.set(4, Q_COLUMN_INDEX, RawCell::value("B"));

        let out = ingest_sheet("a.xlsx", "Plan1", &grid);
        assert_eq!(out.rows.iter().map(|r| r.q.as_str()).collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(out.stats.rows_read, 4);
        assert_eq!(out.stats.blank_rows, 2);
    }

    #[test]
    fn test_narrow_sheet_has_no_rows() {
        let grid = Grid::from_rows(vec![vec!["Q", "Valor"], vec!["10", "5"]]);
        let out = ingest_sheet("a.xlsx", "Plan1", &grid);
        assert_eq!(out.headers, vec!["Q", "Valor"]);
        assert_eq!(out.q_header, None);
        assert!(out.rows.is_empty());
        assert_eq!(out.stats.missing_q, 1);
    }

    #[test]
    fn test_q_column_is_absolute() {
        // Range starting at column C: Q is still absolute column 16.
        let mut grid = Grid::with_range(UsedRange::new((2, 2), (3, Q_COLUMN_INDEX)));
        grid.set(2, 2, RawCell::value("Primeira"));
        grid.set(3, 2, RawCell::value("x"));
        grid.set(3, Q_COLUMN_INDEX, RawCell::value(42.0));

        let out = ingest_sheet("a.xlsx", "Plan1", &grid);
        assert_eq!(out.headers[0], "Primeira");
        assert_eq!(out.headers[1], "B");
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].q, "42");

        // Range starting past column Q never reaches it.
        let mut late = Grid::new();
        late.set(0, 20, RawCell::value("h"));
        late.set(1, 20, RawCell::value("v"));
        assert!(ingest_sheet("a.xlsx", "Plan1", &late).rows.is_empty());
    }

    #[test]
    fn test_formulas_are_counted() {
        let mut grid = wide_grid(&[("1", "A")]);
        grid.set(0, 3, RawCell::formula("Total"));
        grid.set(1, 1, RawCell::formula(3.0));
        grid.mark_formula(2, 5);

        let out = ingest_sheet("a.xlsx", "Plan1", &grid);
        assert_eq!(out.stats.formulas, 3);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].get("Valor"), Some(&CellValue::Number(3.0)));
    }

    #[test]
    fn test_row_with_only_q_is_kept() {
        let out = ingest_sheet("a.xlsx", "Plan1", &wide_grid(&[("", "Z")]));
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].q, "Z");
    }
}
