use crate::error::{IngestError, Result};
use crate::grid::{Grid, RawCell};
use crate::source::WorkbookSource;
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::NaiveDateTime;
use qtally_core::CellValue;
use std::path::{Path, PathBuf};

fn iso_day(datetime: NaiveDateTime) -> CellValue {
    CellValue::Date(datetime.date().format("%Y-%m-%d").to_string())
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::text(s),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => iso_day(datetime),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => CellValue::date(s),
        Data::DurationIso(s) => CellValue::text(s),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// Build a grid from a sheet's cached values and its formulas.
///
/// The used range is the union of both ranges, so a formula whose cached value is empty still
/// counts as part of the sheet.
fn grid_from_ranges(values: &Range<Data>, formulas: &Range<String>) -> Grid {
    let mut grid = Grid::new();

    for range_corner in [values.start(), values.end()].into_iter().flatten() {
        grid.include(range_corner.0, range_corner.1);
    }
    for range_corner in [formulas.start(), formulas.end()].into_iter().flatten() {
        grid.include(range_corner.0, range_corner.1);
    }

    if let Some((row0, col0)) = values.start() {
        for (r, c, data) in values.used_cells() {
            grid.set(
                row0 + r as u32,
                col0 + c as u32,
                RawCell::value(data_to_cell_value(data)),
            );
        }
    }

    if let Some((row0, col0)) = formulas.start() {
        for (r, c, formula) in formulas.used_cells() {
            if !formula.trim().is_empty() {
                grid.mark_formula(row0 + r as u32, col0 + c as u32);
            }
        }
    }

    grid
}

/// Workbook read through calamine (xlsx, xlsm, xlsb, xls, ods).
#[derive(Debug, Clone)]
pub struct XlsxSource {
    path: PathBuf,
    file_name: String,
}

impl XlsxSource {
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let file_name = crate::source::display_name(&path);
        XlsxSource { path, file_name }
    }
}

impl WorkbookSource for XlsxSource {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn read_sheets(&mut self) -> Result<Vec<(String, Grid)>> {
        let mut workbook = open_workbook_auto(&self.path)
            .map_err(|e| IngestError::decode(&self.file_name, e))?;

        let mut sheets = Vec::new();
        for sheet_name in workbook.sheet_names() {
            let values = workbook
                .worksheet_range(&sheet_name)
                .map_err(|e| IngestError::decode(&self.file_name, e))?;

            // Not every format exposes formulas; treat that as "no formulas".
            let formulas = workbook.worksheet_formula(&sheet_name).unwrap_or_else(|e| {
                tracing::debug!(
                    "No formulas for {}/{}: {}",
                    self.file_name,
                    sheet_name,
                    e
                );
                Range::empty()
            });

            sheets.push((sheet_name, grid_from_ranges(&values, &formulas)));
        }

        Ok(sheets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::UsedRange;
    use calamine::CellErrorType;
    use rust_xlsxwriter::{Formula, Workbook};
    use tempfile::tempdir;

    #[test]
    fn test_iso_day_drops_time() {
        let datetime = chrono::NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        assert_eq!(iso_day(datetime), CellValue::Date("2023-12-31".to_string()));
    }

    #[test]
    fn test_data_conversion() {
        assert_eq!(data_to_cell_value(&Data::Empty), CellValue::Empty);
        assert_eq!(data_to_cell_value(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(
            data_to_cell_value(&Data::String("  abc ".to_string())),
            CellValue::text("abc")
        );
        assert_eq!(
            data_to_cell_value(&Data::DateTimeIso("2024-02-29T10:00:00".to_string())),
            CellValue::Date("2024-02-29".to_string())
        );
        assert_eq!(
            data_to_cell_value(&Data::Error(CellErrorType::Div0)),
            CellValue::Text("#DIV/0!".to_string())
        );
    }

    #[test]
    fn test_read_workbook_with_formulas() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vendas.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Plan1").unwrap();
        sheet.write_string(0, 0, "Nome").unwrap();
        sheet.write_string(0, 16, "Codigo").unwrap();
        sheet.write_string(1, 0, "Ana").unwrap();
        sheet.write_number(1, 1, 4.5).unwrap();
        sheet.write_formula(1, 2, Formula::new("=B2*2")).unwrap();
        sheet.write_string(1, 16, "10").unwrap();
        workbook.add_worksheet().set_name("Vazia").unwrap();
        workbook.save(&path).unwrap();

        let mut source = XlsxSource::new(&path);
        assert_eq!(source.file_name(), "vendas.xlsx");

        let sheets = source.read_sheets().unwrap();
        assert_eq!(sheets.len(), 2);

        let (name, grid) = &sheets[0];
        assert_eq!(name, "Plan1");
        assert_eq!(grid.used_range(), Some(UsedRange::new((0, 0), (1, 16))));
        assert_eq!(grid.cell_at(1, 0).unwrap().value, CellValue::text("Ana"));
        assert_eq!(grid.cell_at(1, 1).unwrap().value, CellValue::Number(4.5));
        assert!(grid.cell_at(1, 2).unwrap().is_formula);
        assert!(!grid.cell_at(1, 1).unwrap().is_formula);

        assert_eq!(sheets[1].0, "Vazia");
        assert_eq!(sheets[1].1.used_range(), None);
    }

    #[test]
    fn test_corrupt_file_is_a_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"definitely not a zip archive").unwrap();

        let err = XlsxSource::new(&path).read_sheets().unwrap_err();
        assert!(matches!(err, IngestError::Decode { ref file, .. } if file == "broken.xlsx"));
    }
}
