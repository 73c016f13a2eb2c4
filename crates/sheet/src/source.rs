use crate::csv::{CsvOptions, CsvSource};
use crate::error::Result;
use crate::grid::Grid;
use crate::xlsx::XlsxSource;
use std::path::Path;

/// A workbook that can be decoded into named sheet grids.
///
/// Sheets are returned in the workbook's declared order. A decode failure anywhere in the
/// workbook fails the whole read.
pub trait WorkbookSource {
    /// Name recorded as the rows' source file.
    fn file_name(&self) -> &str;

    /// Decode every sheet.
    fn read_sheets(&mut self) -> Result<Vec<(String, Grid)>>;
}

/// A workbook already held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    file_name: String,
    sheets: Vec<(String, Grid)>,
}

impl MemorySource {
    #[must_use]
    pub fn new(file_name: impl Into<String>) -> Self {
        MemorySource {
            file_name: file_name.into(),
            sheets: Vec::new(),
        }
    }

    /// Append a sheet
    #[must_use]
    pub fn with_sheet(mut self, name: impl Into<String>, grid: Grid) -> Self {
        self.sheets.push((name.into(), grid));
        self
    }
}

impl WorkbookSource for MemorySource {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn read_sheets(&mut self) -> Result<Vec<(String, Grid)>> {
        Ok(self.sheets.clone())
    }
}

/// File name shown for a path (its last component).
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Pick a decoder by file extension: `csv`/`tsv`/`txt` go through the CSV reader, everything
/// else through calamine.
#[must_use]
pub fn open_source<P: AsRef<Path>>(path: P, csv_options: &CsvOptions) -> Box<dyn WorkbookSource> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" | "txt" => Box::new(CsvSource::new(path, csv_options.clone())),
        "tsv" => Box::new(CsvSource::new(path, csv_options.clone().with_delimiter(b'\t'))),
        _ => Box::new(XlsxSource::new(path)),
    }
}
