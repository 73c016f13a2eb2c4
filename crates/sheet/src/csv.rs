use crate::error::{IngestError, Result};
use crate::grid::Grid;
use crate::source::WorkbookSource;
use encoding_rs::WINDOWS_1252;
use qtally_core::CellValue;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Name given to the single sheet of a delimited text file.
pub const CSV_SHEET_NAME: &str = "Sheet1";

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// CSV reader options
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Whether numeric-looking fields become numbers
    pub infer_types: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: b',',
            quote: b'"',
            infer_types: true,
        }
    }
}

impl CsvOptions {
    /// Set the delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether to infer types
    #[must_use]
    pub fn with_type_inference(mut self, infer_types: bool) -> Self {
        self.infer_types = infer_types;
        self
    }
}

/// Decode one field as UTF-8, falling back to Windows-1252 (Excel's CSV export on
/// Portuguese-locale systems). A UTF-8 BOM on the first field is dropped.
fn decode_field(field: &[u8], first: bool) -> Cow<'_, str> {
    let field = match field.strip_prefix(UTF8_BOM) {
        Some(rest) if first => rest,
        _ => field,
    };
    match std::str::from_utf8(field) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => WINDOWS_1252.decode(field).0,
    }
}

/// Read delimited text into a grid anchored at `A1`.
pub fn grid_from_csv_reader<R: Read>(reader: R, options: &CsvOptions) -> csv::Result<Grid> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .quote(options.quote)
        .has_headers(false) // The ingestor handles headers
        .flexible(true)
        .from_reader(reader);

    let mut data: Vec<Vec<CellValue>> = Vec::new();
    for result in csv_reader.byte_records() {
        let record = result?;
        let first_row = data.is_empty();
        let row: Vec<CellValue> = record
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let field = decode_field(field, first_row && i == 0);
                if options.infer_types {
                    CellValue::infer(&field)
                } else {
                    CellValue::text(field)
                }
            })
            .collect();
        data.push(row);
    }

    Ok(Grid::from_rows(data))
}

/// A CSV/TSV file read as a one-sheet workbook.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    file_name: String,
    options: CsvOptions,
}

impl CsvSource {
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P, options: CsvOptions) -> Self {
        let path = path.as_ref().to_path_buf();
        let file_name = crate::source::display_name(&path);
        CsvSource {
            path,
            file_name,
            options,
        }
    }
}

impl WorkbookSource for CsvSource {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn read_sheets(&mut self) -> Result<Vec<(String, Grid)>> {
        let file = File::open(&self.path).map_err(|e| IngestError::decode(&self.file_name, e))?;
        let grid = grid_from_csv_reader(BufReader::new(file), &self.options)
            .map_err(|e| IngestError::decode(&self.file_name, e))?;
        Ok(vec![(CSV_SHEET_NAME.to_string(), grid)])
    }
}
