//! # qtally-sheet
//!
//! Workbook decoding and ingestion for qtally.
//!
//! Workbooks are read through [`WorkbookSource`] implementations into sparse [`Grid`]s, each
//! sheet is turned into rows keyed by the value in column Q, and a batch of workbooks becomes
//! one [`RowStore`](qtally_core::RowStore).
//!
//! # Examples
//!
//! ## Ingesting in-memory sheets
//!
//! ```
//! use qtally_sheet::{ingest_all, Grid, MemorySource, RawCell, WorkbookSource, Q_COLUMN_INDEX};
//!
//! let mut grid = Grid::new();
//! grid.set(0, 0, RawCell::value("Valor"));
//! grid.set(0, Q_COLUMN_INDEX, RawCell::value("Codigo"));
//! grid.set(1, 0, RawCell::value("1.000,50"));
//! grid.set(1, Q_COLUMN_INDEX, RawCell::value("10"));
//!
//! let mut sources: Vec<Box<dyn WorkbookSource>> =
//!     vec![Box::new(MemorySource::new("a.xlsx").with_sheet("Plan1", grid))];
//! let store = ingest_all(&mut sources).unwrap();
//!
//! assert_eq!(store.len(), 1);
//! assert_eq!(store.rows()[0].q, "10");
//! ```
//!
//! ## Reading files
//!
//! ```no_run
//! use qtally_sheet::{open_source, CsvOptions, Session};
//!
//! let mut session = Session::new();
//! let mut sources = vec![open_source("vendas.xlsx", &CsvOptions::default())];
//! session.ingest(&mut sources).unwrap();
//! println!("{} groups", session.view().by_q.len());
//! ```

mod csv;
mod error;
mod grid;
mod ingest;
mod pipeline;
mod session;
mod source;
mod xlsx;

pub use crate::csv::{grid_from_csv_reader, CsvOptions, CsvSource, CSV_SHEET_NAME};
pub use error::{IngestError, Result};
pub use grid::{Grid, RawCell, UsedRange};
pub use ingest::{ingest_sheet, SheetIngest, SheetStats, Q_COLUMN_INDEX};
pub use pipeline::{ingest_all, IngestContext};
pub use session::Session;
pub use source::{open_source, MemorySource, WorkbookSource};
pub use xlsx::XlsxSource;
