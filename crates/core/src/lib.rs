//! # qtally-core
//!
//! Row model and the pure half of the qtally pipeline.
//!
//! This crate provides:
//! - Cell values and locale-tolerant numeric normalization
//! - Header reconciliation (blank and duplicate headers)
//! - The row store produced by an ingestion run
//! - Filtering, grouping and aggregation
//! - Summary export and snapshot persistence
//!
//! ```
//! use indexmap::IndexMap;
//! use qtally_core::{aggregate, CellValue, GroupBy, Row, RowStore};
//!
//! let mut values = IndexMap::new();
//! values.insert("Valor".to_string(), CellValue::text("1.000,50"));
//! let store = RowStore::new(
//!     vec![Row::new("10", "a.xlsx", "Plan1", values)],
//!     vec!["Valor".to_string()],
//!     0,
//!     vec!["a.xlsx".to_string()],
//! );
//!
//! let rows: Vec<&Row> = store.rows().iter().collect();
//! let agg = aggregate(&rows, Some("Valor"), GroupBy::Q);
//! assert_eq!(agg[0].count, 1);
//! assert_eq!(agg[0].metric_sum, 1000.5);
//! ```

/// Grouping and aggregation.
pub mod aggregate;
mod cell;
/// Error types and result aliases.
pub mod error;
/// Summary export.
pub mod export;
/// Row filtering stages and selectable value lists.
pub mod filter;
/// Header reconciliation and positional column names.
pub mod headers;
/// Numeric normalization.
pub mod numeric;
mod row;
/// Snapshot persistence.
pub mod snapshot;
mod store;
/// Selections and derived dashboard state.
pub mod view;

pub use aggregate::{
    aggregate, aggregate_by, numeric_headers, AggregateEntry, AggregateSeries, GroupBy, OriginMode,
};
pub use cell::CellValue;
pub use error::{CoreError, Result};
pub use filter::FilterState;
pub use headers::{column_name, header_letters, reconcile_headers, HeaderLetter};
pub use numeric::normalize;
pub use row::Row;
pub use snapshot::{FileSnapshotStore, Snapshot, SnapshotStore};
pub use store::RowStore;
pub use view::{DashboardView, Kpis, Selections};
