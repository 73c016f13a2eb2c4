//! Derived dashboard state: everything a consumer needs to render one refresh.

use crate::aggregate::{aggregate, numeric_headers, AggregateEntry, GroupBy, OriginMode};
use crate::filter::{q_values, secondary_values, sheet_names, FilterState};
use crate::row::Row;
use crate::store::RowStore;
use serde::{Deserialize, Serialize};

/// Default number of rows shown in the detail table.
pub const DEFAULT_MAX_ROWS: usize = 200;

/// User selections that drive filtering and aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Selections {
    pub filter: FilterState,
    pub metric: Option<String>,
    pub compare_by: OriginMode,
    pub max_rows: usize,
}

impl Default for Selections {
    fn default() -> Self {
        Selections {
            filter: FilterState::default(),
            metric: None,
            compare_by: OriginMode::default(),
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

impl Selections {
    /// Drop selections that the current store no longer offers.
    ///
    /// Each list is computed from the rows left by the stages before it, so a sheet change can
    /// clear the Q selection and a Q change can clear the secondary value.
    pub fn reconcile(&mut self, store: &RowStore) {
        let all: Vec<&Row> = store.rows().iter().collect();

        if let Some(metric) = &self.metric {
            if !metric_options(store, &all).contains(metric) {
                self.metric = None;
            }
        }

        if let Some(sheet) = &self.filter.sheet {
            if !sheet_names(&all).contains(sheet) {
                self.filter.sheet = None;
            }
        }

        if let Some(q) = &self.filter.q {
            let sheet_rows = crate::filter::by_sheet(all.clone(), self.filter.sheet.as_deref());
            if !q_values(&sheet_rows).contains(q) {
                self.filter.q = None;
            }
        }

        if let Some(letter) = &self.filter.secondary_column {
            if store.header_for_letter(letter).is_none() {
                self.filter.secondary_column = None;
            }
        }

        if let Some(value) = &self.filter.secondary_value {
            let offered = self
                .filter
                .secondary_header(store)
                .map(|header| secondary_values(&self.filter.apply_upstream(store), header))
                .unwrap_or_default();
            if !offered.contains(value) {
                self.filter.secondary_value = None;
            }
        }
    }

    fn metric(&self) -> Option<&str> {
        self.metric.as_deref().filter(|m| !m.is_empty())
    }
}

/// Numeric headers, minus the headers that named the Q column.
fn metric_options(store: &RowStore, rows: &[&Row]) -> Vec<String> {
    let candidates: Vec<String> = store
        .headers()
        .iter()
        .filter(|header| !store.q_headers().contains(header))
        .cloned()
        .collect();
    numeric_headers(rows, &candidates)
}

/// Headline counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub files: usize,
    pub rows: usize,
    pub rows_with_q: usize,
    pub groups: usize,
    pub formula_ignored: usize,
}

/// One refresh of the dashboard, borrowed from the store.
#[derive(Debug, Clone)]
pub struct DashboardView<'a> {
    pub rows: Vec<&'a Row>,
    pub by_q: Vec<AggregateEntry>,
    pub by_origin: Vec<AggregateEntry>,
    pub kpis: Kpis,
    pub metric_options: Vec<String>,
    pub sheet_options: Vec<String>,
    pub q_options: Vec<String>,
    pub secondary_options: Vec<String>,
}

impl<'a> DashboardView<'a> {
    /// Compute the view for the given selections. Pure: the store is only read.
    #[must_use]
    pub fn compute(store: &'a RowStore, selections: &Selections) -> Self {
        let all: Vec<&Row> = store.rows().iter().collect();
        let filter = &selections.filter;

        let sheet_rows = crate::filter::by_sheet(all.clone(), filter.sheet.as_deref());
        let upstream = filter.apply_upstream(store);
        let secondary_options = filter
            .secondary_header(store)
            .map(|header| secondary_values(&upstream, header))
            .unwrap_or_default();

        let rows = filter.apply(store);
        let metric = selections.metric();
        let by_q = aggregate(&rows, metric, GroupBy::Q);
        let by_origin = aggregate(&rows, metric, GroupBy::Origin(selections.compare_by));

        let kpis = Kpis {
            files: store.source_files().len(),
            rows: rows.len(),
            rows_with_q: rows.len(),
            groups: by_q.len(),
            formula_ignored: store.formula_ignored(),
        };

        DashboardView {
            metric_options: metric_options(store, &all),
            sheet_options: sheet_names(&all),
            q_options: q_values(&sheet_rows),
            secondary_options,
            rows,
            by_q,
            by_origin,
            kpis,
        }
    }

    /// The rows shown in the detail table.
    #[must_use]
    pub fn visible_rows(&self, max_rows: usize) -> &[&'a Row] {
        &self.rows[..self.rows.len().min(max_rows)]
    }
}
