//! Grouping and aggregation of filtered rows.

use crate::numeric::normalize;
use crate::row::Row;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Metric discovery looks at this many rows per header at most.
pub const METRIC_SAMPLE_SIZE: usize = 60;

/// Count and metric sum for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateEntry {
    pub group_key: String,
    pub count: usize,
    pub metric_sum: f64,
}

/// Which provenance field the comparison groups by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OriginMode {
    #[default]
    File,
    Sheet,
    FileSheet,
}

impl OriginMode {
    /// Provenance key of a row under this mode.
    #[must_use]
    pub fn key(self, row: &Row) -> String {
        match self {
            OriginMode::File => row.source_file.clone(),
            OriginMode::Sheet => row.sheet_name.clone(),
            OriginMode::FileSheet => format!("{} | {}", row.source_file, row.sheet_name),
        }
    }
}

/// Built-in grouping keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Q,
    Origin(OriginMode),
}

impl GroupBy {
    #[must_use]
    pub fn key(self, row: &Row) -> String {
        match self {
            GroupBy::Q => row.q.clone(),
            GroupBy::Origin(mode) => mode.key(row),
        }
    }
}

/// Group rows by `key`, counting rows and summing the metric column per group.
///
/// Values that do not normalize to a number add nothing to the sum. The result is sorted by
/// count, largest first; groups with equal counts keep the order in which they were first seen.
pub fn aggregate_by<F>(rows: &[&Row], metric: Option<&str>, key: F) -> Vec<AggregateEntry>
where
    F: Fn(&Row) -> String,
{
    let metric = metric.filter(|m| !m.is_empty());
    let mut groups: IndexMap<String, AggregateEntry> = IndexMap::new();

    for &row in rows {
        let group_key = key(row);
        let entry = groups
            .entry(group_key.clone())
            .or_insert_with(|| AggregateEntry {
                group_key,
                count: 0,
                metric_sum: 0.0,
            });
        entry.count += 1;

        if let Some(header) = metric {
            if let Some(n) = row.get(header).and_then(normalize) {
                entry.metric_sum += n;
            }
        }
    }

    let mut entries: Vec<AggregateEntry> = groups.into_values().collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

/// Aggregate with one of the built-in groupings.
#[must_use]
pub fn aggregate(rows: &[&Row], metric: Option<&str>, group_by: GroupBy) -> Vec<AggregateEntry> {
    aggregate_by(rows, metric, |row| group_by.key(row))
}

/// Headers that look numeric: at least one of the first 60 rows defining the header holds a
/// value that normalizes to a number.
#[must_use]
pub fn numeric_headers(rows: &[&Row], headers: &[String]) -> Vec<String> {
    headers
        .iter()
        .filter(|header| {
            rows.iter()
                .filter_map(|row| row.get(header.as_str()))
                .take(METRIC_SAMPLE_SIZE)
                .any(|value| normalize(value).is_some())
        })
        .cloned()
        .collect()
}

/// Index-aligned arrays handed to charts and tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateSeries {
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
    pub sums: Vec<f64>,
}

impl AggregateSeries {
    /// Build the arrays in entry order, sums rounded to two decimals.
    #[must_use]
    pub fn from_entries(entries: &[AggregateEntry]) -> Self {
        AggregateSeries {
            labels: entries.iter().map(|e| e.group_key.clone()).collect(),
            counts: entries.iter().map(|e| e.count).collect(),
            sums: entries.iter().map(|e| round2(e.metric_sum)).collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;

    fn row(q: &str, file: &str, sheet: &str, valor: CellValue) -> Row {
        let mut values = IndexMap::new();
        values.insert("Valor".to_string(), valor);
        Row::new(q, file, sheet, values)
    }

    fn sample() -> Vec<Row> {
        vec![
            row("b", "f1", "s1", CellValue::text("1,5")),
            row("a", "f1", "s2", CellValue::Number(2.0)),
            row("a", "f2", "s1", CellValue::text("x")),
            row("c", "f2", "s1", CellValue::Empty),
            row("b", "f2", "s2", CellValue::Number(1.0)),
        ]
    }

    #[test]
    fn test_group_by_q_sorted_with_stable_ties() {
        let rows = sample();
        let refs: Vec<&Row> = rows.iter().collect();
        let agg = aggregate(&refs, Some("Valor"), GroupBy::Q);

        let keys: Vec<&str> = agg.iter().map(|e| e.group_key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(agg[0].count, 2);
        assert!((agg[0].metric_sum - 2.5).abs() < 1e-9);
        assert!((agg[1].metric_sum - 2.0).abs() < 1e-9);
        assert_eq!(agg[2].metric_sum, 0.0);
    }

    #[test]
    fn test_counts_cover_every_row() {
        let rows = sample();
        let refs: Vec<&Row> = rows.iter().collect();
        for group_by in [
            GroupBy::Q,
            GroupBy::Origin(OriginMode::File),
            GroupBy::Origin(OriginMode::Sheet),
            GroupBy::Origin(OriginMode::FileSheet),
        ] {
            let agg = aggregate(&refs, None, group_by);
            assert_eq!(agg.iter().map(|e| e.count).sum::<usize>(), rows.len());
            assert!(agg.windows(2).all(|w| w[0].count >= w[1].count));
            assert!(agg.iter().all(|e| e.count >= 1));
            assert_eq!(agg, aggregate(&refs, None, group_by));
        }
    }

    #[test]
    fn test_origin_keys() {
        let rows = sample();
        let refs: Vec<&Row> = rows.iter().collect();
        let agg = aggregate(&refs, None, GroupBy::Origin(OriginMode::FileSheet));
        let keys: Vec<&str> = agg.iter().map(|e| e.group_key.as_str()).collect();
        assert_eq!(keys, vec!["f2 | s1", "f1 | s1", "f1 | s2", "f2 | s2"]);
    }

    #[test]
    fn test_no_metric_sums_zero() {
        let rows = sample();
        let refs: Vec<&Row> = rows.iter().collect();
        let agg = aggregate(&refs, Some(""), GroupBy::Q);
        assert!(agg.iter().all(|e| e.metric_sum == 0.0));
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[], Some("Valor"), GroupBy::Q).is_empty());
        assert!(AggregateSeries::from_entries(&[]).is_empty());
    }

    #[test]
    fn test_numeric_headers_sample_window() {
        let mut rows: Vec<Row> = (0..METRIC_SAMPLE_SIZE)
            .map(|_| {
                let mut values = IndexMap::new();
                values.insert("Late".to_string(), CellValue::text("n/a"));
                values.insert("Num".to_string(), CellValue::text("3,2"));
                Row::new("q", "f", "s", values)
            })
            .collect();
        let mut tail = IndexMap::new();
        tail.insert("Late".to_string(), CellValue::Number(1.0));
        rows.push(Row::new("q", "f", "s", tail));

        let mut other = IndexMap::new();
        other.insert("Text".to_string(), CellValue::text("abc"));
        rows.push(Row::new("q", "f", "s", other));

        let refs: Vec<&Row> = rows.iter().collect();
        let headers = vec!["Late".to_string(), "Num".to_string(), "Text".to_string()];
        assert_eq!(numeric_headers(&refs, &headers), vec!["Num"]);
    }

    #[test]
    fn test_series_rounds_sums() {
        let entries = vec![AggregateEntry {
            group_key: "A".to_string(),
            count: 3,
            metric_sum: 12.345_6,
        }];
        let series = AggregateSeries::from_entries(&entries);
        assert_eq!(series.labels, vec!["A"]);
        assert_eq!(series.counts, vec![3]);
        assert_eq!(series.sums, vec![12.35]);
    }
}
