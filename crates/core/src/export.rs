use crate::aggregate::AggregateEntry;
use crate::error::{CoreError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// File name offered for the summary download.
pub const SUMMARY_FILE_NAME: &str = "resumo_por_coluna_Q.csv";

/// Label of the sum column: `soma_<metric>`, or `soma_metrica` with no metric selected.
#[must_use]
pub fn metric_sum_label(metric: Option<&str>) -> String {
    match metric.filter(|m| !m.is_empty()) {
        Some(metric) => format!("soma_{metric}"),
        None => "soma_metrica".to_string(),
    }
}

/// Write the per-Q summary as `;`-separated lines: `Q;quantidade;<sum label>` followed by one
/// line per entry with the sum fixed to two decimals.
pub fn write_summary<W: Write>(
    writer: W,
    entries: &[AggregateEntry],
    metric: Option<&str>,
) -> Result<()> {
    if entries.is_empty() {
        return Err(CoreError::NothingToExport);
    }

    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer.write_record(["Q".to_string(), "quantidade".to_string(), metric_sum_label(metric)])?;
    for entry in entries {
        csv_writer.write_record([
            entry.group_key.clone(),
            entry.count.to_string(),
            format!("{:.2}", entry.metric_sum),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Render the summary to a string.
pub fn summary_to_string(entries: &[AggregateEntry], metric: Option<&str>) -> Result<String> {
    let mut buffer = Vec::new();
    write_summary(&mut buffer, entries, metric)?;
    String::from_utf8(buffer).map_err(|e| CoreError::Internal(e.to_string()))
}

/// Save the summary to a file.
pub fn save_summary<P: AsRef<Path>>(
    path: P,
    entries: &[AggregateEntry],
    metric: Option<&str>,
) -> Result<()> {
    if entries.is_empty() {
        return Err(CoreError::NothingToExport);
    }
    let file = File::create(path)?;
    write_summary(BufWriter::new(file), entries, metric)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, count: usize, sum: f64) -> AggregateEntry {
        AggregateEntry {
            group_key: key.to_string(),
            count,
            metric_sum: sum,
        }
    }

    #[test]
    fn test_summary_without_metric() {
        let text = summary_to_string(&[entry("A", 3, 12.5)], None).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Q;quantidade;soma_metrica", "A;3;12.50"]);
    }

    #[test]
    fn test_summary_with_metric() {
        let text =
            summary_to_string(&[entry("10", 2, 1003.0), entry("7", 1, 0.0)], Some("Valor")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Q;quantidade;soma_Valor", "10;2;1003.00", "7;1;0.00"]);
    }

    #[test]
    fn test_empty_summary_is_rejected() {
        assert!(matches!(
            summary_to_string(&[], None),
            Err(CoreError::NothingToExport)
        ));
    }

    #[test]
    fn test_save_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SUMMARY_FILE_NAME);
        save_summary(&path, &[entry("A", 1, 0.5)], None).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Q;quantidade;soma_metrica\nA;1;0.50"));
    }
}
