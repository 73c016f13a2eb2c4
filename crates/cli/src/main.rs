//! # qtally-cli
//!
//! Command-line dashboard: ingest workbooks, filter, and summarize rows by their Q value.

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use comfy_table::Table;
use qtally_core::export::{save_summary, summary_to_string, SUMMARY_FILE_NAME};
use qtally_core::{
    AggregateEntry, AggregateSeries, DashboardView, FileSnapshotStore, OriginMode, Row, Selections,
};
use qtally_sheet::{open_source, CsvOptions, Session, WorkbookSource};
use qtally_viz::{dashboard_charts, dashboard_html};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// qtally - summarize spreadsheet rows by their Q column
#[derive(Parser)]
#[command(name = "qtally")]
#[command(author, version, about = "Group spreadsheet rows by column Q", long_about = None)]
struct Cli {
    /// Workbooks to ingest (xlsx, xlsm, xlsb, xls, ods, csv, tsv)
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Only rows from this sheet
    #[arg(long)]
    sheet: Option<String>,

    /// Only rows with this Q value
    #[arg(long)]
    q: Option<String>,

    /// Secondary filter column, by letter (A-Z)
    #[arg(long, value_name = "LETTER")]
    column: Option<String>,

    /// Value the secondary column must equal
    #[arg(long, requires = "column")]
    value: Option<String>,

    /// Numeric column to sum per group
    #[arg(short, long)]
    metric: Option<String>,

    /// Provenance used for the comparison
    #[arg(long, value_name = "MODE")]
    compare_by: Option<CompareBy>,

    /// Rows shown in the detail table
    #[arg(long)]
    max_rows: Option<usize>,

    /// Field delimiter for CSV input
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Write the per-Q summary to this file (resumo_por_coluna_Q.csv when no path is given)
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = SUMMARY_FILE_NAME)]
    export: Option<PathBuf>,

    /// Write the charts as an HTML page
    #[arg(long, value_name = "PATH")]
    chart: Option<PathBuf>,

    /// Output format (json, csv, table)
    #[arg(short = 'f', long = "format", default_value = "table")]
    format: OutputFormat,

    /// Do not save the dashboard state
    #[arg(long, conflicts_with = "restore")]
    no_persist: bool,

    /// Start from the last saved state instead of reading files
    #[arg(long, conflicts_with = "files")]
    restore: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output format for results.
#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// JSON output
    Json,
    /// Per-Q summary as `;`-separated text
    Csv,
    /// Pretty table output (default)
    #[default]
    Table,
}

/// Comparison grouping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum CompareBy {
    File,
    Sheet,
    FileSheet,
}

impl From<CompareBy> for OriginMode {
    fn from(mode: CompareBy) -> Self {
        match mode {
            CompareBy::File => OriginMode::File,
            CompareBy::Sheet => OriginMode::Sheet,
            CompareBy::FileSheet => OriginMode::FileSheet,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    if cli.files.is_empty() && !cli.restore {
        // Nothing to do - show help
        Cli::parse_from(["qtally", "--help"]);
        return Ok(());
    }

    let mut session = Session::new();
    if !cli.no_persist {
        match snapshot_dir() {
            Some(dir) => session = session.with_snapshots(Box::new(FileSnapshotStore::new(dir))),
            None => tracing::warn!("No data directory; dashboard state will not be saved"),
        }
    }

    if cli.restore {
        if !session.restore() {
            bail!("No saved dashboard state to restore");
        }
    } else {
        let csv_options = csv_options(cli.delimiter)?;
        let mut sources: Vec<Box<dyn WorkbookSource>> = cli
            .files
            .iter()
            .map(|path| open_source(path, &csv_options))
            .collect();
        session
            .ingest(&mut sources)
            .context("Failed to ingest workbooks")?;
    }

    let requested = apply_flags(session.selections().clone(), &cli);
    session.set_selections(requested.clone());
    warn_dropped(&requested, session.selections());

    let selections = session.selections().clone();
    let view = session.view();
    let metric = selections.metric.as_deref();

    match cli.format {
        OutputFormat::Table => print_dashboard(&view, &selections),
        OutputFormat::Json => {
            let report = serde_json::json!({
                "kpis": view.kpis,
                "metric": metric,
                "metricOptions": view.metric_options,
                "byQ": view.by_q,
                "comparison": view.by_origin,
                "rows": view.visible_rows(selections.max_rows),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Csv => {
            if view.by_q.is_empty() {
                eprintln!("{}", "No data to export".yellow());
            } else {
                print!("{}", summary_to_string(&view.by_q, metric)?);
            }
        }
    }

    if let Some(path) = &cli.export {
        save_summary(path, &view.by_q, metric)
            .with_context(|| format!("Failed to export summary to {}", path.display()))?;
        eprintln!("{} {}", "Summary written to".green(), path.display());
    }

    if let Some(path) = &cli.chart {
        let charts = dashboard_charts(
            &AggregateSeries::from_entries(&view.by_q),
            &AggregateSeries::from_entries(&view.by_origin),
            metric,
        );
        std::fs::write(path, dashboard_html("Resumo por coluna Q", &charts))
            .with_context(|| format!("Failed to write charts to {}", path.display()))?;
        eprintln!("{} {}", "Charts written to".green(), path.display());
    }

    Ok(())
}

/// Get the directory holding the dashboard snapshot.
fn snapshot_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("qtally"))
}

fn csv_options(delimiter: Option<char>) -> Result<CsvOptions> {
    let options = CsvOptions::default();
    match delimiter {
        None => Ok(options),
        Some(c) if c.is_ascii() => Ok(options.with_delimiter(c as u8)),
        Some(c) => bail!("Delimiter must be a single ASCII character, got '{c}'"),
    }
}

/// Overlay command-line selections on the current ones. Flags that were not given keep the
/// current (possibly restored) value.
fn apply_flags(mut selections: Selections, cli: &Cli) -> Selections {
    if let Some(sheet) = &cli.sheet {
        selections.filter.sheet = Some(sheet.clone());
    }
    if let Some(q) = &cli.q {
        selections.filter.q = Some(q.trim().to_string());
    }
    if let Some(letter) = &cli.column {
        selections.filter.secondary_column = Some(letter.trim().to_ascii_uppercase());
        selections.filter.secondary_value = None;
    }
    if let Some(value) = &cli.value {
        selections.filter.secondary_value = Some(value.clone());
    }
    if let Some(metric) = &cli.metric {
        selections.metric = Some(metric.clone());
    }
    if let Some(mode) = cli.compare_by {
        selections.compare_by = mode.into();
    }
    if let Some(max_rows) = cli.max_rows {
        selections.max_rows = max_rows;
    }
    selections
}

/// Tell the user about selections the data does not offer.
fn warn_dropped(requested: &Selections, applied: &Selections) {
    let checks = [
        ("--sheet", &requested.filter.sheet, &applied.filter.sheet),
        ("--q", &requested.filter.q, &applied.filter.q),
        (
            "--column",
            &requested.filter.secondary_column,
            &applied.filter.secondary_column,
        ),
        (
            "--value",
            &requested.filter.secondary_value,
            &applied.filter.secondary_value,
        ),
        ("--metric", &requested.metric, &applied.metric),
    ];

    for (flag, wanted, kept) in checks {
        if let (Some(wanted), None) = (wanted, kept) {
            eprintln!(
                "{} ignoring {} '{}': not present in the data",
                "Warning:".yellow().bold(),
                flag,
                wanted
            );
        }
    }
}

/// Print every dashboard section.
fn print_dashboard(view: &DashboardView<'_>, selections: &Selections) {
    let metric = selections.metric.as_deref();

    println!("{}", "Resumo".cyan().bold());
    println!("  Arquivos:           {}", view.kpis.files);
    println!("  Linhas validas:     {}", view.kpis.rows);
    println!("  Linhas com Q:       {}", view.kpis.rows_with_q);
    println!("  Grupos de Q:        {}", view.kpis.groups);
    println!("  Formulas ignoradas: {}", view.kpis.formula_ignored);
    println!();

    if view.metric_options.is_empty() {
        println!("{}", "No numeric columns found".yellow());
    } else {
        println!("{} {}", "Numeric columns:".cyan().bold(), view.metric_options.join(", "));
    }
    println!();

    println!("{}", "Por Q".cyan().bold());
    println!("{}", aggregate_table("Q", &view.by_q, metric));

    println!("{}", "Comparacao".cyan().bold());
    if view.by_origin.is_empty() {
        println!("(sem comparacao)\n");
    } else {
        println!("{}", aggregate_table("Origem", &view.by_origin, metric));
    }

    let visible = view.visible_rows(selections.max_rows);
    println!(
        "{} ({} de {})",
        "Linhas".cyan().bold(),
        visible.len(),
        view.rows.len()
    );
    if visible.is_empty() {
        println!("(empty table)");
    } else {
        let (headers, body) = rows_table(visible);
        println!("{}", format_table(&headers, &body));
    }
}

/// Aggregate entries as a table with count and metric sum columns.
fn aggregate_table(key: &str, entries: &[AggregateEntry], metric: Option<&str>) -> String {
    if entries.is_empty() {
        return "(empty table)\n".to_string();
    }

    let headers = vec![
        key.to_string(),
        "Quantidade".to_string(),
        match metric {
            Some(metric) => format!("Soma ({metric})"),
            None => "Soma".to_string(),
        },
    ];
    let body: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            vec![
                e.group_key.clone(),
                e.count.to_string(),
                format!("{:.2}", e.metric_sum),
            ]
        })
        .collect();
    format_table(&headers, &body)
}

/// Provenance, Q, then every header with a value in at least one of the rows.
fn rows_table(rows: &[&Row]) -> (Vec<String>, Vec<Vec<String>>) {
    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        for (header, value) in &row.values {
            if !value.is_empty() && !columns.contains(&header.as_str()) {
                columns.push(header);
            }
        }
    }

    let mut headers = vec!["Arquivo".to_string(), "Aba".to_string(), "Q".to_string()];
    headers.extend(columns.iter().map(|c| (*c).to_string()));

    let body = rows
        .iter()
        .map(|row| {
            let mut line = vec![row.source_file.clone(), row.sheet_name.clone(), row.q.clone()];
            line.extend(columns.iter().map(|c| row.text(c)));
            line
        })
        .collect();
    (headers, body)
}

/// Border style of arrow's pretty printer.
const TABLE_PRESET: &str = "||--+-++|    ++++++";

/// Render rows as an ASCII table.
fn format_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut table = Table::new();
    table.load_preset(TABLE_PRESET);
    table.set_header(headers);
    for row in rows {
        table.add_row(row);
    }
    format!("{table}\n")
}
