//! The four dashboard charts and the page that holds them.

use crate::{escape_html, ChartKind, ChartSpec, Color, Dataset};
use qtally_core::AggregateSeries;

const PALETTE: [&str; 13] = [
    "#3f7d38", "#5a9c58", "#7bb36f", "#98c987", "#b8dba6", "#2f6b8a", "#5f90b8", "#f0aa33",
    "#d86a34", "#9a4f9f", "#c2698f", "#3b8d78", "#d15f5f",
];

const ACCENT: &str = "#184f28";

/// One color per bar, cycling through the palette.
fn palette(size: usize) -> Color {
    Color::PerPoint(
        (0..size)
            .map(|i| PALETTE[i % PALETTE.len()].to_string())
            .collect(),
    )
}

fn counts(series: &AggregateSeries) -> Vec<f64> {
    series.counts.iter().map(|&c| c as f64).collect()
}

/// Rows per Q value.
#[must_use]
pub fn count_chart(by_q: &AggregateSeries) -> ChartSpec {
    ChartSpec::new(ChartKind::Bar, "Linhas por Q")
        .with_labels(by_q.labels.clone())
        .with_dataset(
            Dataset::new("Linhas por Q", counts(by_q)).background(palette(by_q.labels.len())),
        )
}

/// Share of rows per Q value.
#[must_use]
pub fn share_chart(by_q: &AggregateSeries) -> ChartSpec {
    ChartSpec::new(ChartKind::Doughnut, "Participacao por Q")
        .with_labels(by_q.labels.clone())
        .with_dataset(
            Dataset::new("Participacao", counts(by_q)).background(palette(by_q.labels.len())),
        )
}

/// Metric sum per Q value.
#[must_use]
pub fn metric_chart(by_q: &AggregateSeries, metric: Option<&str>) -> ChartSpec {
    let label = match metric {
        Some(metric) => format!("Soma de {metric} por Q"),
        None => "Selecione coluna numerica".to_string(),
    };

    let mut chart = ChartSpec::new(ChartKind::Line, "Metrica por Q")
        .with_labels(by_q.labels.clone())
        .with_dataset(
            Dataset::new(label, by_q.sums.clone())
                .background(Color::Single("rgba(24,79,40,0.12)".to_string()))
                .border(ACCENT, None)
                .filled(0.25),
        );
    chart.options.empty_message = "Sem dados para a metrica".to_string();
    chart
}

/// Count and metric sum per file/sheet, side by side.
#[must_use]
pub fn compare_chart(by_origin: &AggregateSeries, metric: Option<&str>) -> ChartSpec {
    let sum_label = match metric {
        Some(metric) => format!("Soma ({metric})"),
        None => "Soma da metrica".to_string(),
    };

    let mut chart = ChartSpec::new(ChartKind::Bar, "Comparacao por origem")
        .with_labels(by_origin.labels.clone())
        .with_dataset(
            Dataset::new("Quantidade", counts(by_origin))
                .background(palette(by_origin.labels.len())),
        )
        .with_dataset(
            Dataset::new(sum_label, by_origin.sums.clone())
                .background(Color::Single("rgba(24,79,40,0.24)".to_string()))
                .border(ACCENT, Some(1)),
        );
    chart.options.empty_message = "Sem comparacao".to_string();
    chart
}

/// All dashboard charts in display order.
#[must_use]
pub fn dashboard_charts(
    by_q: &AggregateSeries,
    by_origin: &AggregateSeries,
    metric: Option<&str>,
) -> Vec<ChartSpec> {
    vec![
        count_chart(by_q),
        share_chart(by_q),
        metric_chart(by_q, metric),
        compare_chart(by_origin, metric),
    ]
}

/// Render charts into one standalone page.
#[must_use]
pub fn dashboard_html(title: &str, charts: &[ChartSpec]) -> String {
    let sections: Vec<String> = charts
        .iter()
        .enumerate()
        .map(|(i, chart)| chart.html_fragment(&format!("chart-{i}")))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
    <style>
        body {{ font-family: sans-serif; margin: 2rem; }}
        .grid {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(420px, 1fr)); gap: 1.5rem; }}
        .canvas {{ position: relative; height: 320px; }}
        .empty {{ color: #777; font-style: italic; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <div class="grid">
{sections}
    </div>
</body>
</html>"#,
        title = escape_html(title),
        sections = sections.join("\n"),
    )
}
