//! # qtally-viz
//!
//! Chart specifications for qtally aggregates.
//!
//! Charts are plain data built from [`AggregateSeries`](qtally_core::AggregateSeries) and can be
//! rendered as:
//! - JSON for any frontend
//! - Standalone HTML pages using Chart.js

mod dashboard;

pub use dashboard::{
    compare_chart, count_chart, dashboard_charts, dashboard_html, metric_chart, share_chart,
};

use qtally_core::Result;
use serde::{Deserialize, Serialize};

/// Chart specification for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub chart_type: ChartKind,
    pub title: String,
    pub data: ChartData,
    pub options: ChartOptions,
}

/// Chart type for visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Doughnut,
}

impl ChartKind {
    /// Chart.js type name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Doughnut => "doughnut",
        }
    }
}

/// Chart data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// One color for the whole dataset, or one per data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Single(String),
    PerPoint(Vec<String>),
}

/// A dataset in a chart. Field names follow Chart.js.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
    #[serde(default)]
    pub fill: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
}

impl Dataset {
    /// Create a dataset with no styling.
    #[must_use]
    pub fn new(label: impl Into<String>, data: Vec<f64>) -> Self {
        Dataset {
            label: label.into(),
            data,
            background_color: None,
            border_color: None,
            border_width: None,
            fill: false,
            tension: None,
        }
    }

    #[must_use]
    pub fn background(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }

    #[must_use]
    pub fn border(mut self, color: impl Into<String>, width: Option<u32>) -> Self {
        self.border_color = Some(color.into());
        self.border_width = width;
        self
    }

    /// Fill the area under a line with the given curve tension.
    #[must_use]
    pub fn filled(mut self, tension: f64) -> Self {
        self.fill = true;
        self.tension = Some(tension);
        self
    }
}

/// Chart rendering options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    /// Text shown instead of the chart when it has no data.
    pub empty_message: String,
}

impl Default for ChartOptions {
    fn default() -> Self {
        ChartOptions {
            empty_message: "Sem dados".to_string(),
        }
    }
}

/// Escape HTML special characters to prevent XSS.
pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Serialize for a `<script>` block without letting the data close the tag.
pub(crate) fn script_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_default()
        .replace("</", "<\\/")
}

impl ChartSpec {
    /// Create a new chart specification.
    #[must_use]
    pub fn new(chart_type: ChartKind, title: impl Into<String>) -> Self {
        Self {
            chart_type,
            title: title.into(),
            data: ChartData::default(),
            options: ChartOptions::default(),
        }
    }

    #[must_use]
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.data.labels = labels;
        self
    }

    #[must_use]
    pub fn with_dataset(mut self, dataset: Dataset) -> Self {
        self.data.datasets.push(dataset);
        self
    }

    /// A chart with no labels renders as its empty message.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.labels.is_empty()
    }

    /// Convert to JSON string for frontend rendering.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Generate a standalone HTML page with embedded Chart.js.
    #[must_use]
    pub fn to_html(&self) -> String {
        dashboard_html(&self.title, std::slice::from_ref(self))
    }

    /// Canvas (or placeholder) plus the script that draws it into element `id`.
    pub(crate) fn html_fragment(&self, id: &str) -> String {
        let title = escape_html(&self.title);
        if self.is_empty() {
            return format!(
                r#"<section class="chart">
    <h2>{title}</h2>
    <p class="empty">{message}</p>
</section>"#,
                title = title,
                message = escape_html(&self.options.empty_message),
            );
        }

        format!(
            r#"<section class="chart">
    <h2>{title}</h2>
    <div class="canvas"><canvas id="{id}"></canvas></div>
    <script>
        (function () {{
            const spec = {json};
            new Chart(document.getElementById('{id}'), {{
                type: '{chart_type}',
                data: spec.data,
                options: {{ responsive: true, maintainAspectRatio: false }}
            }});
        }})();
    </script>
</section>"#,
            title = title,
            id = id,
            json = script_json(self),
            chart_type = self.chart_type.as_str(),
        )
    }
}
