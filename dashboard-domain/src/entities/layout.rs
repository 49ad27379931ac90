// Layout entity
// Declarative description of which panels a dataset page shows

use serde::{Deserialize, Serialize};

use crate::entities::aggregate::Aggregation;
use crate::value_objects::{BucketWidth, ChartKind};

pub const DEFAULT_TOP_N: usize = 10;

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

/// Everything the aggregation-plot builder needs for one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotRequest {
    pub group_by: Vec<String>,
    pub aggregations: Vec<Aggregation>,
    pub x: String,
    pub rename: String,
    pub target: String,
    pub sort_by: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub chart: ChartKind,
}

impl PlotRequest {
    /// The common shape: count rows per value of `column`, ranked.
    pub fn count_by(
        column: &str,
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self {
            group_by: vec![column.to_string()],
            aggregations: vec![Aggregation::count(column)],
            x: column.to_string(),
            rename: column.to_string(),
            target: "count".to_string(),
            sort_by: "count".to_string(),
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            top_n: DEFAULT_TOP_N,
            chart: ChartKind::Bar,
        }
    }

    pub fn chart(mut self, chart: ChartKind) -> Self {
        self.chart = chart;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowFilter {
    pub column: String,
    pub equals: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSplit {
    pub column: String,
    /// Fixed, ordered series. Empty means every observed category.
    #[serde(default)]
    pub series: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Derivation {
    /// Re-type a column as text so numeric codes group as categories.
    AsText { column: String },
    /// Pull columns from a side file, matched on an explicit key column.
    JoinMapping {
        file: String,
        key: String,
        columns: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelSpec {
    Plot {
        heading: String,
        #[serde(default)]
        only: Option<RowFilter>,
        request: PlotRequest,
    },
    Trend {
        heading: String,
        title: String,
        #[serde(default)]
        split: Option<SeriesSplit>,
    },
    Anomalies {
        heading: String,
        key_column: String,
    },
}

impl PanelSpec {
    pub fn heading(&self) -> &str {
        match self {
            PanelSpec::Plot { heading, .. }
            | PanelSpec::Trend { heading, .. }
            | PanelSpec::Anomalies { heading, .. } => heading,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub file: String,
    #[serde(default)]
    pub derive: Vec<Derivation>,
    #[serde(default = "default_intervals")]
    pub intervals: Vec<BucketWidth>,
    pub panels: Vec<PanelSpec>,
}

fn default_intervals() -> Vec<BucketWidth> {
    BucketWidth::ALL.to_vec()
}

impl Layout {
    pub fn default_interval(&self) -> BucketWidth {
        self.intervals
            .first()
            .copied()
            .unwrap_or(BucketWidth::OneHour)
    }
}
