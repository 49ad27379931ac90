// Dashboard entity
// The fully computed page handed to renderers and JSON views

use chrono::NaiveDate;
use serde::Serialize;

use crate::entities::anomaly::AnomalyReport;
use crate::entities::chart::Chart;
use crate::services::compressor::CompressionReport;
use crate::value_objects::BucketWidth;

/// Explicit selection for one page render, replacing any global widget state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardParams {
    pub file: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub interval: Option<BucketWidth>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct PreviewTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelBody {
    Chart(Chart),
    Anomalies(AnomalyReport),
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub heading: String,
    pub body: PanelBody,
}

impl Panel {
    pub fn is_failed(&self) -> bool {
        matches!(self.body, PanelBody::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub file: String,
    pub datasets: Vec<String>,
    pub bounds: Option<DateBounds>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub interval: BucketWidth,
    pub intervals: Vec<BucketWidth>,
    pub total_rows: usize,
    pub sample: PreviewTable,
    pub compression: Option<CompressionReport>,
    /// Non-fatal problems, e.g. a side mapping that failed to join.
    pub notices: Vec<String>,
    pub panels: Vec<Panel>,
}
