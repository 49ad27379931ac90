// Chart entity
// A renderer-independent description of one bar, line or pie chart

use serde::Serialize;

use crate::value_objects::ChartKind;

/// Pie charts are drawn on a fixed canvas.
pub const PIE_CANVAS: (u32, u32) = (800, 600);
pub const DEFAULT_CANVAS: (u32, u32) = (900, 480);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Bar categories, pie slice names or line x positions.
    pub categories: Vec<String>,
    /// One series for bar and pie, one or more for line.
    pub series: Vec<ChartSeries>,
    pub width: u32,
    pub height: u32,
}

impl Chart {
    pub fn new(
        kind: ChartKind,
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        let (width, height) = match kind {
            ChartKind::Pie => PIE_CANVAS,
            _ => DEFAULT_CANVAS,
        };
        Self {
            kind,
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            categories: Vec::new(),
            series: Vec::new(),
            width,
            height,
        }
    }

    /// Single-series chart from (category, value) pairs.
    ///
    /// Bar and pie charts merge repeated categories by summing them, the way a
    /// category axis stacks bars and a pie folds equal slice names. Line
    /// charts keep every point.
    pub fn with_points(mut self, series_name: impl Into<String>, points: Vec<(String, f64)>) -> Self {
        let mut categories: Vec<String> = Vec::with_capacity(points.len());
        let mut values: Vec<f64> = Vec::with_capacity(points.len());
        for (category, value) in points {
            if self.kind != ChartKind::Line {
                if let Some(idx) = categories.iter().position(|c| *c == category) {
                    values[idx] += value;
                    continue;
                }
            }
            categories.push(category);
            values.push(value);
        }
        self.categories = categories;
        self.series = vec![ChartSeries {
            name: series_name.into(),
            values,
        }];
        self
    }

    pub fn with_series(mut self, categories: Vec<String>, series: Vec<ChartSeries>) -> Self {
        self.categories = categories;
        self.series = series;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .fold(0.0, f64::max)
    }

    pub fn total(&self) -> f64 {
        self.series.first().map(|s| s.values.iter().sum()).unwrap_or(0.0)
    }
}
