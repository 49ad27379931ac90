// Panel computation
// Turns one PanelSpec into a chart, an anomaly table or a failure card

use tracing::warn;

use dashboard_domain::{
    build_plot, count_and_flag, format_timestamp, resample_counts, resample_counts_by, BucketWidth,
    Chart, ChartKind, ChartSeries, DataError, Panel, PanelBody, PanelSpec, Table,
};

pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Computes a panel; errors stay inside the panel so the page still renders.
pub fn render_panel(table: &Table, spec: &PanelSpec, interval: BucketWidth) -> Panel {
    let body = compute_panel(table, spec, interval).unwrap_or_else(|err| {
        warn!(panel = %spec.heading(), error = %err, "panel failed");
        PanelBody::Failed {
            message: err.to_string(),
        }
    });
    Panel {
        heading: spec.heading().to_string(),
        body,
    }
}

pub fn compute_panel(
    table: &Table,
    spec: &PanelSpec,
    interval: BucketWidth,
) -> Result<PanelBody, DataError> {
    match spec {
        PanelSpec::Plot { only, request, .. } => {
            let output = match only {
                Some(filter) => build_plot(&table.filter_eq(&filter.column, &filter.equals)?, request)?,
                None => build_plot(table, request)?,
            };
            Ok(PanelBody::Chart(output.chart))
        }
        PanelSpec::Trend { title, split, .. } => {
            let chart = Chart::new(
                ChartKind::Line,
                format!("{} ({} interval)", title, interval.label()),
                "Time",
                "Count",
            );
            let chart = match split {
                Some(split) => {
                    let series = resample_counts_by(
                        table,
                        TIMESTAMP_COLUMN,
                        interval,
                        &split.column,
                        &split.series,
                    )?;
                    chart.with_series(
                        series.labels.iter().map(format_timestamp).collect(),
                        series
                            .series
                            .into_iter()
                            .map(|named| ChartSeries {
                                name: named.name,
                                values: named.counts.into_iter().map(|c| c as f64).collect(),
                            })
                            .collect(),
                    )
                }
                None => {
                    let series = resample_counts(table, TIMESTAMP_COLUMN, interval)?;
                    chart.with_points(
                        "count",
                        series
                            .buckets
                            .iter()
                            .map(|b| (format_timestamp(&b.label), b.count as f64))
                            .collect(),
                    )
                }
            };
            Ok(PanelBody::Chart(chart))
        }
        PanelSpec::Anomalies { key_column, .. } => {
            Ok(PanelBody::Anomalies(count_and_flag(table, key_column)?))
        }
    }
}
