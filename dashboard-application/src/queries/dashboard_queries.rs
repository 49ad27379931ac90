use tracing::{info, warn};

use dashboard_domain::{
    filter_by_date, timestamp_bounds, Dashboard, DashboardParams, PanelBody, PreviewTable,
};

use crate::panels::{render_panel, TIMESTAMP_COLUMN};
use crate::queries::dataset_queries::{load_prepared, PreparedDataset};
use crate::{AppError, AppState};

pub const DASHBOARD_TITLE: &str = "Network Analysis Dashboard";

pub async fn build_dashboard(
    state: &AppState,
    params: DashboardParams,
) -> Result<Dashboard, AppError> {
    let result = build(state, params).await;
    match &result {
        Ok(dashboard) => {
            let failed = dashboard.panels.iter().filter(|p| p.is_failed()).count();
            let flagged: usize = dashboard
                .panels
                .iter()
                .map(|p| match &p.body {
                    PanelBody::Anomalies(report) => report.flagged.len(),
                    _ => 0,
                })
                .sum();
            state.metrics.record_page(dashboard.panels.len(), failed);
            state.metrics.record_anomalies(flagged);
            info!(
                file = %dashboard.file,
                rows = dashboard.total_rows,
                panels = dashboard.panels.len(),
                failed,
                "dashboard built"
            );
        }
        Err(err) => {
            state.metrics.record_page_error();
            warn!("dashboard build failed: {}", err);
        }
    }
    result
}

pub async fn render_dashboard_html(
    state: &AppState,
    params: DashboardParams,
) -> Result<String, AppError> {
    let dashboard = build_dashboard(state, params).await?;
    Ok(state.renderer.render_html(&dashboard))
}

async fn build(state: &AppState, params: DashboardParams) -> Result<Dashboard, AppError> {
    let (datasets, prepared) = load_prepared(state, params.file.as_deref()).await?;
    let preview_rows = state.config.preview_rows;
    tokio::task::spawn_blocking(move || compute_page(datasets, prepared, params, preview_rows))
        .await
        .map_err(|err| AppError::Internal(err.into()))?
}

fn compute_page(
    datasets: Vec<String>,
    prepared: PreparedDataset,
    params: DashboardParams,
    preview_rows: usize,
) -> Result<Dashboard, AppError> {
    let PreparedDataset {
        file,
        layout,
        table,
        compression,
        notices,
    } = prepared;

    let bounds = timestamp_bounds(&table, TIMESTAMP_COLUMN)?;
    let start = params.start.or(bounds.as_ref().map(|b| b.min));
    let end = params.end.or(bounds.as_ref().map(|b| b.max));
    let filtered = match (start, end) {
        (Some(start), Some(end)) => filter_by_date(&table, TIMESTAMP_COLUMN, start, end)?,
        // Without any parseable timestamp nothing can fall in range.
        _ => table.head(0),
    };

    let head = filtered.head(preview_rows);
    let sample = PreviewTable {
        columns: head.column_names(),
        rows: head.display_rows()?,
    };

    let interval = params.interval.unwrap_or_else(|| layout.default_interval());
    let panels = layout
        .panels
        .iter()
        .map(|spec| render_panel(&filtered, spec, interval))
        .collect();

    Ok(Dashboard {
        title: DASHBOARD_TITLE.to_string(),
        file,
        datasets,
        bounds,
        start,
        end,
        interval,
        intervals: layout.intervals.clone(),
        total_rows: filtered.height(),
        sample,
        compression,
        notices,
        panels,
    })
}
