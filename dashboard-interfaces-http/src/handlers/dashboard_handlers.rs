use axum::extract::{Query, State};
use axum::response::Html;
use axum::Json;

use dashboard_application::queries::{anomaly_queries, dashboard_queries, dataset_queries};
use dashboard_application::AppState;
use dashboard_domain::{AnomalyQuery, AnomalyReport, Dashboard, DashboardParams, DashboardQuery};

use crate::error::HttpError;

pub async fn dashboard_page(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, HttpError> {
    let params = DashboardParams::try_from(query)?;
    let html = dashboard_queries::render_dashboard_html(&state, params).await?;
    Ok(Html(html))
}

pub async fn dashboard_json(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Dashboard>, HttpError> {
    let params = DashboardParams::try_from(query)?;
    let dashboard = dashboard_queries::build_dashboard(&state, params).await?;
    Ok(Json(dashboard))
}

pub async fn list_datasets(State(state): State<AppState>) -> Result<Json<Vec<String>>, HttpError> {
    let datasets = dataset_queries::list_datasets(&state).await?;
    Ok(Json(datasets))
}

pub async fn list_anomalies(
    State(state): State<AppState>,
    Query(query): Query<AnomalyQuery>,
) -> Result<Json<AnomalyReport>, HttpError> {
    let report = anomaly_queries::find_anomalies(&state, query).await?;
    Ok(Json(report))
}
