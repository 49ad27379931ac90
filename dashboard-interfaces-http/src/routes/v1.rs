use axum::routing::get;
use axum::Router;

use dashboard_application::AppState;

use crate::handlers::{dashboard_handlers, ops_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard_handlers::dashboard_page))
        .route("/v1/datasets", get(dashboard_handlers::list_datasets))
        .route("/v1/dashboard", get(dashboard_handlers::dashboard_json))
        .route("/v1/anomalies", get(dashboard_handlers::list_anomalies))
        .route("/v1/ops/health/live", get(ops_handlers::health_live))
        .route("/v1/ops/health/ready", get(ops_handlers::health_ready))
        .route(
            "/v1/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
