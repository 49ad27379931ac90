use std::sync::Arc;

use dashboard_domain::ports::{DashboardRenderer, DatasetRepository, HealthCheckService};
use dashboard_domain::RuntimeConfig;

use crate::layouts::LayoutCatalog;
use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub dataset_repo: Arc<dyn DatasetRepository>,
    pub renderer: Arc<dyn DashboardRenderer>,
    pub health: Arc<dyn HealthCheckService>,
    pub layouts: Arc<LayoutCatalog>,
    pub metrics: Arc<Metrics>,
}
