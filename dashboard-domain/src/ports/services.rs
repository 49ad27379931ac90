use async_trait::async_trait;

use crate::entities::Dashboard;

pub trait DashboardRenderer: Send + Sync {
    fn render_html(&self, dashboard: &Dashboard) -> String;
}

#[async_trait]
pub trait HealthCheckService: Send + Sync {
    async fn check_data_dir(&self) -> anyhow::Result<bool>;
}
