use std::sync::Arc;

use async_trait::async_trait;
use dashboard_domain::ports::HealthCheckService;
use dashboard_domain::DatasetRepository;

pub struct DataDirHealthService {
    dataset_repo: Arc<dyn DatasetRepository>,
}

impl DataDirHealthService {
    pub fn new(dataset_repo: Arc<dyn DatasetRepository>) -> Self {
        Self { dataset_repo }
    }
}

#[async_trait]
impl HealthCheckService for DataDirHealthService {
    async fn check_data_dir(&self) -> anyhow::Result<bool> {
        self.dataset_repo.ping().await.map(|_| true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::CsvDatasetRepository;

    #[tokio::test]
    async fn reports_missing_data_dir() {
        let missing = CsvDatasetRepository::new("/nonexistent/honeydash/data", Vec::new());
        let health = DataDirHealthService::new(Arc::new(missing));
        assert!(health.check_data_dir().await.is_err());

        let present = CsvDatasetRepository::new(std::env::temp_dir(), Vec::new());
        let health = DataDirHealthService::new(Arc::new(present));
        assert!(health.check_data_dir().await.expect("ping"));
    }
}
