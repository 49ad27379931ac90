// In-memory fixtures for application tests

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use dashboard_domain::ports::{DashboardRenderer, DatasetRepository, HealthCheckService};
use dashboard_domain::{Dashboard, RuntimeConfig, Table};

use crate::{AppState, LayoutCatalog, Metrics};

pub fn table_from_csv(text: &str) -> Table {
    Table::from_csv(text.as_bytes().to_vec()).expect("fixture table")
}

#[derive(Default)]
pub struct InMemoryDatasets {
    files: BTreeMap<String, String>,
}

impl InMemoryDatasets {
    pub fn with_file(mut self, name: &str, csv: &str) -> Self {
        self.files.insert(name.to_string(), csv.to_string());
        self
    }
}

#[async_trait]
impl DatasetRepository for InMemoryDatasets {
    async fn list_datasets(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.files.keys().cloned().collect())
    }

    async fn load_table(&self, name: &str) -> anyhow::Result<Table> {
        let csv = self
            .files
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("dataset {} not found", name))?;
        Ok(table_from_csv(csv))
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub struct TitleRenderer;

impl DashboardRenderer for TitleRenderer {
    fn render_html(&self, dashboard: &Dashboard) -> String {
        format!("<h1>{}</h1>", dashboard.file)
    }
}

pub struct AlwaysHealthy;

#[async_trait]
impl HealthCheckService for AlwaysHealthy {
    async fn check_data_dir(&self) -> anyhow::Result<bool> {
        Ok(true)
    }
}

pub fn state_with(datasets: InMemoryDatasets) -> AppState {
    let config = RuntimeConfig::default();
    AppState {
        layouts: Arc::new(LayoutCatalog::builtin(
            &config.category_mapping_file,
            &config.category_join_key,
        )),
        config,
        dataset_repo: Arc::new(datasets),
        renderer: Arc::new(TitleRenderer),
        health: Arc::new(AlwaysHealthy),
        metrics: Arc::new(Metrics::default()),
    }
}
