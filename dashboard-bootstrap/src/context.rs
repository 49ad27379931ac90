use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use dashboard_application::{AppState, LayoutCatalog, Metrics};
use dashboard_domain::LayoutRepository;
use dashboard_infrastructure::{
    AppConfig, CsvDatasetRepository, DataDirHealthService, HtmlDashboardRenderer,
    LayoutFileRepository,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        Self::from_config(config).await
    }

    pub async fn from_config(config: AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();

        let dataset_repo = Arc::new(CsvDatasetRepository::new(
            &runtime_config.data_dir,
            runtime_config.datasets.clone(),
        ));

        let overrides = match &runtime_config.layouts_path {
            Some(path) => LayoutFileRepository::new()
                .load_layouts(path)
                .await
                .with_context(|| format!("loading layouts from {}", path))?,
            None => Vec::new(),
        };
        let layouts = LayoutCatalog::builtin(
            &runtime_config.category_mapping_file,
            &runtime_config.category_join_key,
        )
        .with_default_top_n(runtime_config.default_top_n)
        .with_overrides(overrides);
        info!(
            data_dir = %runtime_config.data_dir,
            layouts = layouts.files().len(),
            "context ready"
        );

        let state = AppState {
            config: runtime_config,
            dataset_repo: dataset_repo.clone(),
            renderer: Arc::new(HtmlDashboardRenderer::new()),
            health: Arc::new(DataDirHealthService::new(dataset_repo)),
            layouts: Arc::new(layouts),
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_domain::HealthCheckService;

    #[tokio::test]
    async fn builds_state_with_layout_overrides() {
        let dir = std::env::temp_dir().join(format!("honeydash-context-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("dir");
        let layouts_path = dir.join("layouts.yaml");
        std::fs::write(
            &layouts_path,
            "- file: cowrie_log.csv\n  panels:\n    - kind: anomalies\n      heading: Noisy\n      key_column: src_ip\n",
        )
        .expect("layouts");

        let config = AppConfig {
            data_dir: dir.to_string_lossy().to_string(),
            layouts_path: Some(layouts_path.to_string_lossy().to_string()),
            default_top_n: 7,
            ..Default::default()
        };
        let context = AppContext::from_config(config).await.expect("context");
        let state = context.state;

        assert!(state.layouts.get("cowrie_log.csv").is_some());
        assert!(state.layouts.get("honeypot_log_2023_04_27.csv").is_some());
        assert!(state.health.check_data_dir().await.expect("health"));
        assert_eq!(state.config.default_top_n, 7);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn broken_layouts_file_is_an_error() {
        let dir = std::env::temp_dir().join(format!("honeydash-badlayout-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("dir");
        let layouts_path = dir.join("layouts.yaml");
        std::fs::write(&layouts_path, "- file: ../escape.csv\n  panels: []\n").expect("layouts");

        let config = AppConfig {
            data_dir: dir.to_string_lossy().to_string(),
            layouts_path: Some(layouts_path.to_string_lossy().to_string()),
            ..Default::default()
        };
        assert!(AppContext::from_config(config).await.is_err());
        std::fs::remove_dir_all(&dir).ok();
    }
}
