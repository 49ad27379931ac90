use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use dashboard_domain::RuntimeConfig;

use crate::config::validation::validate_dataset_name;

pub const CONFIG_ENV: &str = "HONEYDASH_CONFIG";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub data_dir: String,
    pub datasets: Vec<String>,
    pub layouts_path: Option<String>,
    pub category_mapping_file: String,
    pub category_join_key: String,
    pub compress_on_load: bool,
    pub preview_rows: usize,
    pub default_top_n: usize,
    pub anomaly_column: String,
    pub request_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            bind_addr: runtime.bind_addr,
            data_dir: runtime.data_dir,
            datasets: vec![
                "dionaea_ews_log.csv".to_string(),
                "dionaea_log_compress.csv".to_string(),
                "honeypot_log_2023_04_27.csv".to_string(),
            ],
            layouts_path: None,
            category_mapping_file: runtime.category_mapping_file,
            category_join_key: runtime.category_join_key,
            compress_on_load: runtime.compress_on_load,
            preview_rows: runtime.preview_rows,
            default_top_n: runtime.default_top_n,
            anomaly_column: runtime.anomaly_column,
            request_timeout_seconds: runtime.request_timeout_seconds,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var(CONFIG_ENV).unwrap_or_else(|_| "./config.toml".to_string());
        Self::load_from(&path).await
    }

    pub async fn load_from(path: &str) -> Result<Self> {
        let file_path = Path::new(path);
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            Self::parse(&content)?
        } else {
            warn!("{} not found, using defaults", path);
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| anyhow!("invalid config: {}", err))
    }

    pub fn normalize(&mut self) {
        if let Some(path) = &self.layouts_path {
            if path.trim().is_empty() {
                self.layouts_path = None;
            }
        }
        let mut datasets: Vec<String> = std::mem::take(&mut self.datasets)
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        datasets.sort();
        datasets.dedup();
        self.datasets = datasets;
        self.category_mapping_file = self.category_mapping_file.trim().to_string();
        self.category_join_key = self.category_join_key.trim().to_string();
        self.anomaly_column = self.anomaly_column.trim().to_string();
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.data_dir = resolve_path(base, &self.data_dir);
        if let Some(path) = &self.layouts_path {
            self.layouts_path = Some(resolve_path(base, path));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.data_dir.trim().is_empty() {
            return Err(anyhow!("data_dir must not be empty"));
        }
        for name in &self.datasets {
            validate_dataset_name(name)?;
        }
        validate_dataset_name(&self.category_mapping_file)?;
        if self.category_join_key.is_empty() {
            return Err(anyhow!("category_join_key must not be empty"));
        }
        if self.anomaly_column.is_empty() {
            return Err(anyhow!("anomaly_column must not be empty"));
        }
        if self.default_top_n == 0 {
            return Err(anyhow!("default_top_n must be greater than 0"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            data_dir: self.data_dir.clone(),
            datasets: self.datasets.clone(),
            layouts_path: self.layouts_path.clone(),
            category_mapping_file: self.category_mapping_file.clone(),
            category_join_key: self.category_join_key.clone(),
            compress_on_load: self.compress_on_load,
            preview_rows: self.preview_rows,
            default_top_n: self.default_top_n,
            anomaly_column: self.anomaly_column.clone(),
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("HONEYDASH_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("HONEYDASH_DATA_DIR") {
            self.data_dir = value;
        }
        if let Ok(value) = env::var("HONEYDASH_DATASETS") {
            self.datasets = parse_env_list(&value);
        }
        if let Ok(value) = env::var("HONEYDASH_LAYOUTS_PATH") {
            self.layouts_path = Some(value);
        }
        if let Ok(value) = env::var("HONEYDASH_CATEGORY_MAPPING_FILE") {
            self.category_mapping_file = value;
        }
        if let Ok(value) = env::var("HONEYDASH_CATEGORY_JOIN_KEY") {
            self.category_join_key = value;
        }
        if let Ok(value) = env::var("HONEYDASH_COMPRESS_ON_LOAD") {
            self.compress_on_load = value.parse().unwrap_or(self.compress_on_load);
        }
        if let Ok(value) = env::var("HONEYDASH_PREVIEW_ROWS") {
            self.preview_rows = value.parse().unwrap_or(self.preview_rows);
        }
        if let Ok(value) = env::var("HONEYDASH_DEFAULT_TOP_N") {
            self.default_top_n = value.parse().unwrap_or(self.default_top_n);
        }
        if let Ok(value) = env::var("HONEYDASH_ANOMALY_COLUMN") {
            self.anomaly_column = value;
        }
        if let Ok(value) = env::var("HONEYDASH_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

fn parse_env_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}
