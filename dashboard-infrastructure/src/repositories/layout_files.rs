use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;

use dashboard_domain::{Layout, LayoutRepository};

use crate::config::validation::validate_dataset_name;

/// Extra dashboard layouts from a YAML list.
pub struct LayoutFileRepository;

impl LayoutFileRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LayoutFileRepository {
    fn default() -> Self {
        Self::new()
    }
}

pub fn parse_layouts(content: &str) -> Result<Vec<Layout>> {
    let layouts: Vec<Layout> = serde_yaml::from_str(content)?;
    for layout in &layouts {
        validate_dataset_name(&layout.file)?;
    }
    Ok(layouts)
}

#[async_trait]
impl LayoutRepository for LayoutFileRepository {
    async fn load_layouts(&self, path: &str) -> Result<Vec<Layout>> {
        if !Path::new(path).exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path).await?;
        parse_layouts(&content).with_context(|| format!("invalid layouts file {}", path))
    }
}
