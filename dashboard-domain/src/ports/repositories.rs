use async_trait::async_trait;

use crate::entities::{Layout, Table};

#[async_trait]
pub trait DatasetRepository: Send + Sync {
    /// File names of the datasets that can be loaded, sorted.
    async fn list_datasets(&self) -> anyhow::Result<Vec<String>>;
    async fn load_table(&self, name: &str) -> anyhow::Result<Table>;
    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait LayoutRepository: Send + Sync {
    async fn load_layouts(&self, path: &str) -> anyhow::Result<Vec<Layout>>;
}
