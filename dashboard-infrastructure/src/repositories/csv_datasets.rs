use std::io::Read;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use tokio::fs;
use tracing::{debug, info};

use dashboard_domain::{DatasetRepository, Table};

use crate::config::validation::{is_dataset_file, validate_dataset_name};

/// CSV (optionally gzip-compressed) files in one data directory.
pub struct CsvDatasetRepository {
    data_dir: PathBuf,
    /// When non-empty, only these names are listed.
    datasets: Vec<String>,
}

impl CsvDatasetRepository {
    pub fn new(data_dir: impl Into<PathBuf>, datasets: Vec<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            datasets,
        }
    }
}

#[async_trait]
impl DatasetRepository for CsvDatasetRepository {
    async fn list_datasets(&self) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(&self.data_dir)
            .await
            .with_context(|| format!("reading data dir {}", self.data_dir.display()))?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !is_dataset_file(&name) {
                continue;
            }
            if self.datasets.is_empty() || self.datasets.contains(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    async fn load_table(&self, name: &str) -> Result<Table> {
        validate_dataset_name(name)?;
        let path = self.data_dir.join(name);
        let bytes = fs::read(&path)
            .await
            .with_context(|| format!("reading dataset {}", path.display()))?;
        let bytes = maybe_gunzip(name, bytes)?;
        let table = parse_csv(bytes).with_context(|| format!("parsing dataset {}", name))?;
        info!(
            dataset = name,
            rows = table.height(),
            columns = table.width(),
            "dataset loaded"
        );
        Ok(table)
    }

    async fn ping(&self) -> Result<()> {
        let metadata = fs::metadata(&self.data_dir)
            .await
            .with_context(|| format!("data dir {} unavailable", self.data_dir.display()))?;
        if !metadata.is_dir() {
            return Err(anyhow!("{} is not a directory", self.data_dir.display()));
        }
        Ok(())
    }
}

fn maybe_gunzip(name: &str, bytes: Vec<u8>) -> Result<Vec<u8>> {
    if !name.ends_with(".gz") {
        return Ok(bytes);
    }
    let mut decoder = GzDecoder::new(bytes.as_slice());
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    debug!(dataset = name, compressed = bytes.len(), inflated = out.len(), "gunzipped");
    Ok(out)
}

/// Header row plus records; column types are inferred per column.
pub fn parse_csv(bytes: Vec<u8>) -> Result<Table> {
    Ok(Table::from_csv(bytes)?)
}
