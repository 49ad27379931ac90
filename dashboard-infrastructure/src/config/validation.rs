use anyhow::{anyhow, Result};

pub const DATASET_EXTENSIONS: [&str; 2] = [".csv", ".csv.gz"];

/// A dataset is addressed by bare file name inside the data directory.
pub fn validate_dataset_name(value: &str) -> Result<()> {
    let name = value.trim();
    if name.is_empty() {
        return Err(anyhow!("dataset name is empty"));
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(anyhow!("dataset name must not contain path components: {}", name));
    }
    if !is_dataset_file(name) {
        return Err(anyhow!("dataset must be a .csv or .csv.gz file: {}", name));
    }
    Ok(())
}

pub fn is_dataset_file(name: &str) -> bool {
    DATASET_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}
