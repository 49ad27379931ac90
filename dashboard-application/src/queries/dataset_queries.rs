use tracing::{debug, error, warn};

use dashboard_domain::{
    compress, left_join, CompressionReport, Derivation, JoinOutcome, Layout, Table,
};

use crate::{AppError, AppState};

/// A loaded dataset with its layout derivations applied.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub file: String,
    pub layout: Layout,
    pub table: Table,
    pub compression: Option<CompressionReport>,
    /// Derivations that could not be applied.
    pub notices: Vec<String>,
}

/// Selectable datasets. The category side mapping is not a page of its own.
pub async fn list_datasets(state: &AppState) -> Result<Vec<String>, AppError> {
    let datasets = state.dataset_repo.list_datasets().await.map_err(|err| {
        error!("failed to list datasets: {}", err);
        AppError::Internal(err)
    })?;
    Ok(datasets
        .into_iter()
        .filter(|name| *name != state.config.category_mapping_file)
        .collect())
}

pub(crate) fn resolve_file(datasets: &[String], requested: Option<&str>) -> Result<String, AppError> {
    match requested {
        Some(name) if datasets.iter().any(|d| d == name) => Ok(name.to_string()),
        Some(name) => Err(AppError::NotFound(format!("dataset {}", name))),
        None => datasets
            .first()
            .cloned()
            .ok_or_else(|| AppError::NotFound("no datasets available".to_string())),
    }
}

/// Loads `requested` (or the first dataset) and runs compression and the
/// layout's derivations on the blocking pool.
pub async fn load_prepared(
    state: &AppState,
    requested: Option<&str>,
) -> Result<(Vec<String>, PreparedDataset), AppError> {
    let datasets = list_datasets(state).await?;
    let file = resolve_file(&datasets, requested)?;
    let layout = state.layouts.resolve(&file);

    let table = state.dataset_repo.load_table(&file).await.map_err(|err| {
        error!("failed to load dataset {}: {}", file, err);
        AppError::Internal(err)
    })?;

    let mut side_tables = Vec::new();
    for derivation in &layout.derive {
        if let Derivation::JoinMapping { file: side, .. } = derivation {
            let loaded = state
                .dataset_repo
                .load_table(side)
                .await
                .map_err(|err| format!("mapping {} unavailable: {}", side, err));
            side_tables.push(loaded);
        }
    }

    let compress_on_load = state.config.compress_on_load;
    let prepared = tokio::task::spawn_blocking(move || {
        prepare(file, layout, table, side_tables, compress_on_load)
    })
    .await
    .map_err(|err| AppError::Internal(err.into()))?;
    Ok((datasets, prepared))
}

fn prepare(
    file: String,
    layout: Layout,
    table: Table,
    side_tables: Vec<Result<Table, String>>,
    compress_on_load: bool,
) -> PreparedDataset {
    let mut notices = Vec::new();
    let (mut table, compression) = if compress_on_load {
        match compress(&table) {
            Ok((compressed, report)) => {
                debug!(
                    file = %file,
                    before = report.bytes_before,
                    after = report.bytes_after,
                    "dataset compressed"
                );
                (compressed, Some(report))
            }
            Err(err) => {
                warn!(file = %file, error = %err, "compression failed, using the table as loaded");
                notices.push(format!("dataset not compressed: {}", err));
                (table, None)
            }
        }
    } else {
        (table, None)
    };

    let mut side_tables = side_tables.into_iter();
    for derivation in &layout.derive {
        match derivation {
            Derivation::AsText { column } => match table.clone().cast_to_text(column) {
                Ok(cast) => table = cast,
                Err(err) => notices.push(err.to_string()),
            },
            Derivation::JoinMapping { key, columns, .. } => {
                let mapping = match side_tables.next() {
                    Some(Ok(mapping)) => mapping,
                    Some(Err(message)) => {
                        warn!("{}", message);
                        notices.push(message);
                        continue;
                    }
                    None => continue,
                };
                match left_join(table.clone(), &mapping, key, columns) {
                    Ok((joined, JoinOutcome::Joined { matched })) => {
                        debug!(file = %file, matched, "category mapping joined");
                        table = joined;
                    }
                    Ok((_, JoinOutcome::AlreadyPresent)) => {
                        debug!(file = %file, "mapped columns already present, join skipped");
                    }
                    Err(err) => {
                        warn!(file = %file, error = %err, "category mapping join failed");
                        notices.push(format!("category mapping not joined: {}", err));
                    }
                }
            }
        }
    }

    PreparedDataset {
        file,
        layout,
        table,
        compression,
        notices,
    }
}
