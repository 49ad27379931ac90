// Anomaly flagger
// Keys whose count exceeds mean + 2 * sample stddev across all keys

use statrs::statistics::{Data, Distribution};

use crate::entities::aggregate::{AggregateTable, Aggregation};
use crate::entities::anomaly::{AnomalyReport, FlaggedKey};
use crate::entities::table::Table;
use crate::error::DataError;
use crate::services::plot_builder::aggregate;

const SIGMA: f64 = 2.0;
const COUNT_COLUMN: &str = "count";

/// Flags outliers among per-key counts.
///
/// Fewer than two keys leave the deviation undefined, so nothing is flagged.
pub fn flag_anomalies(
    counts: &AggregateTable,
    key_column: &str,
    count_column: &str,
) -> Result<AnomalyReport, DataError> {
    let pairs = counts.pairs(key_column, count_column)?;
    let mut report = AnomalyReport {
        key_column: key_column.to_string(),
        keys_considered: pairs.len(),
        ..Default::default()
    };
    if pairs.len() < 2 {
        report.mean = pairs.first().map(|(_, count)| *count);
        return Ok(report);
    }

    let data = Data::new(pairs.iter().map(|(_, count)| *count).collect::<Vec<f64>>());
    let (Some(mean), Some(stddev)) = (data.mean(), data.std_dev()) else {
        return Ok(report);
    };
    let threshold = mean + SIGMA * stddev;

    let mut flagged: Vec<FlaggedKey> = pairs
        .into_iter()
        .filter(|(_, count)| *count > threshold)
        .map(|(key, count)| FlaggedKey { key, count })
        .collect();
    flagged.sort_by(|a, b| b.count.total_cmp(&a.count));

    report.mean = Some(mean);
    report.stddev = Some(stddev);
    report.threshold = Some(threshold);
    report.flagged = flagged;
    Ok(report)
}

/// Counts rows per value of `key_column` and flags the outliers.
pub fn count_and_flag(table: &Table, key_column: &str) -> Result<AnomalyReport, DataError> {
    let key = key_column.to_string();
    let mut counts = aggregate(table, std::slice::from_ref(&key), &[Aggregation::count(key_column)])?;
    counts.rename_value(key_column, COUNT_COLUMN);
    flag_anomalies(&counts, key_column, COUNT_COLUMN)
}
