use tracing::info;

use dashboard_domain::{count_and_flag, filter_by_date, parse_date, AnomalyQuery, AnomalyReport};

use crate::panels::TIMESTAMP_COLUMN;
use crate::queries::dataset_queries::load_prepared;
use crate::{AppError, AppState};

/// Flags keys of `query.column` (default from config) whose row count is an
/// outlier, optionally within a date range.
pub async fn find_anomalies(
    state: &AppState,
    query: AnomalyQuery,
) -> Result<AnomalyReport, AppError> {
    let column = query
        .column
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| state.config.anomaly_column.clone());
    let start = query.start.as_deref().map(parse_date).transpose()?;
    let end = query.end.as_deref().map(parse_date).transpose()?;

    let (_, prepared) = load_prepared(state, query.file.as_deref()).await?;
    let table = match (start, end) {
        (None, None) => prepared.table,
        (start, end) => {
            let start = start.unwrap_or(chrono::NaiveDate::MIN);
            let end = end.unwrap_or(chrono::NaiveDate::MAX);
            filter_by_date(&prepared.table, TIMESTAMP_COLUMN, start, end)?
        }
    };

    let report = count_and_flag(&table, &column)?;
    state.metrics.record_anomalies(report.flagged.len());
    info!(
        file = %prepared.file,
        column = %column,
        flagged = report.flagged.len(),
        "anomaly scan finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{state_with, InMemoryDatasets};

    fn ews_log() -> String {
        let mut csv = String::from("timestamp,src_ip,src_port,dest_port\n");
        for i in 0..9 {
            csv.push_str(&format!("2023-04-27 10:0{}:00,10.0.0.{},5000{},445\n", i, i, i));
        }
        for i in 0..40 {
            csv.push_str(&format!("2023-04-28 11:{:02}:00,6.6.6.6,6000{},22\n", i, i % 10));
        }
        csv
    }

    #[tokio::test]
    async fn flags_noisy_source() {
        let state = state_with(InMemoryDatasets::default().with_file("dionaea_ews_log.csv", &ews_log()));
        let report = find_anomalies(&state, AnomalyQuery::default())
            .await
            .expect("report");
        assert_eq!(report.key_column, "src_ip");
        assert_eq!(report.keys_considered, 10);
        assert!(report.is_flagged("6.6.6.6"));
        assert_eq!(report.flagged.len(), 1);
    }

    #[tokio::test]
    async fn date_range_limits_the_scan() {
        let state = state_with(InMemoryDatasets::default().with_file("dionaea_ews_log.csv", &ews_log()));
        let query = AnomalyQuery {
            end: Some("2023-04-27".to_string()),
            ..Default::default()
        };
        let report = find_anomalies(&state, query).await.expect("report");
        assert_eq!(report.keys_considered, 9);
        assert!(report.flagged.is_empty());
    }

    #[tokio::test]
    async fn unknown_column_is_bad_request() {
        let state = state_with(InMemoryDatasets::default().with_file("dionaea_ews_log.csv", &ews_log()));
        let query = AnomalyQuery {
            column: Some("attacker".to_string()),
            ..Default::default()
        };
        let err = find_anomalies(&state, query).await.expect_err("missing column");
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
