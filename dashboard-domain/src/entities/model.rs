use serde::Deserialize;

use crate::entities::dashboard::DashboardParams;
use crate::error::DataError;
use crate::utils::parse_date;

/// Raw page selection as it arrives from a query string or the CLI.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct DashboardQuery {
    pub file: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub interval: Option<String>,
}

impl TryFrom<DashboardQuery> for DashboardParams {
    type Error = DataError;

    fn try_from(query: DashboardQuery) -> Result<Self, Self::Error> {
        Ok(DashboardParams {
            file: non_empty(query.file),
            start: non_empty(query.start).as_deref().map(parse_date).transpose()?,
            end: non_empty(query.end).as_deref().map(parse_date).transpose()?,
            interval: non_empty(query.interval)
                .map(|value| value.parse())
                .transpose()?,
        })
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct AnomalyQuery {
    pub file: Option<String>,
    pub column: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
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

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8501".to_string(),
            data_dir: "./data".to_string(),
            datasets: Vec::new(),
            layouts_path: None,
            category_mapping_file: "dionaea_log_category.csv".to_string(),
            category_join_key: "id".to_string(),
            compress_on_load: true,
            preview_rows: 5,
            default_top_n: 10,
            anomaly_column: "src_ip".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::BucketWidth;

    #[test]
    fn query_parses_into_params() {
        let query = DashboardQuery {
            file: Some("honeypot_log_2023_04_27.csv".to_string()),
            start: Some("2023-04-27".to_string()),
            end: Some(" ".to_string()),
            interval: Some("15 minutes".to_string()),
        };
        let params = DashboardParams::try_from(query).expect("params");
        assert_eq!(params.file.as_deref(), Some("honeypot_log_2023_04_27.csv"));
        assert!(params.start.is_some());
        assert!(params.end.is_none());
        assert_eq!(params.interval, Some(BucketWidth::FifteenMinutes));
    }

    #[test]
    fn query_rejects_bad_interval() {
        let query = DashboardQuery {
            interval: Some("fortnight".to_string()),
            ..Default::default()
        };
        let err = DashboardParams::try_from(query).expect_err("reject");
        assert!(matches!(err, DataError::UnsupportedInterval(_)));
    }
}
