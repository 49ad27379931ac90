pub mod anomaly_queries;
pub mod dashboard_queries;
pub mod dataset_queries;
