use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataError {
    #[error("missing column '{0}'")]
    MissingColumn(String),
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("column '{column}' is not numeric, cannot apply '{op}'")]
    NonNumeric { column: String, op: String },
    #[error("unsupported chart type '{0}', expected bar, line or pie")]
    UnsupportedChartType(String),
    #[error("unsupported interval '{0}'")]
    UnsupportedInterval(String),
    #[error("unsupported aggregation '{0}'")]
    UnsupportedAggregation(String),
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("malformed csv: {0}")]
    Csv(String),
    #[error("grouping needs at least one column")]
    EmptyGrouping,
    #[error("dataframe error: {0}")]
    Frame(String),
}

impl From<PolarsError> for DataError {
    fn from(err: PolarsError) -> Self {
        DataError::Frame(err.to_string())
    }
}
