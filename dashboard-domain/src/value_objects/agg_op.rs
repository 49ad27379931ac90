// Aggregation operation value object

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum AggOp {
    /// Non-null values in the column.
    Count,
    /// Rows in the group, nulls included.
    Size,
    Sum,
    Mean,
    Min,
    Max,
    /// Distinct non-null values.
    Nunique,
}

impl AggOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggOp::Count => "count",
            AggOp::Size => "size",
            AggOp::Sum => "sum",
            AggOp::Mean => "mean",
            AggOp::Min => "min",
            AggOp::Max => "max",
            AggOp::Nunique => "nunique",
        }
    }

    pub fn needs_numeric(&self) -> bool {
        matches!(self, AggOp::Sum | AggOp::Mean | AggOp::Min | AggOp::Max)
    }
}

impl FromStr for AggOp {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "count" => Ok(AggOp::Count),
            "size" => Ok(AggOp::Size),
            "sum" => Ok(AggOp::Sum),
            "mean" => Ok(AggOp::Mean),
            "min" => Ok(AggOp::Min),
            "max" => Ok(AggOp::Max),
            "nunique" => Ok(AggOp::Nunique),
            _ => Err(DataError::UnsupportedAggregation(s.to_string())),
        }
    }
}

impl TryFrom<String> for AggOp {
    type Error = DataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for AggOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
