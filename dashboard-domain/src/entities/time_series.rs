// Time series entity
// Contiguous fixed-width buckets with per-bucket counts

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::value_objects::BucketWidth;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeBucket {
    pub start: NaiveDateTime,
    /// Closing Sunday for weekly buckets, the start otherwise.
    pub label: NaiveDateTime,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub width: BucketWidth,
    pub buckets: Vec<TimeBucket>,
    /// Rows left out because their timestamp did not parse.
    pub skipped: usize,
}

impl TimeSeries {
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedCounts {
    pub name: String,
    pub counts: Vec<u64>,
}

/// Several series sharing one bucket axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitSeries {
    pub width: BucketWidth,
    pub starts: Vec<NaiveDateTime>,
    pub labels: Vec<NaiveDateTime>,
    pub series: Vec<NamedCounts>,
    pub skipped: usize,
}
