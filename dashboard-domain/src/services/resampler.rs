// Time-series resampler
// Buckets event timestamps into contiguous fixed-width intervals, counted with polars

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};
use polars::prelude::*;

use crate::entities::table::{text_values, Table};
use crate::entities::time_series::{NamedCounts, SplitSeries, TimeBucket, TimeSeries};
use crate::error::DataError;
use crate::value_objects::BucketWidth;

const BUCKET: &str = "bucket";
const SPLIT: &str = "split";
const COUNT: &str = "count";

/// Grid anchor: midnight of the earliest day, or the Monday of its week for
/// weekly buckets.
fn bucket_origin(first: NaiveDateTime, width: BucketWidth) -> NaiveDateTime {
    let mut day = first.date();
    if width == BucketWidth::OneWeek {
        day = day - Duration::days(i64::from(day.weekday().num_days_from_monday()));
    }
    day.and_time(NaiveTime::MIN)
}

struct Axis {
    origin: NaiveDateTime,
    width: BucketWidth,
    len: usize,
}

impl Axis {
    fn spanning(stamps: &[NaiveDateTime], width: BucketWidth) -> Option<Axis> {
        let first = stamps.iter().min()?;
        let last = stamps.iter().max()?;
        let anchor = bucket_origin(*first, width);
        let skip = (*first - anchor).num_seconds().div_euclid(width.seconds());
        let mut axis = Axis {
            origin: anchor + Duration::seconds(skip * width.seconds()),
            width,
            len: 0,
        };
        axis.len = axis.index(*last) as usize + 1;
        Some(axis)
    }

    fn index(&self, ts: NaiveDateTime) -> i64 {
        (ts - self.origin).num_seconds().div_euclid(self.width.seconds())
    }

    fn indices(&self, rows: &[Option<NaiveDateTime>]) -> Vec<Option<i64>> {
        rows.iter().map(|ts| ts.map(|ts| self.index(ts))).collect()
    }

    fn starts(&self) -> Vec<NaiveDateTime> {
        (0..self.len)
            .map(|i| self.origin + Duration::seconds(i as i64 * self.width.seconds()))
            .collect()
    }

    /// Weekly buckets run Monday through Sunday and are named by that Sunday.
    fn labels(&self) -> Vec<NaiveDateTime> {
        let shift = match self.width {
            BucketWidth::OneWeek => Duration::days(6),
            _ => Duration::zero(),
        };
        self.starts().into_iter().map(|start| start + shift).collect()
    }
}

/// Row counts per (bucket, split value) as one polars group-by.
fn count_rows(
    buckets: Vec<Option<i64>>,
    split: Option<Vec<Option<String>>>,
) -> Result<Vec<(usize, Option<String>, u64)>, DataError> {
    let mut columns = vec![Series::new(BUCKET.into(), buckets).into_column()];
    let mut keys = vec![col(BUCKET)];
    let mut present = col(BUCKET).is_not_null();
    if let Some(split) = split {
        columns.push(Series::new(SPLIT.into(), split).into_column());
        keys.push(col(SPLIT));
        present = present.and(col(SPLIT).is_not_null());
    }
    let counted = DataFrame::new(columns)?
        .lazy()
        .filter(present)
        .group_by(keys)
        .agg([len().cast(DataType::Int64).alias(COUNT)])
        .collect()?;

    let buckets: Vec<Option<i64>> = counted
        .column(BUCKET)?
        .as_materialized_series()
        .i64()?
        .into_iter()
        .collect();
    let counts: Vec<Option<i64>> = counted
        .column(COUNT)?
        .as_materialized_series()
        .i64()?
        .into_iter()
        .collect();
    let names = match counted.column(SPLIT) {
        Ok(column) => text_values(column)?,
        Err(_) => vec![None; counted.height()],
    };

    Ok(buckets
        .into_iter()
        .zip(names)
        .zip(counts)
        .filter_map(|((bucket, name), count)| {
            let bucket = usize::try_from(bucket?).ok()?;
            Some((bucket, name, u64::try_from(count?).ok()?))
        })
        .collect())
}

/// Counts rows per bucket, zero-count buckets included, oldest first.
pub fn resample_counts(
    table: &Table,
    column: &str,
    width: BucketWidth,
) -> Result<TimeSeries, DataError> {
    let rows = table.timestamps(column)?;
    let stamps: Vec<NaiveDateTime> = rows.iter().flatten().copied().collect();
    let skipped = rows.len() - stamps.len();

    let Some(axis) = Axis::spanning(&stamps, width) else {
        return Ok(TimeSeries {
            width,
            buckets: Vec::new(),
            skipped,
        });
    };
    let mut counts = vec![0u64; axis.len];
    for (bucket, _, count) in count_rows(axis.indices(&rows), None)? {
        if let Some(slot) = counts.get_mut(bucket) {
            *slot += count;
        }
    }
    let buckets = axis
        .starts()
        .into_iter()
        .zip(axis.labels())
        .zip(counts)
        .map(|((start, label), count)| TimeBucket { start, label, count })
        .collect();
    Ok(TimeSeries {
        width,
        buckets,
        skipped,
    })
}

/// One aligned series per category of `split_column`.
///
/// With an empty `categories` list every observed category gets a series,
/// in ascending order. Otherwise exactly the listed series are produced and
/// categories that never occur count zero throughout.
pub fn resample_counts_by(
    table: &Table,
    column: &str,
    width: BucketWidth,
    split_column: &str,
    categories: &[String],
) -> Result<SplitSeries, DataError> {
    let rows = table.timestamps(column)?;
    let split = table.text(split_column)?;
    let stamps: Vec<NaiveDateTime> = rows.iter().flatten().copied().collect();
    let skipped = rows.len() - stamps.len();

    let names: Vec<String> = if categories.is_empty() {
        rows.iter()
            .zip(&split)
            .filter(|(ts, _)| ts.is_some())
            .filter_map(|(_, category)| category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    } else {
        categories.to_vec()
    };

    let Some(axis) = Axis::spanning(&stamps, width) else {
        return Ok(SplitSeries {
            width,
            starts: Vec::new(),
            labels: Vec::new(),
            series: names
                .into_iter()
                .map(|name| NamedCounts {
                    name,
                    counts: Vec::new(),
                })
                .collect(),
            skipped,
        });
    };

    let mut series: Vec<NamedCounts> = names
        .into_iter()
        .map(|name| NamedCounts {
            name,
            counts: vec![0; axis.len],
        })
        .collect();
    for (bucket, category, count) in count_rows(axis.indices(&rows), Some(split))? {
        let Some(named) = series.iter_mut().find(|s| category.as_deref() == Some(s.name.as_str())) else {
            continue;
        };
        if let Some(slot) = named.counts.get_mut(bucket) {
            *slot += count;
        }
    }
    Ok(SplitSeries {
        width,
        starts: axis.starts(),
        labels: axis.labels(),
        series,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::table::fixtures::text_column;
    use crate::utils::format_timestamp;

    fn table(stamps: &[Option<&str>], logins: &[&str]) -> Table {
        let logins: Vec<Option<&str>> = logins.iter().copied().map(Some).collect();
        Table::new(vec![text_column("timestamp", stamps), text_column("login", &logins)])
            .expect("table")
    }

    fn sample() -> Table {
        table(
            &[
                Some("2023-04-27 10:07:00"),
                Some("2023-04-27 10:00:00"),
                Some("2023-04-27 10:14:59"),
                None,
                Some("2023-04-27 10:31:00"),
                Some("bad"),
            ],
            &["Fail", "Success", "Fail", "Fail", "Success", "Fail"],
        )
    }

    #[test]
    fn buckets_are_contiguous_and_aligned() {
        let series = resample_counts(&sample(), "timestamp", BucketWidth::FifteenMinutes)
            .expect("series");
        let starts: Vec<String> = series.buckets.iter().map(|b| format_timestamp(&b.start)).collect();
        // Aligned to midnight: the first bucket covers 10:00..10:15.
        assert_eq!(
            starts,
            vec!["2023-04-27 10:00:00", "2023-04-27 10:15:00", "2023-04-27 10:30:00"]
        );
        let counts: Vec<u64> = series.buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![3, 0, 1]);
        assert_eq!(series.total(), 4);
        assert_eq!(series.skipped, 2);
    }

    #[test]
    fn weekly_buckets_start_on_monday() {
        // 2023-04-27 is a Thursday, 2023-05-01 a Monday.
        let data = table(
            &[Some("2023-04-27 10:00:00"), Some("2023-05-01 00:00:00")],
            &["Fail", "Fail"],
        );
        let series = resample_counts(&data, "timestamp", BucketWidth::OneWeek).expect("series");
        let starts: Vec<String> = series.buckets.iter().map(|b| format_timestamp(&b.start)).collect();
        assert_eq!(starts, vec!["2023-04-24 00:00:00", "2023-05-01 00:00:00"]);
    }

    #[test]
    fn weekly_buckets_are_named_by_their_closing_sunday() {
        // Saturday and Sunday share a week; the Monday opens the next one.
        let data = table(
            &[
                Some("2023-04-29 10:00:00"),
                Some("2023-04-30 10:00:00"),
                Some("2023-05-01 10:00:00"),
            ],
            &["Fail", "Success", "Fail"],
        );
        let series = resample_counts(&data, "timestamp", BucketWidth::OneWeek).expect("series");
        let labelled: Vec<(String, u64)> = series
            .buckets
            .iter()
            .map(|b| (format_timestamp(&b.label), b.count))
            .collect();
        assert_eq!(
            labelled,
            vec![
                ("2023-04-30 00:00:00".to_string(), 2),
                ("2023-05-07 00:00:00".to_string(), 1),
            ]
        );

        let split = resample_counts_by(&data, "timestamp", BucketWidth::OneWeek, "login", &[])
            .expect("split");
        let labels: Vec<String> = split.labels.iter().map(format_timestamp).collect();
        assert_eq!(labels, vec!["2023-04-30 00:00:00", "2023-05-07 00:00:00"]);
        assert_eq!(split.series[0].counts, vec![1, 1]);
        assert_eq!(split.series[1].counts, vec![1, 0]);
    }

    #[test]
    fn sub_weekly_labels_are_bucket_starts() {
        let series = resample_counts(&sample(), "timestamp", BucketWidth::FifteenMinutes)
            .expect("series");
        assert!(series.buckets.iter().all(|b| b.label == b.start));
    }

    #[test]
    fn daily_span_counts_every_day() {
        let data = table(
            &[Some("2023-04-25 23:00:00"), Some("2023-04-28 01:00:00")],
            &["Fail", "Fail"],
        );
        let series = resample_counts(&data, "timestamp", BucketWidth::OneDay).expect("series");
        assert_eq!(series.buckets.len(), 4);
        assert_eq!(series.total(), 2);
    }

    #[test]
    fn split_series_share_one_axis() {
        let split = resample_counts_by(
            &sample(),
            "timestamp",
            BucketWidth::FifteenMinutes,
            "login",
            &["Success".to_string(), "Fail".to_string(), "Blocked".to_string()],
        )
        .expect("split");
        assert_eq!(split.starts.len(), 3);
        let names: Vec<&str> = split.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Success", "Fail", "Blocked"]);
        assert_eq!(split.series[0].counts, vec![1, 0, 1]);
        assert_eq!(split.series[1].counts, vec![2, 0, 0]);
        assert_eq!(split.series[2].counts, vec![0, 0, 0]);
    }

    #[test]
    fn split_without_categories_uses_observed_ones() {
        let split = resample_counts_by(&sample(), "timestamp", BucketWidth::OneHour, "login", &[])
            .expect("split");
        let names: Vec<&str> = split.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Fail", "Success"]);
        assert_eq!(split.starts.len(), 1);
    }

    #[test]
    fn empty_input_gives_empty_series() {
        let empty = sample().head(0);
        let series = resample_counts(&empty, "timestamp", BucketWidth::OneHour).expect("series");
        assert!(series.buckets.is_empty());
        assert!(resample_counts(&empty, "ts", BucketWidth::OneHour).is_err());
    }
}
