// Date range filter
// Row mask over parsed timestamps, applied with a polars frame filter

use chrono::NaiveDate;

use crate::entities::dashboard::DateBounds;
use crate::entities::table::Table;
use crate::error::DataError;

/// Keeps rows whose timestamp falls on a date in `[start, end]`.
///
/// Null and unparseable timestamps never match.
pub fn filter_by_date(
    table: &Table,
    column: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Table, DataError> {
    let mask: Vec<bool> = table
        .timestamps(column)?
        .into_iter()
        .map(|ts| ts.is_some_and(|ts| (start..=end).contains(&ts.date())))
        .collect();
    table.filter_mask(&mask)
}

/// Earliest and latest calendar dates in `column`, if any value parses.
pub fn timestamp_bounds(table: &Table, column: &str) -> Result<Option<DateBounds>, DataError> {
    let bounds = table
        .timestamps(column)?
        .into_iter()
        .flatten()
        .map(|ts| ts.date())
        .fold(None, |acc: Option<(NaiveDate, NaiveDate)>, date| match acc {
            None => Some((date, date)),
            Some((min, max)) => Some((min.min(date), max.max(date))),
        });
    Ok(bounds.map(|(min, max)| DateBounds { min, max }))
}
