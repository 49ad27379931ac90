// Type compressor
// Shrinks numeric polars columns and rewrites date-like text as canonical timestamps

use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::entities::table::{text_values, DType, Table};
use crate::error::DataError;
use crate::utils::{format_timestamp, parse_timestamp};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Downcast {
    pub column: String,
    pub from: DType,
    pub to: DType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct CompressionReport {
    pub downcasts: Vec<Downcast>,
    pub dates_converted: Vec<String>,
    /// Text columns that are not uniformly date-like and were left as is.
    pub unconverted: Vec<String>,
    pub bytes_before: usize,
    pub bytes_after: usize,
}

pub fn compress(table: &Table) -> Result<(Table, CompressionReport), DataError> {
    let mut report = CompressionReport {
        bytes_before: table.memory_bytes(),
        ..Default::default()
    };

    let columns = table
        .frame()
        .get_columns()
        .iter()
        .map(|column| compress_column(column, &mut report))
        .collect::<Result<Vec<_>, _>>()?;
    let compressed = Table::new(columns)?;
    report.bytes_after = compressed.memory_bytes();
    Ok((compressed, report))
}

fn compress_column(column: &Column, report: &mut CompressionReport) -> Result<Column, DataError> {
    let name = column.name().to_string();
    let from = DType::of(column.dtype());
    let compressed = match from {
        DType::Text => match to_canonical_dates(column)? {
            Some(converted) => {
                report.dates_converted.push(name.clone());
                converted
            }
            None => {
                debug!(column = %name, "text column left unconverted, not uniformly date-like");
                report.unconverted.push(name.clone());
                column.clone()
            }
        },
        DType::Float64 => downcast_floats(column)?,
        DType::Int16 | DType::Int32 | DType::Int64 => downcast_ints(column)?,
        _ => column.clone(),
    };
    let to = DType::of(compressed.dtype());
    if from != to {
        report.downcasts.push(Downcast { column: name, from, to });
    }
    Ok(compressed)
}

fn downcast_ints(column: &Column) -> Result<Column, DataError> {
    let series = column.as_materialized_series();
    let min = series.min::<i64>()?.unwrap_or(0);
    let max = series.max::<i64>()?.unwrap_or(0);

    let target = if min >= i8::MIN.into() && max <= i8::MAX.into() {
        DataType::Int8
    } else if min >= i16::MIN.into() && max <= i16::MAX.into() {
        DataType::Int16
    } else if min >= i32::MIN.into() && max <= i32::MAX.into() {
        DataType::Int32
    } else {
        DataType::Int64
    };
    Ok(column.strict_cast(&target)?)
}

fn downcast_floats(column: &Column) -> Result<Column, DataError> {
    let limit = f64::from(f32::MAX);
    let fits = column
        .as_materialized_series()
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .all(|v| v.abs() <= limit);
    if fits {
        Ok(column.cast(&DataType::Float32)?)
    } else {
        Ok(column.clone())
    }
}

/// All-or-nothing: one unparseable value keeps the whole column as text.
fn to_canonical_dates(column: &Column) -> Result<Option<Column>, DataError> {
    let mut seen_value = false;
    let mut converted: Vec<Option<String>> = Vec::with_capacity(column.len());
    for value in text_values(column)? {
        match value {
            Some(raw) => {
                let Some(parsed) = parse_timestamp(&raw) else {
                    return Ok(None);
                };
                seen_value = true;
                converted.push(Some(format_timestamp(&parsed)));
            }
            None => converted.push(None),
        }
    }
    Ok(seen_value.then(|| Series::new(column.name().clone(), converted).into_column()))
}
