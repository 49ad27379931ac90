// Table entity
// Event records loaded from a CSV file, held in a polars DataFrame

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::io::Cursor;

use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::Serialize;

use crate::error::DataError;
use crate::utils::parse_timestamp;

/// A single cell value, used for group keys and comparisons.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(value) => Some(*value as f64),
            Scalar::Float(value) => Some(*value),
            Scalar::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(value) => Some(value),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Scalar::Int(_) | Scalar::Float(_) => 0,
            Scalar::Text(_) => 1,
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scalar {}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Numbers sort before text; floats use total ordering so NaN has a place.
impl Ord for Scalar {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Scalar::Int(a), Scalar::Int(b)) => a.cmp(b),
            (Scalar::Text(a), Scalar::Text(b)) => a.cmp(b),
            (a, b) if a.rank() == b.rank() => {
                let left = a.as_f64().unwrap_or(f64::NAN);
                let right = b.as_f64().unwrap_or(f64::NAN);
                left.total_cmp(&right)
            }
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(value) => write!(f, "{}", value),
            Scalar::Float(value) => write!(f, "{}", value),
            Scalar::Text(value) => f.write_str(value),
        }
    }
}

/// Column types as reported to users; anything non-numeric is text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Text,
}

impl DType {
    pub fn of(dtype: &DataType) -> DType {
        match dtype {
            DataType::Int8 => DType::Int8,
            DataType::Int16 => DType::Int16,
            DataType::Int32 => DType::Int32,
            DataType::Int64 | DataType::UInt32 | DataType::UInt64 => DType::Int64,
            DataType::Float32 => DType::Float32,
            DataType::Float64 => DType::Float64,
            _ => DType::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Text => "text",
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, DType::Text)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, DType::Int8 | DType::Int16 | DType::Int32 | DType::Int64)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every cell of `column` rendered as text; nulls stay `None`.
pub fn text_values(column: &Column) -> Result<Vec<Option<String>>, DataError> {
    let text = column.cast(&DataType::String)?;
    Ok(text
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Cells of `column` as group-key scalars.
pub fn scalars(column: &Column) -> Result<Vec<Option<Scalar>>, DataError> {
    let dtype = DType::of(column.dtype());
    if dtype.is_integer() {
        let ints = column.cast(&DataType::Int64)?;
        return Ok(ints
            .as_materialized_series()
            .i64()?
            .into_iter()
            .map(|v| v.map(Scalar::Int))
            .collect());
    }
    if dtype.is_numeric() {
        let floats = column.cast(&DataType::Float64)?;
        return Ok(floats
            .as_materialized_series()
            .f64()?
            .into_iter()
            .map(|v| v.map(Scalar::Float))
            .collect());
    }
    Ok(text_values(column)?
        .into_iter()
        .map(|v| v.map(Scalar::Text))
        .collect())
}

#[derive(Debug, Clone)]
pub struct Table {
    frame: DataFrame,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            frame: DataFrame::empty(),
        }
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.frame.equals_missing(&other.frame)
    }
}

impl From<DataFrame> for Table {
    fn from(frame: DataFrame) -> Self {
        Self { frame }
    }
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, DataError> {
        let height = columns.first().map(|c| c.len()).unwrap_or(0);
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name().to_string()) {
                return Err(DataError::DuplicateColumn(column.name().to_string()));
            }
            if column.len() != height {
                return Err(DataError::RaggedColumn {
                    column: column.name().to_string(),
                    expected: height,
                    actual: column.len(),
                });
            }
        }
        Ok(Self {
            frame: DataFrame::new(columns)?,
        })
    }

    /// Reads CSV text with a header row; polars infers each column's type.
    ///
    /// Empty fields become nulls. Boolean columns are kept as text.
    pub fn from_csv(bytes: Vec<u8>) -> Result<Table, DataError> {
        let mut frame = CsvReadOptions::default()
            .with_has_header(true)
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()
            .map_err(|err| DataError::Csv(err.to_string()))?;
        let flags: Vec<Column> = frame
            .get_columns()
            .iter()
            .filter(|c| c.dtype() == &DataType::Boolean)
            .map(|c| c.cast(&DataType::String))
            .collect::<PolarsResult<_>>()?;
        for column in flags {
            frame.with_column(column)?;
        }
        Ok(Table { frame })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.get_columns().iter().any(|c| c.name().as_str() == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column, DataError> {
        self.frame
            .column(name)
            .map_err(|_| DataError::MissingColumn(name.to_string()))
    }

    pub fn dtype(&self, name: &str) -> Result<DType, DataError> {
        Ok(DType::of(self.column(name)?.dtype()))
    }

    /// Text rendering of one column, see [`text_values`].
    pub fn text(&self, name: &str) -> Result<Vec<Option<String>>, DataError> {
        text_values(self.column(name)?)
    }

    /// Parsed timestamp per row; `None` for null or unparseable cells.
    pub fn timestamps(&self, name: &str) -> Result<Vec<Option<NaiveDateTime>>, DataError> {
        Ok(self
            .text(name)?
            .into_iter()
            .map(|value| value.and_then(|v| parse_timestamp(&v)))
            .collect())
    }

    pub fn head(&self, n: usize) -> Table {
        Table {
            frame: self.frame.head(Some(n)),
        }
    }

    /// Keeps the rows where `mask` is true.
    pub fn filter_mask(&self, mask: &[bool]) -> Result<Table, DataError> {
        let mask: BooleanChunked = mask.iter().copied().collect();
        Ok(Table {
            frame: self.frame.filter(&mask)?,
        })
    }

    /// Rows whose `column` renders exactly as `value`.
    pub fn filter_eq(&self, column: &str, value: &str) -> Result<Table, DataError> {
        self.column(column)?;
        let frame = self
            .frame
            .clone()
            .lazy()
            .filter(col(column).cast(DataType::String).eq(lit(value)))
            .collect()?;
        Ok(Table { frame })
    }

    /// Adds `column`, or replaces the column with the same name in place.
    pub fn with_column(mut self, column: Column) -> Result<Table, DataError> {
        if self.width() > 0 && column.len() != self.height() {
            return Err(DataError::RaggedColumn {
                column: column.name().to_string(),
                expected: self.height(),
                actual: column.len(),
            });
        }
        self.frame.with_column(column)?;
        Ok(self)
    }

    /// Derives a text copy of a column (e.g. ports before grouping).
    pub fn cast_to_text(self, name: &str) -> Result<Table, DataError> {
        let text = self.column(name)?.cast(&DataType::String)?;
        self.with_column(text)
    }

    /// Display strings, nulls rendered empty, for previews.
    pub fn display_rows(&self) -> Result<Vec<Vec<String>>, DataError> {
        let columns = self
            .frame
            .get_columns()
            .iter()
            .map(text_values)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((0..self.height())
            .map(|row| {
                columns
                    .iter()
                    .map(|values| values[row].clone().unwrap_or_default())
                    .collect()
            })
            .collect())
    }

    pub fn memory_bytes(&self) -> usize {
        self.frame.estimated_size()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{int_column, text_column};
    use super::*;

    #[test]
    fn rejects_ragged_and_duplicate_columns() {
        let err = Table::new(vec![
            text_column("a", &[Some("x"), Some("y")]),
            text_column("b", &[Some("x")]),
        ])
        .expect_err("ragged");
        assert!(matches!(err, DataError::RaggedColumn { .. }));

        let err = Table::new(vec![text_column("a", &[Some("x")]), text_column("a", &[Some("y")])])
            .expect_err("duplicate");
        assert_eq!(err, DataError::DuplicateColumn("a".to_string()));
    }

    #[test]
    fn filter_eq_and_cast_to_text() {
        let table = Table::new(vec![
            text_column("login", &[Some("Success"), Some("Fail"), Some("Fail")]),
            int_column("port", &[Some(22), None, Some(445)]),
        ])
        .expect("table");

        let failed = table.filter_eq("login", "Fail").expect("filter");
        assert_eq!(failed.height(), 2);
        let by_port = table.filter_eq("port", "445").expect("filter");
        assert_eq!(by_port.height(), 1);

        let cast = table.cast_to_text("port").expect("cast");
        assert_eq!(cast.dtype("port").expect("port"), DType::Text);
        let port = cast.text("port").expect("port");
        assert_eq!(port[2].as_deref(), Some("445"));
        assert!(port[1].is_none());
        assert_eq!(cast.column_names(), vec!["login", "port"]);
    }

    #[test]
    fn scalar_ordering_puts_numbers_first() {
        let mut keys = vec![
            Scalar::Text("b".into()),
            Scalar::Float(2.5),
            Scalar::Int(3),
            Scalar::Text("a".into()),
            Scalar::Int(1),
        ];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["1", "2.5", "3", "a", "b"]);
    }

    #[test]
    fn missing_column_is_reported() {
        let table = Table::default();
        assert_eq!(
            table.column("timestamp").expect_err("missing"),
            DataError::MissingColumn("timestamp".to_string())
        );
        assert!(table.filter_eq("login", "Fail").is_err());
    }

    #[test]
    fn from_csv_infers_types() {
        let csv = "id,ratio,ip,ok\n1,0.5,1.1.1.1,true\n2,,,false\n3,2,2.2.2.2,true\n";
        let table = Table::from_csv(csv.as_bytes().to_vec()).expect("table");
        assert_eq!(table.dtype("id").expect("id"), DType::Int64);
        assert_eq!(table.dtype("ratio").expect("ratio"), DType::Float64);
        assert_eq!(table.dtype("ip").expect("ip"), DType::Text);
        assert_eq!(table.dtype("ok").expect("ok"), DType::Text);
        assert!(table.text("ip").expect("ip")[1].is_none());
    }

    #[test]
    fn display_rows_render_nulls_empty() {
        let table = Table::new(vec![
            text_column("ip", &[Some("1.1.1.1"), None]),
            int_column("port", &[None, Some(22)]),
        ])
        .expect("table");
        assert_eq!(
            table.display_rows().expect("rows"),
            vec![
                vec!["1.1.1.1".to_string(), String::new()],
                vec![String::new(), "22".to_string()],
            ]
        );
    }

    #[test]
    fn from_csv_rejects_long_rows() {
        let err = Table::from_csv(b"a,b\n1,2,3\n".to_vec()).expect_err("long row");
        assert!(matches!(err, DataError::Csv(_)));
    }
}
