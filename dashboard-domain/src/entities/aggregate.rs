// Aggregate entity
// Ranked (group key, value) rows produced by grouping event records

use serde::{Deserialize, Serialize};

use crate::entities::table::Scalar;
use crate::error::DataError;
use crate::value_objects::AggOp;

/// One column -> operation pair of an aggregation spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub column: String,
    pub op: AggOp,
}

impl Aggregation {
    pub fn new(column: impl Into<String>, op: AggOp) -> Self {
        Self {
            column: column.into(),
            op,
        }
    }

    pub fn count(column: impl Into<String>) -> Self {
        Self::new(column, AggOp::Count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: Vec<Scalar>,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRef {
    Key(usize),
    Value(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct AggregateTable {
    pub key_columns: Vec<String>,
    pub value_columns: Vec<String>,
    pub rows: Vec<AggregateRow>,
}

impl AggregateTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value columns win over key columns with the same name.
    pub fn resolve(&self, name: &str) -> Result<ColumnRef, DataError> {
        if let Some(idx) = self.value_columns.iter().position(|c| c == name) {
            return Ok(ColumnRef::Value(idx));
        }
        self.key_columns
            .iter()
            .position(|c| c == name)
            .map(ColumnRef::Key)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    }

    /// Renames a value column. Unknown names are ignored.
    pub fn rename_value(&mut self, from: &str, to: &str) {
        if let Some(column) = self.value_columns.iter_mut().find(|c| c.as_str() == from) {
            *column = to.to_string();
        }
    }

    pub fn head(&self, n: usize) -> AggregateTable {
        AggregateTable {
            key_columns: self.key_columns.clone(),
            value_columns: self.value_columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    pub fn label(&self, row: usize, column: ColumnRef) -> String {
        let Some(entry) = self.rows.get(row) else {
            return String::new();
        };
        match column {
            ColumnRef::Key(idx) => entry.key[idx].to_string(),
            ColumnRef::Value(idx) => entry.values[idx].map(format_number).unwrap_or_default(),
        }
    }

    pub fn number(&self, row: usize, column: ColumnRef) -> Option<f64> {
        let entry = self.rows.get(row)?;
        match column {
            ColumnRef::Key(idx) => entry.key[idx].as_f64(),
            ColumnRef::Value(idx) => entry.values[idx],
        }
    }

    /// (label, value) pairs for a named label column and value column.
    pub fn pairs(&self, label: &str, value: &str) -> Result<Vec<(String, f64)>, DataError> {
        let label_ref = self.resolve(label)?;
        let value_ref = self.resolve(value)?;
        Ok((0..self.rows.len())
            .map(|row| {
                (
                    self.label(row, label_ref),
                    self.number(row, value_ref).unwrap_or(0.0),
                )
            })
            .collect())
    }
}

/// Integral values print without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}
