//! Row storage for the grid.
//!
//! Rows arrive as key → value records and are stored column-aligned, so a
//! cell is addressed by `(row index, declaration index)` with no key lookups
//! on the render path.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ColumnDescriptor;
use crate::error::Result;

/// A single cell value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Convert a decoded JSON value. Arrays and objects are kept as their JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }

    /// Numeric view of the value, if it is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text drawn for this value.
    pub fn display(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Format a number without a trailing `.0` for integral values.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    // Adding positive zero turns -0 into 0
    let n = n + 0.0;
    if n.fract().abs() < f64::EPSILON && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        let s = format!("{n:.2}");
        match s.trim_end_matches('0').trim_end_matches('.') {
            "-0" => "0".to_string(),
            trimmed => trimmed.to_string(),
        }
    }
}

/// One record, aligned with the dataset's column declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub cells: Vec<CellValue>,
}

impl Row {
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    pub fn get(&self, col: usize) -> Option<&CellValue> {
        self.cells.get(col)
    }
}

/// Wire shape of a dataset document
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct DatasetDocument {
    columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    rows: Vec<Map<String, Value>>,
}

/// Columns plus rows; immutable once handed to the grid
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(columns: Vec<ColumnDescriptor>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Build from key → value records. Keys missing from a record become `Null`.
    pub fn from_records(columns: Vec<ColumnDescriptor>, records: &[Map<String, Value>]) -> Self {
        let rows = records
            .iter()
            .map(|record| {
                Row::new(
                    columns
                        .iter()
                        .map(|c| record.get(&c.key).map(CellValue::from_json).unwrap_or_default())
                        .collect(),
                )
            })
            .collect();
        Self { columns, rows }
    }

    /// Decode `{ "columns": [...], "rows": [...] }`.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: DatasetDocument = serde_json::from_str(json)?;
        Ok(Self::from_records(doc.columns, &doc.rows))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Declaration index of the column with `key`.
    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }

    /// Distinct display values of a column in first-seen order.
    pub fn distinct_values(&self, col: usize) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for row in &self.rows {
            let text = row.get(col).map(CellValue::display).unwrap_or_default();
            if seen.insert(text.clone()) {
                out.push(text);
            }
        }
        out
    }
}
