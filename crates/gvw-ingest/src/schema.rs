//! Declarative table schemas and the typed cell values they produce.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Destination column type tags
///
/// A closed set: coercion is a total function per variant and never fails
/// (invalid input degrades to [`Value::Null`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    String,
    Integer,
    Date,
}

/// One destination column: name, type, and whether the source cell holds a
/// delimiter-joined list of scalars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub column_type: ColumnType,
    #[serde(default)]
    pub repeated: bool,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            repeated: false,
        }
    }

    pub fn repeated(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            repeated: true,
        }
    }
}

/// Static per-destination-table configuration.
///
/// Built once per table and passed into the normalizer at call time; there
/// is no process-wide table registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Destination table name within the warehouse dataset
    pub table: String,
    /// Raw input header that becomes the universal key `id`
    pub id_column: String,
    /// Ordered column schema; `None` disables all type coercion
    pub schema: Option<Vec<ColumnSchema>>,
    /// Separator for repeated-field cells
    pub delimiter: char,
}

impl TableConfig {
    pub fn new(table: impl Into<String>, id_column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            id_column: id_column.into(),
            schema: None,
            delimiter: ',',
        }
    }

    pub fn with_schema(mut self, schema: Vec<ColumnSchema>) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Look up the schema entry for a normalized column name.
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.schema
            .as_deref()
            .and_then(|cols| cols.iter().find(|c| c.name == name))
    }
}

/// A coerced cell value.
///
/// `Null` is an explicit marker distinguishing "no value" from an empty
/// string, so nullable INTEGER/DATE columns load correctly alongside
/// present values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Date(NaiveDate),
    Array(Vec<Value>),
    Json(serde_json::Value),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the inner text, if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// A normalized, rectangular batch: the unit handed to the warehouse
/// loader. Every row has exactly one value per entry in `columns`, in the
/// same order.
#[derive(Debug, Clone)]
pub struct Batch {
    pub config: TableConfig,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by normalized name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at (row, column name); `None` when either is absent.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }
}
