//! Schema-driven TSV row normalization
//!
//! Turns a raw tab-delimited blob into a rectangular, type-coerced
//! [`Batch`]: headers renamed (`id_column` -> `id`, everything else
//! snake_cased), then each cell coerced against the table schema.

use crate::dates::parse_date;
use crate::header::normalize_header;
use crate::schema::{Batch, ColumnSchema, ColumnType, TableConfig, Value};
use crate::{IngestError, Result};
use tracing::debug;

/// Normalize raw tab-delimited text into a warehouse-ready batch.
///
/// The first line is authoritative for column names. Short data rows are
/// padded with empty cells; extra cells beyond the header width are
/// dropped. Returns `IngestError::Config` when `id_column` (compared after
/// trimming) matches no header.
pub fn normalize_tsv(text: &str, config: &TableConfig) -> Result<Batch> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();

    let mut columns = Vec::with_capacity(headers.len());
    let mut id_found = false;
    for header in headers.iter() {
        if header.trim() == config.id_column {
            // The rename wins even if another header would normalize to
            // "id"; no collision check is performed (known gap).
            columns.push("id".to_string());
            id_found = true;
        } else {
            columns.push(normalize_header(header));
        }
    }

    if !id_found {
        return Err(IngestError::Config(format!(
            "id column '{}' not found in headers for table '{}'",
            config.id_column, config.table
        )));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = columns
            .iter()
            .enumerate()
            .map(|(idx, name)| coerce_cell(record.get(idx).unwrap_or(""), name, config))
            .collect();
        rows.push(row);
    }

    debug!(
        table = %config.table,
        rows = rows.len(),
        columns = columns.len(),
        "normalized TSV batch"
    );

    Ok(Batch {
        config: config.clone(),
        columns,
        rows,
    })
}

/// Coerce one raw cell against the table schema.
///
/// Total: every input maps to a value, never an error.
fn coerce_cell(raw: &str, column: &str, config: &TableConfig) -> Value {
    // The id column is always textual in the warehouse, regardless of any
    // schema entry for it.
    if column == "id" {
        return Value::Text(raw.to_string());
    }

    match config.column(column) {
        Some(schema) => coerce_typed(raw, schema, config.delimiter),
        // No schema entry (or no schema at all): raw pass-through with no
        // null normalization.
        None => Value::Text(raw.to_string()),
    }
}

fn coerce_typed(raw: &str, schema: &ColumnSchema, delimiter: char) -> Value {
    if schema.repeated {
        // Empty or whitespace-only cells become an empty list, never [""].
        if raw.trim().is_empty() {
            return Value::Array(Vec::new());
        }
        let elements = raw
            .split(delimiter)
            .map(|piece| coerce_scalar(piece.trim(), schema.column_type))
            .collect();
        return Value::Array(elements);
    }

    coerce_scalar(raw, schema.column_type)
}

fn coerce_scalar(raw: &str, column_type: ColumnType) -> Value {
    match column_type {
        ColumnType::String => {
            if raw.is_empty() {
                Value::Null
            } else {
                Value::Text(raw.to_string())
            }
        }
        ColumnType::Integer => raw
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .unwrap_or(Value::Null),
        ColumnType::Date => parse_date(raw).map(Value::Date).unwrap_or(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn config() -> TableConfig {
        TableConfig::new("test_table", "org ID").with_schema(vec![
            ColumnSchema::new("id", ColumnType::String),
            ColumnSchema::new("some_field", ColumnType::String),
            ColumnSchema::new("count", ColumnType::Integer),
            ColumnSchema::new("last_seen", ColumnType::Date),
            ColumnSchema::repeated("values", ColumnType::String),
        ])
    }

    #[test]
    fn test_id_rename_keeps_text() {
        let batch = normalize_tsv("org ID\tSome Field\n42\tx\n", &config()).unwrap();

        assert_eq!(batch.columns, vec!["id", "some_field"]);
        assert_eq!(batch.get(0, "id"), Some(&Value::Text("42".to_string())));
        assert_eq!(batch.get(0, "some_field"), Some(&Value::Text("x".to_string())));
    }

    #[test]
    fn test_missing_id_column_is_config_error() {
        let err = normalize_tsv("GeneID\tsymbol\n1\tBRCA1\n", &config()).unwrap_err();
        assert!(matches!(err, IngestError::Config(_)));
    }

    #[test]
    fn test_repeated_split_and_empty() {
        let tsv = "org ID\tvalues\n1\tval1,val2,val3\n2\tsingle_val\n3\t\n4\t   \n";
        let batch = normalize_tsv(tsv, &config()).unwrap();

        assert_eq!(
            batch.get(0, "values"),
            Some(&Value::Array(vec![
                Value::from("val1"),
                Value::from("val2"),
                Value::from("val3"),
            ]))
        );
        assert_eq!(
            batch.get(1, "values"),
            Some(&Value::Array(vec![Value::from("single_val")]))
        );
        // Empty and whitespace-only cells yield [], not [""].
        assert_eq!(batch.get(2, "values"), Some(&Value::Array(Vec::new())));
        assert_eq!(batch.get(3, "values"), Some(&Value::Array(Vec::new())));
    }

    #[test]
    fn test_repeated_pipe_delimiter() {
        let config = TableConfig::new("genes", "GeneID")
            .with_schema(vec![ColumnSchema::repeated("synonyms", ColumnType::String)])
            .with_delimiter('|');

        let batch = normalize_tsv("GeneID\tSynonyms\n672\tRNF53 | BRCC1\n", &config).unwrap();
        assert_eq!(
            batch.get(0, "synonyms"),
            Some(&Value::Array(vec![Value::from("RNF53"), Value::from("BRCC1")]))
        );
    }

    #[test]
    fn test_integer_degrades_to_null() {
        let tsv = "org ID\tcount\n1\t17\n2\t\n3\tnot_a_number\n4\t 9 \n";
        let batch = normalize_tsv(tsv, &config()).unwrap();

        assert_eq!(batch.get(0, "count"), Some(&Value::Integer(17)));
        assert_eq!(batch.get(1, "count"), Some(&Value::Null));
        assert_eq!(batch.get(2, "count"), Some(&Value::Null));
        assert_eq!(batch.get(3, "count"), Some(&Value::Integer(9)));
    }

    #[test]
    fn test_date_coercion() {
        let tsv = "org ID\tlast_seen\n1\tJun 26, 2025\n2\t2025-02-30\n3\t\n";
        let batch = normalize_tsv(tsv, &config()).unwrap();

        assert_eq!(
            batch.get(0, "last_seen"),
            Some(&Value::Date(NaiveDate::from_ymd_opt(2025, 6, 26).unwrap()))
        );
        assert_eq!(batch.get(1, "last_seen"), Some(&Value::Null));
        assert_eq!(batch.get(2, "last_seen"), Some(&Value::Null));
    }

    #[test]
    fn test_empty_string_vs_null() {
        // STRING schema column: empty -> Null. Schema-less column: raw
        // pass-through, empty string preserved.
        let tsv = "org ID\tsome_field\tUnknown Col\n1\t\t\n";
        let batch = normalize_tsv(tsv, &config()).unwrap();

        assert_eq!(batch.get(0, "some_field"), Some(&Value::Null));
        assert_eq!(batch.get(0, "unknown_col"), Some(&Value::Text(String::new())));
    }

    #[test]
    fn test_short_rows_padded() {
        let tsv = "org ID\tsome_field\tcount\n1\n2\tx\t5\n";
        let batch = normalize_tsv(tsv, &config()).unwrap();

        assert_eq!(batch.rows[0].len(), 3);
        assert_eq!(batch.get(0, "some_field"), Some(&Value::Null));
        assert_eq!(batch.get(1, "count"), Some(&Value::Integer(5)));
    }

    #[test]
    fn test_no_schema_passthrough() {
        let config = TableConfig::new("raw_table", "id");
        let batch = normalize_tsv("id\tAnything Goes\n1\t\n", &config).unwrap();

        assert_eq!(batch.columns, vec!["id", "anything_goes"]);
        assert_eq!(batch.get(0, "anything_goes"), Some(&Value::Text(String::new())));
    }

    #[test]
    fn test_rows_are_rectangular() {
        let tsv = "org ID\tsome_field\n1\ta\n2\n3\tb\textra\n";
        let batch = normalize_tsv(tsv, &config()).unwrap();

        for row in &batch.rows {
            assert_eq!(row.len(), batch.columns.len());
        }
    }
}
