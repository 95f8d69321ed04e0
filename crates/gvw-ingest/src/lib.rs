// Flat-file normalization for the genomic variant warehouse.
//
// This crate turns raw warehouse drop files into column-aligned, typed
// batches ready for a truncate-and-replace load:
//
// - TSV gene/organization tables: header renaming, schema-driven type
//   coercion, repeated-field splitting (rows.rs)
// - Ontology JSON dumps (hp.json, mondo.json): OBO-graph node extraction
//   (ontology.rs)
//
// The normalizer is pure and stateless: one call takes the raw text plus a
// `TableConfig` and produces a `Batch`. Nothing here talks to object
// storage or the warehouse; that wiring lives in gvw-server.

pub mod dates;
pub mod header;
pub mod ontology;
pub mod rows;
pub mod schema;
pub mod tables;

// Re-export main types
pub use dates::parse_date;
pub use header::normalize_header;
pub use ontology::{extract_ontology_nodes, ontology_batch, Ontology, TermRow};
pub use rows::normalize_tsv;
pub use schema::{Batch, ColumnSchema, ColumnType, TableConfig, Value};

/// Result type for normalization operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Error types for file normalization
///
/// Cell-level coercion never appears here: invalid INTEGER or DATE input
/// degrades to `Value::Null` rather than failing the batch.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
