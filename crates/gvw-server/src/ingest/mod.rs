//! Storage-change ingest trigger
//!
//! `POST /` receives an object-change notification (`{"bucket": ..,
//! "name": ..}`), routes it by exact file name, and runs the matching
//! normalize-and-load pipeline. Files the warehouse does not track are
//! acknowledged with a success response so the notification source never
//! retries them.

use axum::{extract::State, Json};
use gvw_ingest::{
    normalize_tsv,
    ontology::{extract_ontology_nodes, ontology_batch},
    tables, Ontology, TableConfig,
};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::{info, instrument};

use crate::error::{AppError, AppResult};
use crate::AppState;

/// An object-change notification.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerEvent {
    pub bucket: String,
    pub name: String,
}

/// What to do with a named drop file.
#[derive(Debug, Clone)]
pub enum FileRoute {
    /// OBO-graph JSON dump
    Ontology(Ontology),
    /// Schema-driven TSV table
    Table(TableConfig),
    /// Not a tracked warehouse input
    Ignore,
}

/// Route an object name to its pipeline. Matching is on the exact object
/// name; anything unrecognized is ignored rather than rejected.
pub fn route_for(name: &str) -> FileRoute {
    match name {
        "hp.json" => FileRoute::Ontology(Ontology::Hp),
        "mondo.json" => FileRoute::Ontology(Ontology::Mondo),
        "ncbi_gene.txt" => FileRoute::Table(tables::ncbi_gene()),
        "organization_summary.txt" => FileRoute::Table(tables::submitter_organization()),
        _ => FileRoute::Ignore,
    }
}

/// Handle a storage-change notification.
///
/// The body is parsed manually so that a missing or malformed payload comes
/// back as the service's own `{"status": "error"}` shape rather than a
/// framework rejection.
#[instrument(skip(state, body))]
pub async fn handle_trigger(
    State(state): State<AppState>,
    body: Option<Json<JsonValue>>,
) -> AppResult<Json<JsonValue>> {
    let Some(Json(body)) = body else {
        return Err(AppError::BadRequest("Missing request body".to_string()));
    };

    let event: TriggerEvent = serde_json::from_value(body)
        .map_err(|_| AppError::BadRequest("Missing bucket or name".to_string()))?;

    if event.bucket.is_empty() || event.name.is_empty() {
        return Err(AppError::BadRequest("Missing bucket or name".to_string()));
    }

    info!("Triggered by file: {}", event.name);

    let message = match route_for(&event.name) {
        FileRoute::Ontology(ontology) => {
            ingest_ontology(&state, &event, ontology).await?
        },
        FileRoute::Table(config) => ingest_table(&state, &event, config).await?,
        FileRoute::Ignore => {
            info!("Ignored file: {}", event.name);
            format!("Ignored file: {}", event.name)
        },
    };

    Ok(Json(json!({
        "status": "success",
        "message": message,
    })))
}

async fn ingest_ontology(
    state: &AppState,
    event: &TriggerEvent,
    ontology: Ontology,
) -> AppResult<String> {
    let content = state.storage.download_text(&event.bucket, &event.name).await?;

    let rows = extract_ontology_nodes(&content, ontology)?;
    if rows.is_empty() {
        return Ok(format!("No relevant data found in {}", event.name));
    }

    let batch = ontology_batch(rows, ontology)?;
    let loaded = state.warehouse.load_truncate(&batch).await?;

    Ok(loaded_message(state, &batch.config.table, loaded))
}

async fn ingest_table(
    state: &AppState,
    event: &TriggerEvent,
    config: TableConfig,
) -> AppResult<String> {
    let content = state.storage.download_text(&event.bucket, &event.name).await?;

    let batch = normalize_tsv(&content, &config)?;
    let loaded = state.warehouse.load_truncate(&batch).await?;

    Ok(loaded_message(state, &batch.config.table, loaded))
}

fn loaded_message(state: &AppState, table: &str, rows: usize) -> String {
    format!(
        "Loaded {} rows into {}.{}.{}",
        rows, state.config.warehouse.project, state.config.warehouse.dataset, table
    )
}
