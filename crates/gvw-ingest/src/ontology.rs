//! Ontology JSON node extraction
//!
//! The HPO and Mondo projects publish their ontologies as OBO-graph JSON
//! dumps (`hp.json`, `mondo.json`). The warehouse only wants the term id,
//! the label, and (for Mondo) SKOS cross-ontology mappings.

use crate::schema::{Batch, TableConfig, Value};
use crate::{IngestError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

const SKOS_CORE_NS: &str = "http://www.w3.org/2004/02/skos/core#";

/// Which ontology dump is being extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ontology {
    Hp,
    Mondo,
}

impl Ontology {
    /// Destination warehouse table for this ontology.
    pub fn table(&self) -> &'static str {
        match self {
            Ontology::Hp => "hpo_terms",
            Ontology::Mondo => "mondo_terms",
        }
    }

    /// Substring an OBO-graph node id must contain (case-insensitive) to
    /// belong to this ontology.
    fn id_marker(&self) -> &'static str {
        match self {
            Ontology::Hp => "hp",
            Ontology::Mondo => "mondo",
        }
    }
}

/// One extracted ontology term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermRow {
    pub id: String,
    pub lbl: String,
    /// SKOS mappings, Mondo only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skos_matches: Option<Vec<SkosMatch>>,
}

/// A SKOS mapping entry, e.g. `{relation: "exactMatch", value: "DOID:..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkosMatch {
    pub relation: String,
    pub value: String,
}

#[derive(Deserialize)]
struct OboGraphFile {
    #[serde(default)]
    graphs: Vec<OboGraph>,
}

#[derive(Deserialize)]
struct OboGraph {
    #[serde(default)]
    nodes: Vec<OboNode>,
}

#[derive(Deserialize)]
struct OboNode {
    id: Option<String>,
    lbl: Option<String>,
    meta: Option<OboNodeMeta>,
}

#[derive(Deserialize)]
struct OboNodeMeta {
    #[serde(default, rename = "basicPropertyValues")]
    basic_property_values: Vec<BasicPropertyValue>,
}

#[derive(Deserialize)]
struct BasicPropertyValue {
    pred: Option<String>,
    val: Option<String>,
}

/// Extract term rows from an OBO-graph JSON dump.
///
/// Nodes without an `id` or `lbl` are skipped, as are nodes belonging to a
/// different ontology (the dumps embed imported foreign terms). Node ids
/// are compacted from IRI form to CURIE form
/// (`.../HP_0000118` -> `HP:0000118`).
pub fn extract_ontology_nodes(content: &str, ontology: Ontology) -> Result<Vec<TermRow>> {
    let file: OboGraphFile = serde_json::from_str(content)?;
    let graph = file
        .graphs
        .into_iter()
        .next()
        .ok_or_else(|| IngestError::Parse("ontology dump contains no graphs".to_string()))?;

    let mut rows = Vec::new();
    for node in graph.nodes {
        let (Some(raw_id), Some(lbl)) = (node.id, node.lbl) else {
            continue;
        };

        if !raw_id.to_lowercase().contains(ontology.id_marker()) {
            continue;
        }

        let id = compact_id(&raw_id);
        let skos_matches = match ontology {
            Ontology::Hp => None,
            Ontology::Mondo => Some(collect_skos_matches(node.meta.as_ref())),
        };

        rows.push(TermRow {
            id,
            lbl,
            skos_matches,
        });
    }

    info!(ontology = ?ontology, rows = rows.len(), "extracted ontology nodes");
    Ok(rows)
}

/// Build a loadable batch from extracted term rows.
pub fn ontology_batch(rows: Vec<TermRow>, ontology: Ontology) -> Result<Batch> {
    let config = TableConfig::new(ontology.table(), "id");

    let columns = match ontology {
        Ontology::Hp => vec!["id".to_string(), "lbl".to_string()],
        Ontology::Mondo => vec![
            "id".to_string(),
            "lbl".to_string(),
            "skos_matches".to_string(),
        ],
    };

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let mut cells = vec![Value::Text(row.id), Value::Text(row.lbl)];
        if ontology == Ontology::Mondo {
            let matches = row.skos_matches.unwrap_or_default();
            cells.push(Value::Json(serde_json::to_value(matches)?));
        }
        out.push(cells);
    }

    Ok(Batch {
        config,
        columns,
        rows: out,
    })
}

/// Compact an IRI node id to CURIE form: keep the last `/` segment and
/// swap `_` for `:`.
fn compact_id(raw: &str) -> String {
    raw.rsplit('/').next().unwrap_or(raw).replace('_', ":")
}

fn collect_skos_matches(meta: Option<&OboNodeMeta>) -> Vec<SkosMatch> {
    let Some(meta) = meta else {
        return Vec::new();
    };

    meta.basic_property_values
        .iter()
        .filter_map(|prop| {
            let pred = prop.pred.as_deref()?;
            let rest = pred.strip_prefix(SKOS_CORE_NS)?;
            Some(SkosMatch {
                relation: rest.to_string(),
                value: prop.val.clone().unwrap_or_default(),
            })
        })
        .collect()
}
