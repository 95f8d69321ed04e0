//! Destination table configurations
//!
//! One constructor per warehouse table fed by TSV drops. Configs are built
//! fresh at call time and handed to the normalizer; there is no global
//! table registry.

use crate::schema::{ColumnSchema, ColumnType, TableConfig};

/// NCBI gene summary table (`ncbi_gene.txt`).
///
/// The synonyms cell is pipe-joined in the source file.
pub fn ncbi_gene() -> TableConfig {
    use ColumnType::String;

    TableConfig::new("ncbi_gene", "GeneID")
        .with_delimiter('|')
        .with_schema(vec![
            ColumnSchema::new("id", String),
            ColumnSchema::new("symbol", String),
            ColumnSchema::new("description", String),
            ColumnSchema::new("gene_type", String),
            ColumnSchema::new("nomenclature_id", String),
            ColumnSchema::repeated("synonyms", String),
            ColumnSchema::new("omim_id", String),
        ])
}

/// Submitter organization summary table (`organization_summary.txt`).
pub fn submitter_organization() -> TableConfig {
    use ColumnType::{Date, Integer, String};

    TableConfig::new("submitter_organization", "organization ID").with_schema(vec![
        ColumnSchema::new("organization", String),
        ColumnSchema::new("id", String),
        ColumnSchema::new("institution_type", String),
        ColumnSchema::new("street_address", String),
        ColumnSchema::new("city", String),
        ColumnSchema::new("country", String),
        ColumnSchema::new("number_of_clinvar_submissions", Integer),
        ColumnSchema::new("date_last_submitted", Date),
        ColumnSchema::new("maximum_review_status", String),
        ColumnSchema::repeated("collection_methods", String),
        ColumnSchema::new("novel_and_updates", String),
        ColumnSchema::repeated("clinical_significance_categories_submitted", String),
        ColumnSchema::new("number_of_submissions_from_clinical_testing", Integer),
        ColumnSchema::new("number_of_submissions_from_research", Integer),
        ColumnSchema::new("number_of_submissions_from_literature_only", Integer),
        ColumnSchema::new("number_of_submissions_from_curation", Integer),
        ColumnSchema::new("number_of_submissions_from_phenotyping", Integer),
        ColumnSchema::repeated("somatic_clinical_impact_values_submitted", String),
        ColumnSchema::repeated("somatic_oncogenicity_values_submitted", String),
    ])
}

/// Look up a TSV table config by destination table name.
pub fn table_config(table: &str) -> Option<TableConfig> {
    match table {
        "ncbi_gene" => Some(ncbi_gene()),
        "submitter_organization" => Some(submitter_organization()),
        _ => None,
    }
}
