//! End-to-end normalization tests against the real table configs.

use chrono::NaiveDate;
use gvw_ingest::{
    extract_ontology_nodes, normalize_tsv, ontology_batch, tables, Ontology, Value,
};

#[test]
fn ncbi_gene_drop_file_normalizes() {
    let tsv = "GeneID\tSymbol\tdescription\tGeneType\tNomenclatureID\tSynonyms\tOMIM ID\n\
               672\tBRCA1\tBRCA1 DNA repair associated\tprotein-coding\tHGNC:1100\tRNF53|BRCC1|PPP1R53\t113705\n\
               7157\tTP53\ttumor protein p53\tprotein-coding\tHGNC:11998\t\t191170\n";

    let batch = normalize_tsv(tsv, &tables::ncbi_gene()).unwrap();

    assert_eq!(
        batch.columns,
        vec![
            "id",
            "symbol",
            "description",
            "gene_type",
            "nomenclature_id",
            "synonyms",
            "omim_id"
        ]
    );

    // GeneID renamed to id and kept textual.
    assert_eq!(batch.get(0, "id"), Some(&Value::Text("672".to_string())));

    // Pipe-joined synonyms split into a repeated column.
    assert_eq!(
        batch.get(0, "synonyms"),
        Some(&Value::Array(vec![
            Value::Text("RNF53".to_string()),
            Value::Text("BRCC1".to_string()),
            Value::Text("PPP1R53".to_string()),
        ]))
    );

    // Empty repeated cell yields an empty list.
    assert_eq!(batch.get(1, "synonyms"), Some(&Value::Array(Vec::new())));
}

#[test]
fn organization_summary_types_coerce() {
    let tsv = "organization\torganization ID\tinstitution type\tstreet address\tcity\tcountry\t\
               number of ClinVar submissions\tdate last submitted\tmaximum review status\t\
               collection methods\tnovel and updates\tclinical significance categories submitted\t\
               number of submissions from clinical testing\tnumber of submissions from research\t\
               number of submissions from literature only\tnumber of submissions from curation\t\
               number of submissions from phenotyping\tsomatic clinical impact values submitted\t\
               somatic oncogenicity values submitted\n\
               Example Lab\t500139\tclinic\t1 Main St\tBoston\tUSA\t1432\tJun 26, 2025\t\
               criteria provided\tclinical testing, research\tnovel\tPathogenic, Benign\t\
               1200\t232\t\tn/a\t0\t\t\n";

    let config = tables::submitter_organization();
    let batch = normalize_tsv(tsv, &config).unwrap();

    assert_eq!(batch.get(0, "id"), Some(&Value::Text("500139".to_string())));
    assert_eq!(
        batch.get(0, "number_of_clinvar_submissions"),
        Some(&Value::Integer(1432))
    );
    assert_eq!(
        batch.get(0, "date_last_submitted"),
        Some(&Value::Date(NaiveDate::from_ymd_opt(2025, 6, 26).unwrap()))
    );
    assert_eq!(
        batch.get(0, "collection_methods"),
        Some(&Value::Array(vec![
            Value::Text("clinical testing".to_string()),
            Value::Text("research".to_string()),
        ]))
    );

    // Empty INTEGER cell and unparseable "n/a" both degrade to null.
    assert_eq!(
        batch.get(0, "number_of_submissions_from_literature_only"),
        Some(&Value::Null)
    );
    assert_eq!(
        batch.get(0, "number_of_submissions_from_curation"),
        Some(&Value::Null)
    );
    assert_eq!(
        batch.get(0, "number_of_submissions_from_phenotyping"),
        Some(&Value::Integer(0))
    );
}

#[test]
fn hp_dump_to_batch() {
    let json = r#"{
        "graphs": [{
            "nodes": [
                {"id": "http://purl.obolibrary.org/obo/HP_0000118", "lbl": "Phenotypic abnormality"},
                {"id": "http://purl.obolibrary.org/obo/MONDO_0005015", "lbl": "diabetes mellitus"}
            ]
        }]
    }"#;

    let rows = extract_ontology_nodes(json, Ontology::Hp).unwrap();
    let batch = ontology_batch(rows, Ontology::Hp).unwrap();

    assert_eq!(batch.config.table, "hpo_terms");
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.get(0, "id"), Some(&Value::Text("HP:0000118".to_string())));
}
