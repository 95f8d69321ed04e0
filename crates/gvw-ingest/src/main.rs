//! GVW Ingest - local file normalization tool
//!
//! Runs the same normalization the ingest service applies, against a local
//! file, and prints the resulting rows as JSON. Useful for checking a drop
//! file before it lands in the bucket.

use anyhow::{bail, Context, Result};
use clap::Parser;
use gvw_common::logging::{init_logging, LogConfig, LogLevel};
use gvw_ingest::{
    extract_ontology_nodes, normalize_tsv, ontology_batch, tables, Ontology, Value,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "gvw-ingest")]
#[command(author, version, about = "GVW local file normalization tool")]
struct Cli {
    #[command(subcommand)]
    input: Input,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Input {
    /// Normalize a TSV drop file against a named table config
    Tsv {
        /// Path to the TSV file
        #[arg(short, long)]
        file: String,

        /// Destination table name (ncbi_gene, submitter_organization)
        #[arg(short, long)]
        table: String,
    },

    /// Extract term rows from an ontology JSON dump
    Ontology {
        /// Path to the JSON file
        #[arg(short, long)]
        file: String,

        /// Ontology kind (hp, mondo)
        #[arg(short, long)]
        kind: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("gvw-ingest".to_string())
        .build();

    // Environment variables take precedence
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    init_logging(&log_config)?;

    match cli.input {
        Input::Tsv { file, table } => {
            let Some(config) = tables::table_config(&table) else {
                bail!("unknown table '{}'", table);
            };

            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file))?;
            let batch = normalize_tsv(&text, &config)?;

            info!(table = %table, rows = batch.len(), "normalized batch");
            print_batch(&batch.columns, &batch.rows)?;
        },
        Input::Ontology { file, kind } => {
            let ontology = match kind.as_str() {
                "hp" => Ontology::Hp,
                "mondo" => Ontology::Mondo,
                other => bail!("unknown ontology kind '{}'", other),
            };

            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file))?;
            let rows = extract_ontology_nodes(&text, ontology)?;
            let batch = ontology_batch(rows, ontology)?;

            info!(table = %batch.config.table, rows = batch.len(), "extracted batch");
            print_batch(&batch.columns, &batch.rows)?;
        },
    }

    Ok(())
}

/// Print one JSON object per row to stdout.
fn print_batch(columns: &[String], rows: &[Vec<Value>]) -> Result<()> {
    for row in rows {
        let object: serde_json::Map<String, serde_json::Value> = columns
            .iter()
            .cloned()
            .zip(row.iter().map(|v| serde_json::to_value(v).unwrap_or_default()))
            .collect();
        println!("{}", serde_json::Value::Object(object));
    }
    Ok(())
}
