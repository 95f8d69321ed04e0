// Warehouse loading and analytics execution
//
// Uses batched inserts (500-row chunks) so a full drop-file load stays well
// under the PostgreSQL parameter limit (65,535) while keeping round trips low.
// Each load runs truncate + insert in a single transaction, so readers either
// see the previous snapshot or the new one, never an empty table.

use crate::error::{AppError, AppResult};
use gvw_ingest::{Batch, ColumnType, TableConfig, Value};
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

use crate::config::WarehouseConfig;

/// Rows per INSERT statement.
const CHUNK_SIZE: usize = 500;

/// SQL column shape for a warehouse column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SqlKind {
    Text,
    BigInt,
    Date,
    TextArray,
    BigIntArray,
    DateArray,
    Jsonb,
}

impl SqlKind {
    fn sql_type(self) -> &'static str {
        match self {
            SqlKind::Text => "TEXT",
            SqlKind::BigInt => "BIGINT",
            SqlKind::Date => "DATE",
            SqlKind::TextArray => "TEXT[]",
            SqlKind::BigIntArray => "BIGINT[]",
            SqlKind::DateArray => "DATE[]",
            SqlKind::Jsonb => "JSONB",
        }
    }
}

/// Warehouse handle: a Postgres pool plus the dataset (schema) that ingested
/// tables and analytics views live in.
#[derive(Clone)]
pub struct Warehouse {
    pool: PgPool,
    dataset: String,
}

impl Warehouse {
    pub async fn connect(config: &WarehouseConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await?;

        info!("Connected to warehouse (dataset: {})", config.dataset);

        Ok(Self {
            pool,
            dataset: config.dataset.clone(),
        })
    }

    pub fn from_pool(pool: PgPool, dataset: impl Into<String>) -> Self {
        Self {
            pool,
            dataset: dataset.into(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Replace the full contents of a table with the rows of a batch.
    ///
    /// The target table is created on first load. Truncate and insert run in
    /// one transaction; a failed load leaves the previous contents intact.
    #[instrument(skip(self, batch), fields(table = %batch.config.table, rows = batch.len()))]
    pub async fn load_truncate(&self, batch: &Batch) -> AppResult<usize> {
        let table = qualified_table(&self.dataset, &batch.config.table)?;
        for column in &batch.columns {
            check_identifier(column)?;
        }

        let kinds = column_kinds(batch);

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", self.dataset))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&create_table_sql(&table, &batch.columns, &kinds))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!("TRUNCATE TABLE {}", table))
            .execute(&mut *tx)
            .await?;

        let column_list = batch.columns.join(", ");
        for chunk in batch.rows.chunks(CHUNK_SIZE) {
            let mut query_builder: QueryBuilder<Postgres> =
                QueryBuilder::new(format!("INSERT INTO {} ({}) ", table, column_list));

            query_builder.push_values(chunk.iter(), |mut b, row| {
                for (value, kind) in row.iter().zip(kinds.iter()) {
                    push_value(&mut b, value, *kind);
                }
            });

            query_builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        info!("Loaded {} rows into {}", batch.len(), table);

        Ok(batch.len())
    }

    /// Run one analytics script and report how long it took.
    ///
    /// Scripts may contain multiple statements, so they go through the simple
    /// query protocol rather than a prepared statement.
    #[instrument(skip(self, sql))]
    pub async fn execute_script(&self, sql: &str) -> AppResult<Duration> {
        let started = Instant::now();
        sqlx::raw_sql(sql).execute(&self.pool).await?;
        let elapsed = started.elapsed();
        debug!("Script finished in {:.2}s", elapsed.as_secs_f64());
        Ok(elapsed)
    }

    /// Count release months present in the submission data but absent from
    /// the monthly snapshot table. Zero means analytics are already current.
    pub async fn fetch_new_month_count(&self) -> AppResult<i64> {
        let sql = format!(
            "SELECT COUNT(DISTINCT date_trunc('month', release_date)) \
             FROM {dataset}.clinvar_submissions \
             WHERE release_date >= DATE '2023-01-01' \
               AND date_trunc('month', release_date) > COALESCE( \
                 (SELECT MAX(date_trunc('month', snapshot_release_date)) \
                  FROM {dataset}.monthly_conflict_snapshots), \
                 DATE '2022-12-01')",
            dataset = self.dataset
        );

        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}

/// Reject anything that is not a plain lowercase SQL identifier. Table and
/// column names come from trusted config, but they still end up interpolated
/// into DDL, so the gate is hard.
fn check_identifier(name: &str) -> AppResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) => {
            (c.is_ascii_lowercase() || c == '_')
                && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        },
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AppError::Internal(format!(
            "invalid SQL identifier: {:?}",
            name
        )))
    }
}

fn qualified_table(dataset: &str, table: &str) -> AppResult<String> {
    check_identifier(dataset)?;
    check_identifier(table)?;
    Ok(format!("{}.{}", dataset, table))
}

fn create_table_sql(table: &str, columns: &[String], kinds: &[SqlKind]) -> String {
    let defs: Vec<String> = columns
        .iter()
        .zip(kinds.iter())
        .map(|(name, kind)| format!("{} {}", name, kind.sql_type()))
        .collect();
    format!("CREATE TABLE IF NOT EXISTS {} ({})", table, defs.join(", "))
}

/// Resolve the SQL shape of every batch column. Declared schema wins; columns
/// without one (extra TSV columns, ontology payloads) are inferred from the
/// first non-null value, defaulting to TEXT.
fn column_kinds(batch: &Batch) -> Vec<SqlKind> {
    batch
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| declared_kind(&batch.config, name).unwrap_or_else(|| infer_kind(batch, idx)))
        .collect()
}

fn declared_kind(config: &TableConfig, name: &str) -> Option<SqlKind> {
    if name == "id" {
        return Some(SqlKind::Text);
    }
    let column = config.column(name)?;
    Some(match (column.repeated, column.column_type) {
        (false, ColumnType::String) => SqlKind::Text,
        (false, ColumnType::Integer) => SqlKind::BigInt,
        (false, ColumnType::Date) => SqlKind::Date,
        (true, ColumnType::String) => SqlKind::TextArray,
        (true, ColumnType::Integer) => SqlKind::BigIntArray,
        (true, ColumnType::Date) => SqlKind::DateArray,
    })
}

fn infer_kind(batch: &Batch, idx: usize) -> SqlKind {
    for row in &batch.rows {
        match row.get(idx) {
            Some(Value::Null) | None => continue,
            Some(Value::Text(_)) => return SqlKind::Text,
            Some(Value::Integer(_)) => return SqlKind::BigInt,
            Some(Value::Date(_)) => return SqlKind::Date,
            Some(Value::Array(_)) => return SqlKind::TextArray,
            Some(Value::Json(_)) => return SqlKind::Jsonb,
        }
    }
    SqlKind::Text
}

fn push_value(
    b: &mut sqlx::query_builder::Separated<'_, '_, Postgres, &'static str>,
    value: &Value,
    kind: SqlKind,
) {
    match value {
        Value::Null => match kind {
            SqlKind::BigInt => {
                b.push_bind(None::<i64>);
            },
            SqlKind::Date => {
                b.push_bind(None::<chrono::NaiveDate>);
            },
            SqlKind::TextArray => {
                b.push_bind(None::<Vec<String>>);
            },
            SqlKind::BigIntArray => {
                b.push_bind(None::<Vec<i64>>);
            },
            SqlKind::DateArray => {
                b.push_bind(None::<Vec<chrono::NaiveDate>>);
            },
            SqlKind::Jsonb => {
                b.push_bind(None::<serde_json::Value>);
            },
            SqlKind::Text => {
                b.push_bind(None::<String>);
            },
        },
        Value::Text(s) => {
            b.push_bind(s.clone());
        },
        Value::Integer(i) => {
            b.push_bind(*i);
        },
        Value::Date(d) => {
            b.push_bind(*d);
        },
        Value::Array(items) => match kind {
            SqlKind::BigIntArray => {
                let values: Vec<Option<i64>> = items
                    .iter()
                    .map(|v| match v {
                        Value::Integer(i) => Some(*i),
                        _ => None,
                    })
                    .collect();
                b.push_bind(values);
            },
            SqlKind::DateArray => {
                let values: Vec<Option<chrono::NaiveDate>> = items
                    .iter()
                    .map(|v| match v {
                        Value::Date(d) => Some(*d),
                        _ => None,
                    })
                    .collect();
                b.push_bind(values);
            },
            _ => {
                let values: Vec<Option<String>> = items
                    .iter()
                    .map(|v| match v {
                        Value::Text(s) => Some(s.clone()),
                        Value::Integer(i) => Some(i.to_string()),
                        Value::Date(d) => Some(d.to_string()),
                        _ => None,
                    })
                    .collect();
                b.push_bind(values);
            },
        },
        Value::Json(v) => {
            b.push_bind(v.clone());
        },
    }
}
