//! PostgreSQL store.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::{debug, instrument};

use super::{MeasurementStore, StoredRow};
use crate::config::{validate_table_name, StoreConfig};
use crate::normalize::{NewRow, ROW_COLUMNS};
use crate::{ConfigResult, StoreError, StoreResult};

/// Writes batches with one multi-row `INSERT ... RETURNING` inside a transaction.
///
/// The pool is created once at startup and shared by every request. A connection is held only
/// for the duration of one insert and goes back to the pool when the transaction is dropped,
/// whether it committed or not.
#[derive(Clone, Debug)]
pub struct PgMeasurementStore {
    pool: PgPool,
    table: String,
}

impl PgMeasurementStore {
    /// Wraps an existing pool. `table` must be a plain identifier.
    pub fn new(pool: PgPool, table: impl Into<String>) -> ConfigResult<Self> {
        let table = table.into();
        validate_table_name(&table)?;
        Ok(Self { pool, table })
    }

    /// Opens a pool with the configured bounds.
    ///
    /// The first connection is established eagerly so a bad URL fails at startup.
    #[instrument(skip(config), fields(table = %config.table))]
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect(&config.database_url)
            .await
            .map_err(StoreError::Connection)?;

        Ok(Self::new(pool, config.table.clone())?)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Waits for checked-out connections to return, then closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Builds the single bulk insert for `rows`.
///
/// Every value is a bound parameter; only the validated table name is interpolated.
pub(crate) fn build_insert<'a>(table: &str, rows: &'a [NewRow]) -> QueryBuilder<'a, Postgres> {
    let columns = ROW_COLUMNS.join(", ");
    let mut builder = QueryBuilder::new(format!("INSERT INTO {table} ({columns}) "));

    builder.push_values(rows, |mut b, row| {
        b.push_bind(row.kind.as_str())
            .push_bind(row.date.as_str())
            .push_bind(row.sample.as_str())
            .push_bind(row.vzv.as_deref())
            .push_bind(row.hsv_1.as_deref())
            .push_bind(row.hsv_2.as_deref());
    });
    builder.push(format!(" RETURNING id, {columns}"));

    builder
}

fn row_to_stored(row: &PgRow) -> StoreResult<StoredRow> {
    let decode = |e: sqlx::Error| StoreError::Decode(e.to_string());
    let kind: String = row.try_get("type").map_err(decode)?;

    Ok(StoredRow {
        id: row.try_get("id").map_err(decode)?,
        kind: kind.parse()?,
        date: row.try_get("date").map_err(decode)?,
        sample: row.try_get("sample").map_err(decode)?,
        vzv: row.try_get("vzv").map_err(decode)?,
        hsv_1: row.try_get("hsv_1").map_err(decode)?,
        hsv_2: row.try_get("hsv_2").map_err(decode)?,
    })
}

/// Checks that the insert returned exactly one row per submitted row and puts them in
/// input order. Identifiers come from one sequence in VALUES order.
fn ordered_batch(submitted: usize, mut stored: Vec<StoredRow>) -> StoreResult<Vec<StoredRow>> {
    if stored.len() != submitted {
        return Err(StoreError::RowCountMismatch {
            submitted,
            returned: stored.len(),
        });
    }
    stored.sort_by_key(|r| r.id);
    Ok(stored)
}

fn insert_error(e: sqlx::Error) -> StoreError {
    // Constraint violations and other server-side rejections carry a database message.
    if let sqlx::Error::Database(ref db_err) = e {
        return StoreError::Rejected(db_err.message().to_string());
    }
    StoreError::Insert(e)
}

#[async_trait]
impl MeasurementStore for PgMeasurementStore {
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn insert_rows(&self, rows: &[NewRow]) -> StoreResult<Vec<StoredRow>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await.map_err(StoreError::Begin)?;

        let mut builder = build_insert(&self.table, rows);
        let returned = builder
            .build()
            .fetch_all(&mut *tx)
            .await
            .map_err(insert_error)?;

        // Decode and count before committing; an early return drops `tx` and rolls back.
        let stored = returned
            .iter()
            .map(row_to_stored)
            .collect::<StoreResult<Vec<_>>>()
            .and_then(|stored| ordered_batch(rows.len(), stored))?;

        tx.commit().await.map_err(StoreError::Commit)?;

        debug!(inserted = stored.len(), "bulk insert committed");
        Ok(stored)
    }
}
