use crate::db::{StoreError, SWAP_COLUMNS};
use crate::models::{SwapFilter, SwapRecord, Table};
use futures::TryStreamExt;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::{info, warn};

/// Keyed access to the `pending`, `swap` and `deleted` tables.
///
/// Every call is atomic on its own; nothing here spans two tables.
#[derive(Debug, Clone)]
pub struct SwapStore {
    pool: SqlitePool,
}

impl SwapStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Store `record` under its id. Fails with `DuplicateKey` if the id is taken.
    pub async fn insert(&self, table: Table, record: &SwapRecord) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES (?, ?, ?, ?, ?, ?, ?)",
            table.name(),
            SWAP_COLUMNS
        );

        let result = self.execute_write(&sql, table, &record.id, record).await;

        log_mutation("insert", table, record, &result);
        result
    }

    /// Create or replace the row keyed by `id`.
    pub async fn upsert(
        &self,
        table: Table,
        id: &str,
        record: &SwapRecord,
    ) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                txid = excluded.txid,
                pairID = excluded.pairID,
                rpcMethod = excluded.rpcMethod,
                swapServer = excluded.swapServer,
                chain = excluded.chain,
                timestamp = excluded.timestamp",
            table.name(),
            SWAP_COLUMNS
        );

        let result = self.execute_write(&sql, table, id, record).await;

        log_mutation("upsert", table, record, &result);
        result
    }

    /// Delete the row with the record's id. `NotFound` if there was none.
    pub async fn remove(&self, table: Table, record: &SwapRecord) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", table.name());

        let result = match sqlx::query(&sql)
            .bind(&record.id)
            .execute(&self.pool)
            .await
        {
            Ok(done) if done.rows_affected() == 0 => Err(StoreError::NotFound {
                table,
                id: record.id.clone(),
            }),
            Ok(_) => Ok(()),
            Err(e) => Err(StoreError::Database(e)),
        };

        log_mutation("remove", table, record, &result);
        result
    }

    pub async fn find_one(
        &self,
        table: Table,
        filter: &SwapFilter,
    ) -> Result<Option<SwapRecord>, StoreError> {
        let mut builder = select_builder(table, filter);
        builder.push(" LIMIT 1");

        let row = builder.build().fetch_optional(&self.pool).await?;
        row.as_ref().map(decode_record).transpose()
    }

    /// Every matching row, each decoded into its own record as the cursor
    /// advances. The returned records share nothing with the store.
    pub async fn find_all(
        &self,
        table: Table,
        filter: &SwapFilter,
    ) -> Result<Vec<SwapRecord>, StoreError> {
        let mut builder = select_builder(table, filter);
        builder.push(" ORDER BY timestamp ASC, id ASC");

        let query = builder.build();
        let mut rows = query.fetch(&self.pool);
        let mut records = Vec::new();

        while let Some(row) = rows.try_next().await? {
            records.push(decode_record(&row)?);
        }

        Ok(records)
    }

    pub async fn count(&self, table: Table, filter: &SwapFilter) -> Result<i64, StoreError> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT COUNT(*) FROM {}", table.name()));
        push_conditions(&mut builder, filter);

        let count = builder.build().fetch_one(&self.pool).await?.try_get::<i64, _>(0)?;
        Ok(count)
    }

    async fn execute_write(
        &self,
        sql: &str,
        table: Table,
        id: &str,
        record: &SwapRecord,
    ) -> Result<(), StoreError> {
        let timestamp =
            i64::try_from(record.timestamp).map_err(|_| StoreError::TimestampOutOfRange {
                id: id.to_string(),
                value: i128::from(record.timestamp),
            })?;

        bind_record(sqlx::query(sql), id, record, timestamp)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| StoreError::from_write(table, id, e))
    }
}

fn bind_record<'q>(
    query: sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    id: &'q str,
    record: &'q SwapRecord,
    timestamp: i64,
) -> sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    query
        .bind(id)
        .bind(&record.txid)
        .bind(&record.pair_id)
        .bind(&record.rpc_method)
        .bind(&record.swap_server)
        .bind(&record.chain)
        .bind(timestamp)
}

fn select_builder(table: Table, filter: &SwapFilter) -> QueryBuilder<'static, Sqlite> {
    let mut builder =
        QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM {}", SWAP_COLUMNS, table.name()));
    push_conditions(&mut builder, filter);
    builder
}

fn push_conditions(builder: &mut QueryBuilder<'static, Sqlite>, filter: &SwapFilter) {
    for (i, (column, value)) in filter.conditions().into_iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        builder.push(column);
        builder.push(" = ");
        builder.push_bind(value.to_string());
    }
}

fn decode_record(row: &SqliteRow) -> Result<SwapRecord, StoreError> {
    let id: String = row.try_get("id")?;
    let timestamp: i64 = row.try_get("timestamp")?;
    let timestamp = u64::try_from(timestamp).map_err(|_| StoreError::TimestampOutOfRange {
        id: id.clone(),
        value: i128::from(timestamp),
    })?;

    Ok(SwapRecord {
        id,
        txid: row.try_get("txid")?,
        pair_id: row.try_get("pairID")?,
        rpc_method: row.try_get("rpcMethod")?,
        swap_server: row.try_get("swapServer")?,
        chain: row.try_get("chain")?,
        timestamp,
    })
}

fn log_mutation(op: &str, table: Table, record: &SwapRecord, result: &Result<(), StoreError>) {
    match result {
        Ok(()) => info!(
            op,
            %table,
            id = %record.id,
            txid = %record.txid,
            pair_id = %record.pair_id,
            chain = %record.chain,
            "[store] {} success",
            op
        ),
        Err(e) => warn!(
            op,
            %table,
            id = %record.id,
            txid = %record.txid,
            pair_id = %record.pair_id,
            chain = %record.chain,
            err = %e,
            "[store] {} failed",
            op
        ),
    }
}
