use crate::models::Table;
use sqlx::SqlitePool;
use tracing::info;

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("Running database migrations...");

    for table in Table::ALL {
        let name = table.name();

        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {name} (
                id TEXT PRIMARY KEY,
                txid TEXT NOT NULL,
                pairID TEXT NOT NULL,
                rpcMethod TEXT NOT NULL,
                swapServer TEXT NOT NULL,
                chain TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            )"
        ))
        .execute(pool)
        .await?;

        // txid lookups and the per-chain pending scan
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{name}_txid ON {name}(txid)"
        ))
        .execute(pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{name}_chain ON {name}(chain)"
        ))
        .execute(pool)
        .await?;
    }

    info!("Database migrations completed successfully");
    Ok(())
}
