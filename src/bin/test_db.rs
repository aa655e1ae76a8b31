use swap_ledger::db::connection;
use swap_ledger::models::{SwapEvent, Table};
use swap_ledger::{SwapFilter, SwapLedger, SwapStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up database connection
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:smoke.db".to_string());
    println!("Establishing database connection to {}...", database_url);
    let pool = connection::establish_connection(&database_url, 1).await?;
    println!("✅ Database connection established!");

    let ledger = SwapLedger::new(SwapStore::new(pool));

    // Observe a test swap
    let event = SwapEvent {
        txid: format!("0xsmoke{}", chrono::Utc::now().timestamp()),
        pair_id: "FXSv4".to_string(),
        rpc_method: "swap.Swapin".to_string(),
        swap_server: "smoke-server".to_string(),
        chain: "smoke".to_string(),
        timestamp: chrono::Utc::now().timestamp() as u64,
    };

    println!("Adding pending swap {}...", event.txid);
    ledger.record_observed(&event, false).await?;
    println!("✅ Pending swap added!");

    let pending = ledger.list_pending(&event.chain).await?;
    println!("Found {} pending swaps on chain {}", pending.len(), event.chain);

    for record in pending {
        let outcome = ledger.confirm(&record).await?;
        println!("Confirmed {} ({:?})", record.id, outcome);
    }

    let confirmed = ledger
        .store()
        .count(Table::Confirmed, &SwapFilter::by_chain(&event.chain))
        .await?;
    println!("✅ Count check: {} confirmed swaps on chain {}", confirmed, event.chain);

    println!("All checks completed successfully!");
    Ok(())
}
