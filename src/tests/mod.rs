mod ledger_tests;
mod retry_tests;

use crate::db::connection;
use crate::models::SwapRecord;
use crate::service::SwapLedger;
use crate::db::SwapStore;

pub(crate) async fn setup_store() -> SwapStore {
    let pool = connection::connect_in_memory()
        .await
        .expect("Failed to open in-memory database");
    SwapStore::new(pool)
}

pub(crate) async fn setup_ledger() -> SwapLedger {
    SwapLedger::new(setup_store().await)
}

pub(crate) fn test_record(txid: &str, chain: &str) -> SwapRecord {
    SwapRecord {
        id: txid.to_string(),
        txid: txid.to_string(),
        pair_id: "FXSv4".to_string(),
        rpc_method: "swap.Swapin".to_string(),
        swap_server: "server-1".to_string(),
        chain: chain.to_string(),
        timestamp: 1_600_000_000,
    }
}
