#[cfg(test)]
mod tests {
    use crate::models::{SwapEvent, SwapFilter, Table, WriteOutcome};
    use crate::service::ledger::now_unix;
    use crate::db::{connection, SwapStore};
    use crate::service::{LedgerError, SwapLedger};
    use crate::tests::{setup_ledger, test_record};

    #[tokio::test]
    async fn test_add_pending_twice_without_overwrite_fails() {
        let ledger = setup_ledger().await;
        let record = test_record("0xaaa", "eth");

        let first = ledger.add_pending(&record, false).await.unwrap();
        assert_eq!(first, WriteOutcome::Written);

        let err = ledger.add_pending(&record, false).await.unwrap_err();
        assert!(err.is_duplicate_key());
    }

    #[tokio::test]
    async fn test_add_pending_with_overwrite_keeps_latest_values() {
        let ledger = setup_ledger().await;
        let mut record = test_record("0xaaa", "eth");
        ledger.add_pending(&record, false).await.unwrap();

        record.timestamp += 60;
        record.rpc_method = "swap.Swapout".to_string();
        let outcome = ledger.add_pending(&record, true).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Written);

        let pending = ledger.list_pending("eth").await.unwrap();
        assert_eq!(pending, vec![record]);
    }

    #[tokio::test]
    async fn test_add_confirmed_and_deleted_use_their_tables() {
        let ledger = setup_ledger().await;
        let record = test_record("0xaaa", "eth");

        ledger.add_confirmed(&record, false).await.unwrap();
        ledger.add_deleted(&record, false).await.unwrap();
        assert!(ledger.add_confirmed(&record, false).await.unwrap_err().is_duplicate_key());
        assert_eq!(ledger.add_deleted(&record, true).await.unwrap(), WriteOutcome::Written);

        let store = ledger.store();
        assert_eq!(store.count(Table::Pending, &SwapFilter::all()).await.unwrap(), 0);
        assert_eq!(store.count(Table::Confirmed, &SwapFilter::all()).await.unwrap(), 1);
        assert_eq!(store.count(Table::Deleted, &SwapFilter::all()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_confirm_moves_record_and_stamps_time() {
        let ledger = setup_ledger().await;
        let record = test_record("0xaaa", "eth");
        ledger.add_pending(&record, false).await.unwrap();

        let before = now_unix();
        let outcome = ledger.confirm(&record).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Written);

        let confirmed = ledger
            .store()
            .find_one(Table::Confirmed, &SwapFilter::by_id("0xaaa"))
            .await
            .unwrap()
            .expect("confirmed record");
        assert!(confirmed.timestamp >= before);
        assert_eq!(confirmed.txid, record.txid);
        assert_eq!(confirmed.pair_id, record.pair_id);
        assert!(ledger.list_pending("eth").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_is_idempotent() {
        let ledger = setup_ledger().await;
        let record = test_record("0xaaa", "eth");
        ledger.add_pending(&record, false).await.unwrap();

        ledger.confirm(&record).await.unwrap();
        let second = ledger.confirm(&record).await.unwrap();
        assert_eq!(second, WriteOutcome::AlreadyPresent);

        let store = ledger.store();
        let filter = SwapFilter::by_id("0xaaa");
        assert_eq!(store.count(Table::Confirmed, &filter).await.unwrap(), 1);
        assert_eq!(store.count(Table::Pending, &filter).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_confirm_without_pending_copy_still_confirms() {
        let ledger = setup_ledger().await;
        let record = test_record("0xaaa", "eth");

        ledger.confirm(&record).await.unwrap();

        let filter = SwapFilter::by_id("0xaaa");
        assert_eq!(ledger.store().count(Table::Confirmed, &filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_terminates_record() {
        let ledger = setup_ledger().await;
        let record = test_record("0xaaa", "eth");
        ledger.add_pending(&record, false).await.unwrap();

        ledger.delete(&record).await.unwrap();
        // deleting again is harmless
        ledger.delete(&record).await.unwrap();

        assert!(ledger.is_deleted("0xaaa").await.unwrap());
        assert!(ledger.list_pending("eth").await.unwrap().is_empty());

        let err = ledger.confirm(&record).await.unwrap_err();
        assert!(matches!(err, LedgerError::Terminated(ref id) if id == "0xaaa"));

        let filter = SwapFilter::by_id("0xaaa");
        assert_eq!(ledger.store().count(Table::Confirmed, &filter).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_remove_pending_reports_absence() {
        let ledger = setup_ledger().await;
        let record = test_record("0xaaa", "eth");

        assert!(!ledger.remove_pending(&record).await.unwrap());
        ledger.add_pending(&record, false).await.unwrap();
        assert!(ledger.remove_pending(&record).await.unwrap());
        assert!(!ledger.remove_pending(&record).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_pending_filters_by_chain_and_returns_copies() {
        let ledger = setup_ledger().await;
        ledger.add_pending(&test_record("0x1", "eth"), false).await.unwrap();
        ledger.add_pending(&test_record("0x2", "bsc"), false).await.unwrap();
        ledger.add_pending(&test_record("0x3", "eth"), false).await.unwrap();

        let mut pending = ledger.list_pending("eth").await.unwrap();
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|r| r.chain == "eth"));

        for record in &mut pending {
            record.chain = "mutated".to_string();
            record.timestamp = 0;
        }

        let again = ledger.list_pending("eth").await.unwrap();
        assert_eq!(again.len(), 2);
        assert!(again.iter().all(|r| r.chain == "eth" && r.timestamp == 1_600_000_000));
        assert!(ledger.list_pending("mutated").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_observed_keys_by_txid() {
        let ledger = setup_ledger().await;
        let event = SwapEvent {
            txid: "0xfeed".to_string(),
            pair_id: "USDC".to_string(),
            rpc_method: "swap.Swapout".to_string(),
            swap_server: "server-9".to_string(),
            chain: "fantom".to_string(),
            timestamp: 42,
        };

        ledger.record_observed(&event, false).await.unwrap();
        // re-scan after a reorg
        ledger.record_observed(&event, true).await.unwrap();

        let found = ledger.find_pending("0xfeed").await.unwrap().expect("pending swap");
        assert_eq!(found.id, "0xfeed");
        assert_eq!(found.swap_server, "server-9");
        assert_eq!(found.timestamp, 42);
        assert_eq!(ledger.find_pending("0xother").await.unwrap(), None);
    }

    fn observed(txid: &str) -> SwapEvent {
        SwapEvent {
            txid: txid.to_string(),
            pair_id: "FXSv4".to_string(),
            rpc_method: "swap.Swapin".to_string(),
            swap_server: "server-1".to_string(),
            chain: "eth".to_string(),
            timestamp: 1_600_000_000,
        }
    }

    #[tokio::test]
    async fn test_record_observed_refuses_deleted_swap() {
        let ledger = setup_ledger().await;
        let event = observed("0xaaa");
        ledger.record_observed(&event, false).await.unwrap();

        let record = ledger.find_pending("0xaaa").await.unwrap().expect("pending swap");
        ledger.delete(&record).await.unwrap();

        let err = ledger.record_observed(&event, true).await.unwrap_err();
        assert!(matches!(err, LedgerError::Terminated(ref id) if id == "0xaaa"));
        assert!(ledger.list_pending("eth").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_observed_refuses_confirmed_swap() {
        let ledger = setup_ledger().await;
        let event = observed("0xaaa");
        ledger.record_observed(&event, false).await.unwrap();

        let record = ledger.find_pending("0xaaa").await.unwrap().expect("pending swap");
        ledger.confirm(&record).await.unwrap();

        let err = ledger.record_observed(&event, true).await.unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyConfirmed(ref id) if id == "0xaaa"));

        let store = ledger.store();
        let filter = SwapFilter::by_id("0xaaa");
        assert_eq!(store.count(Table::Pending, &filter).await.unwrap(), 0);
        assert_eq!(store.count(Table::Confirmed, &filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_after_confirm_is_refused() {
        let ledger = setup_ledger().await;
        let record = test_record("0xaaa", "eth");
        ledger.add_pending(&record, false).await.unwrap();
        ledger.confirm(&record).await.unwrap();

        let err = ledger.delete(&record).await.unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyConfirmed(ref id) if id == "0xaaa"));

        let store = ledger.store();
        let filter = SwapFilter::by_id("0xaaa");
        assert_eq!(store.count(Table::Deleted, &filter).await.unwrap(), 0);
        assert_eq!(store.count(Table::Confirmed, &filter).await.unwrap(), 1);
        assert!(!ledger.is_deleted("0xaaa").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_confirms_leave_one_confirmed_row() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let url = format!("sqlite:{}", dir.path().join("ledger.db").display());
        let pool = connection::establish_connection(&url, 4)
            .await
            .expect("Failed to open file database");
        let ledger = SwapLedger::new(SwapStore::new(pool));

        let record = test_record("0xaaa", "eth");
        ledger.add_pending(&record, false).await.unwrap();

        let (first, second) = tokio::join!(ledger.confirm(&record), ledger.confirm(&record));
        let mut outcomes = vec![first.unwrap(), second.unwrap()];
        outcomes.sort_by_key(|o| *o != WriteOutcome::Written);
        assert_eq!(outcomes, vec![WriteOutcome::Written, WriteOutcome::AlreadyPresent]);

        let store = ledger.store();
        let filter = SwapFilter::by_id("0xaaa");
        assert_eq!(store.count(Table::Confirmed, &filter).await.unwrap(), 1);
        assert_eq!(store.count(Table::Pending, &filter).await.unwrap(), 0);
    }
}
