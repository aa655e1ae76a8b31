// Moves swap records between the pending, swap and deleted tables.

use crate::db::{StoreError, SwapStore};
use crate::models::{SwapEvent, SwapFilter, SwapRecord, Table, WriteOutcome};
use crate::service::retry::try_do_times;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("swap {0} is already deleted")]
    Terminated(String),

    #[error("swap {0} is already confirmed")]
    AlreadyConfirmed(String),
}

impl LedgerError {
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, LedgerError::Store(e) if e.is_duplicate_key())
    }
}

/// Lifecycle of a swap record: `pending -> swap` or `pending -> deleted`.
///
/// A transition is a remove from `pending` followed by a write into the
/// target table. The two steps are not atomic; a record lost between them is
/// recovered by re-observing the swap with `overwrite = true`.
#[derive(Debug, Clone)]
pub struct SwapLedger {
    store: SwapStore,
}

impl SwapLedger {
    pub fn new(store: SwapStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SwapStore {
        &self.store
    }

    pub async fn add_pending(
        &self,
        record: &SwapRecord,
        overwrite: bool,
    ) -> Result<WriteOutcome, LedgerError> {
        self.add(Table::Pending, record, overwrite).await
    }

    pub async fn add_confirmed(
        &self,
        record: &SwapRecord,
        overwrite: bool,
    ) -> Result<WriteOutcome, LedgerError> {
        self.add(Table::Confirmed, record, overwrite).await
    }

    pub async fn add_deleted(
        &self,
        record: &SwapRecord,
        overwrite: bool,
    ) -> Result<WriteOutcome, LedgerError> {
        self.add(Table::Deleted, record, overwrite).await
    }

    /// Record a freshly observed swap as pending. Swaps that already reached
    /// the swap or deleted table are refused.
    pub async fn record_observed(
        &self,
        event: &SwapEvent,
        overwrite: bool,
    ) -> Result<WriteOutcome, LedgerError> {
        let record = SwapRecord::from_event(event);
        self.ensure_not_deleted(&record).await?;
        self.ensure_not_confirmed(&record).await?;

        self.add_pending(&record, overwrite).await
    }

    /// Returns `false` when the record was not pending.
    pub async fn remove_pending(&self, record: &SwapRecord) -> Result<bool, LedgerError> {
        match self.store.remove(Table::Pending, record).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Move a pending swap into the confirmed table with a fresh timestamp.
    ///
    /// Calling this again for the same id leaves exactly one confirmed row.
    pub async fn confirm(&self, record: &SwapRecord) -> Result<WriteOutcome, LedgerError> {
        self.ensure_not_deleted(record).await?;
        self.release_pending(record).await;

        let mut confirmed = record.clone();
        confirmed.timestamp = now_unix();

        let store = &self.store;
        let confirmed = &confirmed;
        let outcome = try_do_times("confirm", move || async move {
            store.insert(Table::Confirmed, confirmed).await
        })
        .await?;

        info!(id = %record.id, chain = %record.chain, ?outcome, "swap confirmed");
        Ok(outcome)
    }

    /// Abandon a pending swap. Deleted records are never processed again.
    pub async fn delete(&self, record: &SwapRecord) -> Result<WriteOutcome, LedgerError> {
        self.ensure_not_confirmed(record).await?;
        self.release_pending(record).await;

        let mut deleted = record.clone();
        deleted.timestamp = now_unix();

        let outcome = self.add(Table::Deleted, &deleted, true).await?;
        info!(id = %record.id, chain = %record.chain, "swap deleted");
        Ok(outcome)
    }

    pub async fn list_pending(&self, chain: &str) -> Result<Vec<SwapRecord>, LedgerError> {
        let records = self
            .store
            .find_all(Table::Pending, &SwapFilter::by_chain(chain))
            .await?;

        debug!(chain, count = records.len(), "listed pending swaps");
        Ok(records)
    }

    pub async fn find_pending(&self, txid: &str) -> Result<Option<SwapRecord>, LedgerError> {
        Ok(self
            .store
            .find_one(Table::Pending, &SwapFilter::by_txid(txid))
            .await?)
    }

    pub async fn is_deleted(&self, id: &str) -> Result<bool, LedgerError> {
        Ok(self
            .store
            .find_one(Table::Deleted, &SwapFilter::by_id(id))
            .await?
            .is_some())
    }

    pub async fn is_confirmed(&self, id: &str) -> Result<bool, LedgerError> {
        Ok(self
            .store
            .find_one(Table::Confirmed, &SwapFilter::by_id(id))
            .await?
            .is_some())
    }

    async fn add(
        &self,
        table: Table,
        record: &SwapRecord,
        overwrite: bool,
    ) -> Result<WriteOutcome, LedgerError> {
        let store = &self.store;
        let name = format!("add {}", table);

        let outcome = try_do_times(&name, move || async move {
            if overwrite {
                store.upsert(table, &record.id, record).await
            } else {
                store.insert(table, record).await
            }
        })
        .await?;

        // Plain inserts report an existing key to the caller.
        if outcome == WriteOutcome::AlreadyPresent && !overwrite {
            return Err(StoreError::DuplicateKey {
                table,
                id: record.id.clone(),
            }
            .into());
        }

        Ok(outcome)
    }

    async fn ensure_not_deleted(&self, record: &SwapRecord) -> Result<(), LedgerError> {
        if self.is_deleted(&record.id).await? {
            warn!(id = %record.id, "refusing to reprocess a deleted swap");
            return Err(LedgerError::Terminated(record.id.clone()));
        }
        Ok(())
    }

    async fn ensure_not_confirmed(&self, record: &SwapRecord) -> Result<(), LedgerError> {
        if self.is_confirmed(&record.id).await? {
            warn!(id = %record.id, "refusing to reprocess a confirmed swap");
            return Err(LedgerError::AlreadyConfirmed(record.id.clone()));
        }
        Ok(())
    }

    /// Best-effort removal from pending; the store already logged any failure.
    async fn release_pending(&self, record: &SwapRecord) {
        if let Err(e) = self.remove_pending(record).await {
            debug!(id = %record.id, err = %e, "pending removal skipped");
        }
    }
}

pub fn now_unix() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}
