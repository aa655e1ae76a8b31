use crate::db::StoreError;
use crate::models::WriteOutcome;
use backon::{ConstantBuilder, Retryable};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

pub const RETRY_DB_COUNT: usize = 3;
pub const RETRY_DB_INTERVAL: Duration = Duration::from_secs(1);

/// Run a store write up to [`RETRY_DB_COUNT`] times, pausing
/// [`RETRY_DB_INTERVAL`] after each failure.
///
/// A duplicate key stops the loop and is reported as
/// [`WriteOutcome::AlreadyPresent`]. Driver errors are retried and the last
/// one is returned once the attempts run out; anything else fails at once.
pub async fn try_do_times<F, Fut>(name: &str, op: F) -> Result<WriteOutcome, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), StoreError>>,
{
    let backoff = ConstantBuilder::default()
        .with_delay(RETRY_DB_INTERVAL)
        .with_max_times(RETRY_DB_COUNT - 1);

    let result = op
        .retry(backoff)
        .when(|e: &StoreError| e.is_retryable())
        .notify(|e: &StoreError, dur: Duration| {
            debug!(name, err = %e, "[store] retrying in {:?}", dur);
        })
        .await;

    match result {
        Ok(()) => Ok(WriteOutcome::Written),
        Err(e) if e.is_duplicate_key() => Ok(WriteOutcome::AlreadyPresent),
        Err(e) if !e.is_retryable() => Err(e),
        Err(e) => {
            warn!(name, times = RETRY_DB_COUNT, err = %e, "[store] giving up after retries");
            Err(e)
        }
    }
}
