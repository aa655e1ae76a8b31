#[cfg(test)]
mod tests {
    use crate::db::StoreError;
    use crate::models::{Table, WriteOutcome};
    use crate::service::retry::{try_do_times, RETRY_DB_COUNT};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    fn duplicate() -> StoreError {
        StoreError::DuplicateKey {
            table: Table::Pending,
            id: "0xaaa".to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_key_counts_as_success() {
        let attempts = AtomicUsize::new(0);

        let outcome = try_do_times("dup", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(duplicate()) }
        })
        .await
        .unwrap();

        assert_eq!(outcome, WriteOutcome::AlreadyPresent);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_success_returns_immediately() {
        let attempts = AtomicUsize::new(0);

        let outcome = try_do_times("ok", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .await
        .unwrap();

        assert_eq!(outcome, WriteOutcome::Written);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_error_is_surfaced_after_all_attempts() {
        let attempts = AtomicUsize::new(0);
        let started = Instant::now();

        let err = try_do_times("flaky", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(StoreError::Database(sqlx::Error::PoolTimedOut)) }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, StoreError::Database(sqlx::Error::PoolTimedOut)));
        assert_eq!(attempts.load(Ordering::SeqCst), RETRY_DB_COUNT);
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_recovers_after_transient_error() {
        let attempts = AtomicUsize::new(0);

        let outcome = try_do_times("recover", || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(StoreError::Database(sqlx::Error::PoolTimedOut))
                } else {
                    Ok(())
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(outcome, WriteOutcome::Written);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_out_of_range_timestamp_is_not_retried() {
        let attempts = AtomicUsize::new(0);

        let err = try_do_times("stamp", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async {
                Err(StoreError::TimestampOutOfRange {
                    id: "0xaaa".to_string(),
                    value: i128::from(u64::MAX),
                })
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, StoreError::TimestampOutOfRange { .. }));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
