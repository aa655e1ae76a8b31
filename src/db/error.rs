use crate::models::Table;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("duplicate key {id} in table {table}")]
    DuplicateKey { table: Table, id: String },

    #[error("record {id} not found in table {table}")]
    NotFound { table: Table, id: String },

    #[error("timestamp {value} of {id} is outside the storable range")]
    TimestampOutOfRange { id: String, value: i128 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Only driver failures can go away on their own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Database(_))
    }

    /// Classify a driver error raised while writing `id` into `table`.
    pub fn from_write(table: Table, id: &str, err: sqlx::Error) -> Self {
        let duplicate = matches!(
            &err,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation()
        );

        if duplicate {
            StoreError::DuplicateKey {
                table,
                id: id.to_string(),
            }
        } else {
            StoreError::Database(err)
        }
    }
}
