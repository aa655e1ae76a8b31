pub mod config;
pub mod db;
pub mod models;
pub mod service;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience
pub use config::{ConfigError, ConfigHandle, ScanConfig, TokenConfig, TxType};
pub use db::connection;
pub use db::{StoreError, SwapStore};
pub use models::{SwapEvent, SwapFilter, SwapRecord, Table, WriteOutcome};
pub use service::{try_do_times, LedgerError, SwapLedger};
pub use validation::{is_hex_address, validate_big_uint, validate_hex_address, ValidationError};
