pub mod connection;
pub mod error;
pub mod migration;
pub mod swap;

pub use error::StoreError;
pub use swap::SwapStore;

/// Column layout shared by the `pending`, `swap` and `deleted` tables.
pub const SWAP_COLUMNS: &str = "id, txid, pairID, rpcMethod, swapServer, chain, timestamp";
