pub mod ledger;
pub mod retry;

pub use ledger::{LedgerError, SwapLedger};
pub use retry::try_do_times;
