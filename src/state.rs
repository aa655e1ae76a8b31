use crate::config::ConfigHandle;
use crate::service::SwapLedger;
use std::sync::Arc;

pub struct AppState {
    pub config: Arc<ConfigHandle>,
    /// `None` when the database section is disabled.
    pub ledger: Option<SwapLedger>,
}
