// Swap record rows, table handles and query filters

use serde::{Deserialize, Serialize};
use std::fmt;

/// One observed swap transaction. `id` equals `txid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRecord {
    pub id: String,
    pub txid: String,
    #[serde(rename = "pairID")]
    pub pair_id: String,
    #[serde(rename = "rpcMethod")]
    pub rpc_method: String,
    #[serde(rename = "swapServer")]
    pub swap_server: String,
    pub chain: String,
    pub timestamp: u64,
}

impl SwapRecord {
    pub fn from_event(event: &SwapEvent) -> Self {
        Self {
            id: event.txid.clone(),
            txid: event.txid.clone(),
            pair_id: event.pair_id.clone(),
            rpc_method: event.rpc_method.clone(),
            swap_server: event.swap_server.clone(),
            chain: event.chain.clone(),
            timestamp: event.timestamp,
        }
    }
}

/// A swap observed on chain, as handed over by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapEvent {
    pub txid: String,
    pub pair_id: String,
    pub rpc_method: String,
    pub swap_server: String,
    pub chain: String,
    pub timestamp: u64,
}

/// The three storage locations a swap record moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Pending,
    Confirmed,
    Deleted,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Pending, Table::Confirmed, Table::Deleted];

    /// Physical table name
    pub fn name(&self) -> &'static str {
        match self {
            Table::Pending => "pending",
            Table::Confirmed => "swap",
            Table::Deleted => "deleted",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Equality filter over record columns. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapFilter {
    pub id: Option<String>,
    pub txid: Option<String>,
    pub pair_id: Option<String>,
    pub rpc_method: Option<String>,
    pub swap_server: Option<String>,
    pub chain: Option<String>,
}

impl SwapFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Self::default()
        }
    }

    pub fn by_txid(txid: &str) -> Self {
        Self {
            txid: Some(txid.to_string()),
            ..Self::default()
        }
    }

    pub fn by_chain(chain: &str) -> Self {
        Self {
            chain: Some(chain.to_string()),
            ..Self::default()
        }
    }

    /// Column/value pairs that take part in the WHERE clause.
    pub fn conditions(&self) -> Vec<(&'static str, &str)> {
        let columns = [
            ("id", &self.id),
            ("txid", &self.txid),
            ("pairID", &self.pair_id),
            ("rpcMethod", &self.rpc_method),
            ("swapServer", &self.swap_server),
            ("chain", &self.chain),
        ];
        columns
            .into_iter()
            .filter_map(|(column, value)| value.as_deref().map(|v| (column, v)))
            .collect()
    }
}

/// How a write through the retry wrapper ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The write was applied.
    Written,
    /// The key already existed; nothing was changed.
    AlreadyPresent,
}
