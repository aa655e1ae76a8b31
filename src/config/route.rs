//! Swap route definitions and the rules a set of routes must satisfy.

use super::error::{ConfigError, DuplicateError, RouteError};
use crate::validation::{validate_big_uint, validate_hex_address};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Token address marking a chain's native coin.
pub const NATIVE_TOKEN: &str = "native";

/// Swap kinds a route can carry, as written in `TxType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxType {
    SwapIn,
    SwapOut,
    /// Swap out to a non-EVM address (eg. BTC).
    SwapOutToForeignAddress,
    RouterErc20Swap,
    RouterNftSwap,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::SwapIn => "swapin",
            TxType::SwapOut => "swapout",
            TxType::SwapOutToForeignAddress => "swapout2",
            TxType::RouterErc20Swap => "routerswap",
            TxType::RouterNftSwap => "nftswap",
        }
    }

    pub fn is_bridge_swap(&self) -> bool {
        matches!(
            self,
            TxType::SwapIn | TxType::SwapOut | TxType::SwapOutToForeignAddress
        )
    }

    pub fn is_router_swap(&self) -> bool {
        matches!(self, TxType::RouterErc20Swap | TxType::RouterNftSwap)
    }
}

impl FromStr for TxType {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "swapin" => Ok(TxType::SwapIn),
            "swapout" => Ok(TxType::SwapOut),
            "swapout2" => Ok(TxType::SwapOutToForeignAddress),
            "routerswap" => Ok(TxType::RouterErc20Swap),
            "nftswap" => Ok(TxType::RouterNftSwap),
            other => Err(RouteError::InvalidTxType(other.to_string())),
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `[[Tokens]]` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TokenConfig {
    // common
    #[serde(default)]
    pub tx_type: String,
    #[serde(default)]
    pub swap_server: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub call_by_contract: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub whitelist: Vec<String>,

    // bridge
    #[serde(rename = "PairID", default, skip_serializing_if = "String::is_empty")]
    pub pair_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token_address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub deposit_address: String,

    // router
    #[serde(rename = "ChainID", default, skip_serializing_if = "String::is_empty")]
    pub chain_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub router_contract: String,
}

impl TokenConfig {
    /// The parsed `TxType`, or an error naming the raw value.
    pub fn kind(&self) -> Result<TxType, RouteError> {
        self.tx_type.parse()
    }

    pub fn is_native_token(&self) -> bool {
        self.token_address == NATIVE_TOKEN
    }

    pub fn is_bridge_swap(&self) -> bool {
        self.kind().map(|k| k.is_bridge_swap()).unwrap_or(false)
    }

    pub fn is_router_swap(&self) -> bool {
        self.kind().map(|k| k.is_router_swap()).unwrap_or(false)
    }

    /// Structural check of a single route.
    ///
    /// A `swapin` route called through a contract and without its own token
    /// address takes the contract as token address.
    pub fn check_config(&mut self) -> Result<(), RouteError> {
        let kind = self.kind()?;

        if self.swap_server.is_empty() {
            return Err(RouteError::EmptySwapServer);
        }
        if !self.call_by_contract.is_empty() {
            check_address("CallByContract", &self.call_by_contract)?;
        }
        for addr in &self.whitelist {
            check_address("Whitelist", addr)?;
        }

        if kind.is_bridge_swap() {
            if self.pair_id.is_empty() {
                return Err(RouteError::EmptyPairId);
            }
            if kind == TxType::SwapIn
                && !self.call_by_contract.is_empty()
                && self.token_address.is_empty()
            {
                self.token_address = self.call_by_contract.clone();
            }
            if !self.is_native_token() {
                check_address("TokenAddress", &self.token_address)?;
            }
            if !self.deposit_address.is_empty() {
                check_address("DepositAddress", &self.deposit_address)?;
            }
        } else {
            check_address("RouterContract", &self.router_contract)?;
            validate_big_uint(&self.chain_id)
                .map_err(|_| RouteError::WrongChainId(self.chain_id.clone()))?;
        }

        Ok(())
    }

    fn router_key(&self) -> String {
        format!("{}:{}:{}", self.chain_id, self.router_contract, self.swap_server).to_lowercase()
    }

    fn pair_id_key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.token_address, self.pair_id, self.tx_type, self.swap_server
        )
        .to_lowercase()
    }

    fn token_key(&self) -> String {
        format!("{}:{}", self.token_address, self.deposit_address).to_lowercase()
    }
}

fn check_address(field: &'static str, value: &str) -> Result<(), RouteError> {
    validate_hex_address(value).map_err(|_| RouteError::WrongAddress {
        field,
        value: value.to_string(),
    })
}

/// The full set of configured routes, validated as a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(rename = "Tokens", default)]
    pub tokens: Vec<TokenConfig>,
}

impl ScanConfig {
    pub fn new(tokens: Vec<TokenConfig>) -> Self {
        Self { tokens }
    }

    /// Check every route, then uniqueness across routes. Keys compare
    /// case-insensitively.
    pub fn check_config(&mut self) -> Result<(), ConfigError> {
        if self.tokens.is_empty() {
            return Err(ConfigError::NoTokenConfig);
        }

        let mut router_keys = HashSet::new();
        let mut pair_id_keys = HashSet::new();
        let mut token_keys = HashSet::new();

        for token in &mut self.tokens {
            token.check_config()?;

            if token.is_router_swap() {
                if !router_keys.insert(token.router_key()) {
                    return Err(DuplicateError::RouterSwap(token.router_contract.clone()).into());
                }
                continue;
            }

            // routes dispatched through a contract may share a pairID
            if !token.call_by_contract.is_empty() {
                continue;
            }

            let pair_id_key = token.pair_id_key();
            if !pair_id_keys.insert(pair_id_key.clone()) {
                return Err(DuplicateError::PairId(pair_id_key).into());
            }

            if !token.is_native_token() {
                let token_key = token.token_key();
                if !token_keys.insert(token_key.clone()) {
                    return Err(DuplicateError::Token(token_key).into());
                }
            }
        }

        Ok(())
    }

    /// Routes served by the given swap server.
    pub fn routes_for_server<'a>(
        &'a self,
        swap_server: &'a str,
    ) -> impl Iterator<Item = &'a TokenConfig> + 'a {
        self.tokens
            .iter()
            .filter(move |t| t.swap_server.eq_ignore_ascii_case(swap_server))
    }
}
