use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file '{}' not exist", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml decode failed: {0}")]
    Decode(#[from] toml::de::Error),

    #[error("no token config exist")]
    NoTokenConfig,

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Duplicate(#[from] DuplicateError),
}

/// A single route entry breaks a structural rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("invalid 'TxType' {0}")]
    InvalidTxType(String),

    #[error("empty 'SwapServer'")]
    EmptySwapServer,

    #[error("empty 'PairID'")]
    EmptyPairId,

    #[error("wrong '{field}' {value}")]
    WrongAddress { field: &'static str, value: String },

    #[error("wrong chainID '{0}'")]
    WrongChainId(String),
}

/// Two route entries collide on a uniqueness key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DuplicateError {
    #[error("duplicate router swap config {0}")]
    RouterSwap(String),

    #[error("duplicate pairID config {0}")]
    PairId(String),

    #[error("duplicate token config {0}")]
    Token(String),
}
