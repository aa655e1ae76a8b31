// Configuration comes from two places:
// - a TOML file with the database section and the swap routes
// - environment variables (or .env) for runtime settings

pub mod error;
pub mod route;

pub use error::{ConfigError, DuplicateError, RouteError};
pub use route::{ScanConfig, TokenConfig, TxType, NATIVE_TOKEN};

use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{error, info};

/// Database section of the config file. The section keeps its historical
/// `MongoDB` name.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(rename = "DBURL", default)]
    pub db_url: String,
    #[serde(rename = "DBName", default)]
    pub db_name: String,
    #[serde(rename = "UserName", default, skip_serializing)]
    pub user_name: String,
    #[serde(rename = "Password", default, skip_serializing)]
    pub password: String,
    #[serde(rename = "Enable", default)]
    pub enable: bool,
    #[serde(rename = "BlockChain", default)]
    pub block_chain: String,
}

impl DatabaseConfig {
    /// `DBURL` when set, otherwise a SQLite file named after `DBName`.
    pub fn connection_url(&self) -> String {
        if !self.db_url.is_empty() {
            self.db_url.clone()
        } else if !self.db_name.is_empty() {
            format!("sqlite:{}.db", self.db_name)
        } else {
            "sqlite:swap.db".to_string()
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("db_url", &self.db_url)
            .field("db_name", &self.db_name)
            .field("user_name", &"<redacted>")
            .field("password", &"<redacted>")
            .field("enable", &self.enable)
            .field("block_chain", &self.block_chain)
            .finish()
    }
}

/// The config file as it appears on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "MongoDB", default)]
    pub database: DatabaseConfig,
    #[serde(rename = "Tokens", default)]
    pub tokens: Vec<TokenConfig>,
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate the routes, returning them normalized.
    pub fn into_parts(self) -> Result<(DatabaseConfig, ScanConfig), ConfigError> {
        let mut scan = ScanConfig::new(self.tokens);
        scan.check_config()?;
        Ok((self.database, scan))
    }
}

fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    Config::from_toml_str(&content)
}

/// Read, decode and validate a config file.
pub fn load_config(path: &Path) -> Result<(DatabaseConfig, ScanConfig), ConfigError> {
    info!("Loading config file {}", path.display());

    let config = read_config_file(path)?;
    match serde_json::to_string(&config) {
        Ok(json) => info!("Config file decoded: {}", json),
        Err(e) => error!("Failed to render config for logging: {}", e),
    }

    config.into_parts()
}

/// Live configuration shared by the driver.
///
/// The database section is bound at startup. The route set sits behind a
/// single swap point and is replaced whole by [`ConfigHandle::reload`].
#[derive(Debug)]
pub struct ConfigHandle {
    path: PathBuf,
    database: DatabaseConfig,
    scan: RwLock<Arc<ScanConfig>>,
}

impl ConfigHandle {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let (database, scan) = load_config(&path)?;

        info!(routes = scan.tokens.len(), "Config loaded");
        Ok(Self {
            path,
            database,
            scan: RwLock::new(Arc::new(scan)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn database(&self) -> &DatabaseConfig {
        &self.database
    }

    pub fn current(&self) -> Arc<ScanConfig> {
        let guard = self.scan.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Re-read the routes from the same file. On any failure the error is
    /// logged and the previous routes stay in effect.
    pub fn reload(&self) -> Result<Arc<ScanConfig>, ConfigError> {
        info!("Reloading config file {}", self.path.display());

        let scan = match read_config_file(&self.path).and_then(Config::into_parts) {
            Ok((_, scan)) => Arc::new(scan),
            Err(e) => {
                error!("Reload config failed, keeping previous routes: {}", e);
                return Err(e);
            }
        };

        let mut guard = self.scan.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::clone(&scan);

        info!(routes = scan.tokens.len(), "Reload config success");
        Ok(scan)
    }
}

/// Runtime settings taken from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_file: PathBuf,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
}

impl Settings {
    pub fn from_env() -> Self {
        dotenv().ok();

        let config_file = env::var("CONFIG_FILE")
            .ok()
            .or_else(|| env::args().nth(1))
            .unwrap_or_else(|| "config.toml".to_string());
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);

        Self {
            config_file: PathBuf::from(config_file),
            database_url,
            database_max_connections,
        }
    }

    /// Environment override first, then the config file.
    pub fn database_url(&self, database: &DatabaseConfig) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| database.connection_url())
    }
}
