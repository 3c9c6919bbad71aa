//! Bootstrap configuration loading
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (`--config`, `--database`)
//! 2. Environment variables (`BDNS_CONFIG`, `BDNS_DATABASE`)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! A missing config file at the default location is not an error: the
//! tools start with built-in defaults and log a warning. A file named
//! explicitly (flag or environment) must exist and parse.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "BDNS_CONFIG";

/// Environment variable overriding the database path
pub const DATABASE_ENV_VAR: &str = "BDNS_DATABASE";

/// Administrative-body listing endpoint of the BDNS public API
pub const DEFAULT_LISTING_BASE_URL: &str = "https://www.infosubvenciones.es/bdnstrans/api/organos";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Path to SQLite database file (relative or absolute)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Listing service access
    #[serde(default)]
    pub listing: ListingConfig,

    /// Resolver behaviour
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Upsert behaviour
    #[serde(default)]
    pub upsert: UpsertConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listing service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Retries after the first failed attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries; attempt `n` waits `n * retry_delay_ms`
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Minimum spacing between two requests
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Resolver configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolverConfig {
    /// Retry lookups with co-official language variants of local-body terms
    #[serde(default)]
    pub term_equivalence: bool,
}

/// Upsert configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertConfig {
    /// Highest `_n` suffix tried before giving up on an id
    #[serde(default = "default_max_suffix")]
    pub max_suffix: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            min_interval_ms: default_min_interval_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for UpsertConfig {
    fn default() -> Self {
        Self {
            max_suffix: default_max_suffix(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_LISTING_BASE_URL.to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_min_interval_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_suffix() -> u32 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Read and parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        let config = Self::parse(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Load bootstrap configuration following the priority order above
pub fn load_config(cli_path: Option<&Path>) -> Result<TomlConfig> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_path {
        return TomlConfig::from_file(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return TomlConfig::from_file(Path::new(&path));
    }

    // Priority 3: Platform config file
    if let Some(path) = default_config_file() {
        return TomlConfig::from_file(&path);
    }

    warn!("No configuration file found, using built-in defaults");
    Ok(TomlConfig::default())
}

/// Locate an existing config file in the platform's standard places
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("bdns").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/bdns/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Resolve the SQLite database path
///
/// CLI argument, then `BDNS_DATABASE`, then `database_path` from TOML,
/// then the OS-dependent default.
pub fn resolve_database_path(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATABASE_ENV_VAR) {
        return PathBuf::from(path);
    }

    if let Some(path) = &config.database_path {
        return path.clone();
    }

    default_database_path()
}

/// Get OS-dependent default database path
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("bdns"))
        .unwrap_or_else(|| PathBuf::from("./bdns_data"))
        .join("bdns.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = TomlConfig::parse("").unwrap();
        assert!(config.database_path.is_none());
        assert_eq!(config.listing.base_url, DEFAULT_LISTING_BASE_URL);
        assert_eq!(config.listing.max_retries, 3);
        assert!(!config.resolver.term_equivalence);
        assert_eq!(config.upsert.max_suffix, 1000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_sections() {
        let config = TomlConfig::parse(
            r#"
            database_path = "/tmp/bdns.db"

            [listing]
            max_retries = 5

            [resolver]
            term_equivalence = true
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/bdns.db")));
        assert_eq!(config.listing.max_retries, 5);
        assert_eq!(config.listing.retry_delay_ms, 2000);
        assert!(config.resolver.term_equivalence);
        assert_eq!(config.upsert.max_suffix, 1000);
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = TomlConfig::parse("database_path = [").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_default_database_path_ends_with_db_file() {
        let path = default_database_path();
        assert!(path.ends_with("bdns/bdns.db") || path.ends_with("bdns_data/bdns.db"));
    }
}
