// Server configuration
//
// Loaded from a TOML file, then overridden by BTCCHECKER_* environment variables.
// Decision: Every key has a default so a missing default config file is not fatal
// Decision: Keep the historical `database_path` key and the Go-style ":8080" bind address

use anyhow::{bail, Context, Result};
use btcchecker_core::HashCost;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auth::{SessionConfig, MAX_SESSION_MAX_AGE_SECS};

/// Config file used when `--config-path` is not given
pub const DEFAULT_CONFIG_PATH: &str = "configs/btcchecker.toml";

/// Coinbase spot price for BTC in Ukrainian hryvnia
pub const DEFAULT_PRICE_API_URL: &str = "https://api.coinbase.com/v2/prices/BTC-UAH/spot";

const ENV_PREFIX: &str = "BTCCHECKER_";

/// Complete server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listen address, either `host:port` or `:port`
    pub bind_addr: String,
    /// One of trace, debug, info, warn/warning, error, fatal, panic
    pub log_level: String,
    /// Backing file of the credential store
    pub database_path: PathBuf,
    /// Secret for signing session cookies. Empty means a random per-process key.
    pub session_key: String,
    /// Session cookie lifetime in seconds
    pub session_max_age_secs: u64,
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
    /// bcrypt cost for new registrations
    pub hash_cost: u32,
    /// Upstream spot price endpoint
    pub price_api_url: String,
    /// Upstream request timeout in seconds
    pub price_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            log_level: "debug".to_string(),
            database_path: PathBuf::from("storage/db.csv"),
            session_key: String::new(),
            session_max_age_secs: 30 * 24 * 60 * 60, // 30 days
            cookie_secure: false,
            hash_cost: btcchecker_core::MIN_HASH_COST,
            price_api_url: DEFAULT_PRICE_API_URL.to_string(),
            price_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `DEFAULT_CONFIG_PATH` is used if present
    /// and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };

        let config = config.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply BTCCHECKER_* environment variables on top of the current values
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = var("BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = var("LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = var("DATABASE_PATH") {
            self.database_path = PathBuf::from(v);
        }
        if let Some(v) = var("SESSION_KEY") {
            self.session_key = v;
        }
        if let Some(v) = var("SESSION_MAX_AGE_SECS").and_then(|s| s.parse().ok()) {
            self.session_max_age_secs = v;
        }
        if let Some(v) = var("COOKIE_SECURE") {
            self.cookie_secure = v.to_lowercase() == "true" || v == "1";
        }
        if let Some(v) = var("HASH_COST").and_then(|s| s.parse().ok()) {
            self.hash_cost = v;
        }
        if let Some(v) = var("PRICE_API_URL") {
            self.price_api_url = v;
        }
        if let Some(v) = var("PRICE_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.price_timeout_secs = v;
        }
        self
    }

    /// Check every value that can only be rejected at startup
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        self.log_level()?;
        self.hash_cost()?;
        if !(1..=MAX_SESSION_MAX_AGE_SECS).contains(&self.session_max_age_secs) {
            bail!(
                "session_max_age_secs must be between 1 and {}, got {}",
                MAX_SESSION_MAX_AGE_SECS,
                self.session_max_age_secs
            );
        }
        Ok(())
    }

    /// Parse `bind_addr`, accepting the host-less `:8080` form
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let addr = if self.bind_addr.starts_with(':') {
            format!("0.0.0.0{}", self.bind_addr)
        } else {
            self.bind_addr.clone()
        };
        addr.parse()
            .with_context(|| format!("Invalid bind_addr: {}", self.bind_addr))
    }

    pub fn log_level(&self) -> Result<tracing::Level> {
        parse_log_level(&self.log_level)
    }

    pub fn hash_cost(&self) -> Result<HashCost> {
        match HashCost::new(self.hash_cost) {
            Some(cost) => Ok(cost),
            None => bail!(
                "hash_cost must be between {} and {}, got {}",
                btcchecker_core::MIN_HASH_COST,
                btcchecker_core::MAX_HASH_COST,
                self.hash_cost
            ),
        }
    }

    pub fn price_timeout(&self) -> Duration {
        Duration::from_secs(self.price_timeout_secs)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            secret: self.session_key.clone(),
            max_age: Duration::from_secs(self.session_max_age_secs),
            secure: self.cookie_secure,
        }
    }
}

/// Parse a log level name, accepting the logrus-style aliases used by older configs
pub fn parse_log_level(level: &str) -> Result<tracing::Level> {
    let level = match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" | "fatal" | "panic" => tracing::Level::ERROR,
        other => bail!("not a valid log level: {other:?}"),
    };
    Ok(level)
}
