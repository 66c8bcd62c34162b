//! Configuration management for the addon
//!
//! Settings come from an optional TOML file
//! (~/.config/onepace-torbox/config.toml by default), with environment
//! variables taking precedence for secrets and the listen port.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::stream::RetryPolicy;

/// Environment variable holding the Torbox API key
pub const API_KEY_ENV: &str = "TORBOX_API_KEY";

/// Environment variable overriding the listen port
pub const PORT_ENV: &str = "PORT";

const DEFAULT_BIND: &str = "0.0.0.0:7000";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Torbox API key; without it every stream list is empty
    pub torbox_api_key: Option<String>,
    /// Torbox API base URL
    pub torbox_base_url: Option<String>,
    /// Listen address (host:port)
    pub bind: Option<String>,
    /// Default tracing filter when RUST_LOG is unset
    pub log_level: Option<String>,
    /// "pretty" or "json"
    pub log_format: Option<String>,
    /// Re-list attempts after an acknowledged-only submission
    pub reconcile_attempts: Option<u32>,
    /// Backoff unit in milliseconds
    pub reconcile_delay_ms: Option<u64>,
    /// Replacement episode registry
    pub catalog_path: Option<PathBuf>,
}

impl Config {
    /// Get config file path (~/.config/onepace-torbox/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("onepace-torbox").join("config.toml"))
    }

    /// Load the default config file, or defaults if it does not exist
    pub fn load() -> Result<Self> {
        match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load an explicit config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Get the Torbox API key with fallback chain:
    /// 1. Environment variable TORBOX_API_KEY
    /// 2. Key from the config file
    pub fn api_key(&self) -> Option<String> {
        Self::pick_api_key(std::env::var(API_KEY_ENV).ok(), self.torbox_api_key.clone())
    }

    fn pick_api_key(env: Option<String>, file: Option<String>) -> Option<String> {
        env.into_iter()
            .chain(file)
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
    }

    /// Listen address, honouring PORT for hosted deployments
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        Self::resolve_bind(self.bind.as_deref(), std::env::var(PORT_ENV).ok())
    }

    fn resolve_bind(bind: Option<&str>, port: Option<String>) -> Result<SocketAddr> {
        let mut addr: SocketAddr = bind
            .unwrap_or(DEFAULT_BIND)
            .parse()
            .context("Invalid bind address")?;
        if let Some(port) = port {
            addr.set_port(port.parse().context("Invalid PORT")?);
        }
        Ok(addr)
    }

    /// Reconciliation policy (defaults: 5 attempts, 2s linear backoff)
    pub fn retry_policy(&self) -> RetryPolicy {
        let default = RetryPolicy::default();
        RetryPolicy::new(
            self.reconcile_attempts.unwrap_or(default.max_attempts),
            self.reconcile_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(default.base_delay),
        )
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.torbox_api_key.is_none());
        assert!(config.catalog_path.is_none());
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_config_from_toml() {
        let config = Config::from_toml(
            r#"
            torbox_api_key = "secret"
            bind = "127.0.0.1:8080"
            reconcile_attempts = 3
            reconcile_delay_ms = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.torbox_api_key.as_deref(), Some("secret"));
        assert_eq!(
            config.retry_policy(),
            RetryPolicy::new(3, Duration::from_millis(500))
        );
    }

    #[test]
    fn test_api_key_env_wins_over_file() {
        let key = Config::pick_api_key(Some("env".into()), Some("file".into()));
        assert_eq!(key.as_deref(), Some("env"));
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        assert_eq!(
            Config::pick_api_key(Some("  ".into()), Some("file".into())).as_deref(),
            Some("file")
        );
        assert!(Config::pick_api_key(None, Some(String::new())).is_none());
    }

    #[test]
    fn test_bind_defaults_and_port_override() {
        let addr = Config::resolve_bind(None, None).unwrap();
        assert_eq!(addr.port(), 7000);

        let addr = Config::resolve_bind(Some("127.0.0.1:8080"), Some("9000".into())).unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:9000");

        assert!(Config::resolve_bind(Some("nonsense"), None).is_err());
    }
}
