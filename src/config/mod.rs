//! Configuration management for geosync
//!
//! Handles loading, saving, and validating configuration from TOML files.
//! Secrets never live in the file: the upstream API key is read from the
//! environment variable named by `upstream.api_key_env`.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Upstream geography API
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// SQLite settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Sync pipeline settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// Upstream API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL every resource path is joined onto
    #[serde(default = "default_upstream_base_url")]
    pub base_url: String,

    /// Environment variable name for the API key
    #[serde(default = "default_upstream_api_key_env")]
    pub api_key_env: String,

    /// Header the API key is sent in
    #[serde(default = "default_upstream_api_key_header")]
    pub api_key_header: String,

    /// User agent string
    #[serde(default = "default_upstream_user_agent")]
    pub user_agent: String,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,

    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Explicit database file; defaults to `geosync.db` next to the config file
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Maximum pooled connections
    #[serde(default = "default_database_max_connections")]
    pub max_connections: u32,
}

/// Sync pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Upstream requests in flight during a fan-out stage
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for geosync data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,

    /// Path to SQLite database
    pub db_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig::default(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            sync: SyncConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_base_url(),
            api_key_env: default_upstream_api_key_env(),
            api_key_header: default_upstream_api_key_header(),
            user_agent: default_upstream_user_agent(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: default_database_max_connections(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_concurrency: default_fetch_concurrency(),
        }
    }
}

impl Config {
    /// Get the default base directory for geosync (~/.geosync)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".geosync")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Point all internal paths at `base_dir`, keeping an explicit database path
    pub fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.set_paths(base.join("config.toml"), base);
    }

    fn set_paths(&mut self, config_file: PathBuf, base: PathBuf) {
        let db_file = match &self.database.path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => base.join(path),
            None => base.join("geosync.db"),
        };
        self.paths = PathsConfig {
            config_file,
            db_file,
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.set_paths(config_path.to_path_buf(), base);

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a base directory, falling back to defaults
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir);

        if config.paths.config_file.exists() {
            return Self::load(&config.paths.config_file.clone());
        }

        debug!("No config file found, using defaults");
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Get the upstream API key from environment
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.upstream.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Address the HTTP server binds to
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let base = Url::parse(&self.upstream.base_url).map_err(|e| {
            Error::Config(format!(
                "upstream.base_url '{}' is not a valid URL: {}",
                self.upstream.base_url, e
            ))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::Config(
                "upstream.base_url must use http or https".to_string(),
            ));
        }

        if self.upstream.api_key_env.trim().is_empty() {
            return Err(Error::Config(
                "upstream.api_key_env must name an environment variable".to_string(),
            ));
        }

        if self.upstream.api_key_header.trim().is_empty() {
            return Err(Error::Config(
                "upstream.api_key_header must not be empty".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(Error::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        if self.sync.fetch_concurrency == 0 {
            return Err(Error::Config(
                "sync.fetch_concurrency must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.upstream.api_key_env, "CSC_API_KEY");
        assert_eq!(config.upstream.api_key_header, "X-CSCAPI-KEY");
        assert_eq!(config.sync.fetch_concurrency, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.init_paths(Some(tmp.path().to_path_buf()));
        config.sync.fetch_concurrency = 4;
        config.server.port = 8081;

        config.save().unwrap();
        assert!(config.paths.config_file.exists());

        let loaded = Config::load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(loaded.sync.fetch_concurrency, 4);
        assert_eq!(loaded.server.port, 8081);
        assert_eq!(loaded.paths.db_file, tmp.path().join("geosync.db"));
    }

    #[test]
    fn test_relative_database_path_resolves_against_config_dir() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(&config_path, "[database]\npath = \"data/geo.db\"\n").unwrap();

        let loaded = Config::load(&config_path).unwrap();
        assert_eq!(loaded.paths.db_file, tmp.path().join("data/geo.db"));
    }

    #[test]
    fn test_missing_config_file() {
        let tmp = TempDir::new().unwrap();
        let err = Config::load(&tmp.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.sync.fetch_concurrency = 0;
        assert!(config.validate().is_err());
        config.sync.fetch_concurrency = 1;
        assert!(config.validate().is_ok());

        config.upstream.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.upstream.base_url = "ftp://example.com/".to_string();
        assert!(config.validate().is_err());

        config.upstream.base_url = "https://example.com/v1/".to_string();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }
}
