//! Configuration management for edudash.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use axum::http::HeaderValue;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "edudash";

/// Default document file name.
const DOCUMENT_FILE_NAME: &str = "students.json";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "EDUDASH_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `EDUDASH_`, sections split on `__`,
///    e.g. `EDUDASH_SERVER__PORT=8080`)
/// 2. TOML config file at `~/.config/edudash/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Cross-origin configuration for the dashboard.
    pub cors: CorsConfig,
    /// Field validation configuration.
    pub validation: ValidationConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host name or address to bind.
    pub host: String,
    /// Port to bind. Port 0 picks a free port.
    pub port: u16,
    /// Deployment environment label, e.g. `development` or `production`.
    pub env: String,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the student document.
    /// Defaults to `~/.local/share/edudash/students.json`
    pub data_path: Option<PathBuf>,
    /// Write two sample records when the document does not exist yet.
    /// When disabled an empty document is created instead.
    pub seed_on_missing: bool,
}

/// Cross-origin configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to call the API from a browser.
    pub allowed_origins: Vec<String>,
    /// Methods advertised on preflight responses.
    pub allowed_methods: Vec<String>,
    /// Request headers advertised on preflight responses.
    pub allowed_headers: Vec<String>,
    /// Whether browsers may send credentials.
    pub allow_credentials: bool,
}

/// Field validation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Reject created or updated records that break the form rules.
    pub enforce: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3001,
            env: "development".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_path: None, // Will be resolved to default at runtime
            seed_on_missing: true,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            allowed_methods: ["GET", "POST", "PUT", "DELETE", "PATCH"]
                .map(String::from)
                .to_vec(),
            allowed_headers: ["Content-Type", "Authorization"]
                .map(String::from)
                .to_vec(),
            allow_credentials: true,
        }
    }
}

impl CorsConfig {
    /// Whether `origin` is on the allow-list. Origins match exactly.
    #[must_use]
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == origin)
    }
}

/// Default dashboard origins (dev server, alternative dev port, preview).
fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
        "http://localhost:4173".to_string(),
    ]
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "server.host must not be empty".to_string(),
            });
        }

        let header_lists = [
            ("cors.allowed_origins", &self.cors.allowed_origins),
            ("cors.allowed_methods", &self.cors.allowed_methods),
            ("cors.allowed_headers", &self.cors.allowed_headers),
        ];
        for (name, values) in header_lists {
            for value in values {
                if value.is_empty() || HeaderValue::from_str(value).is_err() {
                    return Err(Error::ConfigValidation {
                        message: format!("{name} contains an invalid header value: {value:?}"),
                    });
                }
            }
        }

        let data_path = self.data_path();
        if data_path.is_dir() {
            return Err(Error::ConfigValidation {
                message: format!(
                    "storage.data_path ({}) is a directory, expected a file",
                    data_path.display()
                ),
            });
        }

        Ok(())
    }

    /// Get the document path, resolving defaults if not set.
    #[must_use]
    pub fn data_path(&self) -> PathBuf {
        self.storage
            .data_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DOCUMENT_FILE_NAME))
    }

    /// The `host:port` string to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
