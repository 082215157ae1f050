//! Application configuration.
//!
//! Layered sources: an optional `peblob.toml` next to the binary, overridden
//! by `PEBLOB__SECTION__KEY` environment variables. Every field carries a
//! default so the binary runs bare (in-memory storage, no user service).

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub user_service: UserServiceConfig,
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind_addr: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Required when `storage.backend = "postgres"`.
    pub url: Option<SecretString>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserServiceConfig {
    /// Absent means no User service: lookups degrade to "not found".
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for UserServiceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 3,
        }
    }
}

/// Knobs for the deployment-dependent creation rules.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub require_name: bool,
    pub bound_explicit_size: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            require_name: false,
            bound_explicit_size: true,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // A .env file is a convenience for local runs; absence is normal.
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded environment from .env");
        }
        let config = Config::builder()
            .add_source(File::with_name("peblob").required(false))
            .add_source(
                Environment::with_prefix("PEBLOB")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
