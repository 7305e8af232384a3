// src/infrastructure/config.rs
use crate::constants::{DEFAULT_KEY_PREFIX, DEFAULT_URL_EXPIRY_SECS};
use crate::domain::DomainError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// TOML configuration for the notes client
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct ApiConfig {
    /// GraphQL endpoint, e.g. `https://xyz.appsync-api.us-east-1.amazonaws.com/graphql`
    #[serde(default)]
    pub endpoint: String,
    /// Sent as `x-api-key` when not empty
    #[serde(default)]
    pub api_key: String,
}

#[derive(Clone, Deserialize, Serialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default)]
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    #[serde(default = "default_url_expiry_secs")]
    pub url_expiry_secs: u64,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct SessionConfig {
    /// Where the session is kept; empty means next to the config file
    #[serde(default)]
    pub path: String,
}

// Default value functions
fn default_region() -> String { "us-east-1".to_string() }
fn default_key_prefix() -> String { DEFAULT_KEY_PREFIX.to_string() }
fn default_url_expiry_secs() -> u64 { DEFAULT_URL_EXPIRY_SECS }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: default_region(),
            key_prefix: default_key_prefix(),
            url_expiry_secs: default_url_expiry_secs(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            session_token: String::new(),
        }
    }
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("key_prefix", &self.key_prefix)
            .field("url_expiry_secs", &self.url_expiry_secs)
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// `<config_dir>/cloudnotes/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Could not find config directory")?;
        Ok(dir.join("cloudnotes").join("config.toml"))
    }

    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse TOML config")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        std::fs::write(path, toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Create default configuration file at path
    pub fn create_default(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }

    /// Fill empty storage credentials from the standard AWS environment variables
    pub fn with_env_credentials(mut self) -> Self {
        let storage = &mut self.storage;
        if storage.access_key_id.is_empty() {
            storage.access_key_id = std::env::var("AWS_ACCESS_KEY_ID").unwrap_or_default();
            storage.secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY").unwrap_or_default();
            storage.session_token = std::env::var("AWS_SESSION_TOKEN").unwrap_or_default();
        }
        self
    }

    /// Session file location, resolved against the config file's directory
    pub fn session_path(&self, config_path: &Path) -> PathBuf {
        if self.session.path.is_empty() {
            config_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("session.json")
        } else {
            PathBuf::from(&self.session.path)
        }
    }

    /// Check that everything needed to reach the backend is present
    pub fn validate(&self) -> Result<(), DomainError> {
        let required = [
            ("api.endpoint", &self.api.endpoint),
            ("storage.bucket", &self.storage.bucket),
            ("storage.region", &self.storage.region),
            ("storage.access_key_id", &self.storage.access_key_id),
            ("storage.secret_access_key", &self.storage.secret_access_key),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(DomainError::Config(format!("{name} is not set"))),
            None => Ok(()),
        }
    }
}
