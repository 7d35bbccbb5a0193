//! # Migration Configuration
//!
//! Configuration for the source and destination accounts and for run behavior.
//! Supports config files, environment variables and command-line overrides.
//!
//! Precedence (highest to lowest):
//! 1. Command-line flags (applied by the binary)
//! 2. Environment variables
//! 3. Config file (`./harness-migrate.toml` or `./config/harness-migrate.toml`)
//! 4. Default values

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{self, env};
use crate::error::{MigrateResult, MigrationError};

/// Connection settings for one account
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiEndpointConfig {
    /// Gateway base URL (e.g. "<https://app.harness.io/gateway>")
    pub base_url: String,
    /// Account identifier sent as `accountIdentifier` on every call
    pub account_id: String,
    /// API key sent in the `x-api-key` header
    pub api_key: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ApiEndpointConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_BASE_URL.to_string(),
            account_id: String::new(),
            api_key: String::new(),
            timeout_ms: constants::DEFAULT_TIMEOUT_MS,
        }
    }
}

impl fmt::Debug for ApiEndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiEndpointConfig")
            .field("base_url", &self.base_url)
            .field("account_id", &self.account_id)
            .field("api_key", &mask(&self.api_key))
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl ApiEndpointConfig {
    pub fn is_configured(&self) -> bool {
        !self.account_id.is_empty() && !self.api_key.is_empty()
    }

    fn validate(&self, label: &str) -> MigrateResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(MigrationError::config_error(format!(
                "{label} base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.account_id.is_empty() {
            return Err(MigrationError::config_error(format!(
                "{label} account_id is required"
            )));
        }
        if self.api_key.is_empty() {
            return Err(MigrationError::config_error(format!(
                "{label} api_key is required"
            )));
        }
        Ok(())
    }
}

/// Run behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// List and export only; never write to the destination
    pub dry_run: bool,
    /// Delay after every write and page fetch, in milliseconds
    pub delay_ms: u64,
    /// Items requested per listing page
    pub page_size: usize,
    /// Directory for the audit export side-channel
    pub export_dir: PathBuf,
    /// Whether fetched payloads are written to `export_dir`
    pub export_enabled: bool,
    /// Resource types to run (empty means all)
    pub resource_types: Vec<String>,
    /// Resource types to leave out
    pub exclude_resource_types: Vec<String>,
    /// Restrict enumeration to one organization
    pub org_identifier: Option<String>,
    /// Restrict enumeration to one project (requires `org_identifier`)
    pub project_identifier: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            delay_ms: constants::DEFAULT_DELAY_MS,
            page_size: constants::DEFAULT_PAGE_SIZE,
            export_dir: PathBuf::from(constants::DEFAULT_EXPORT_DIR),
            export_enabled: true,
            resource_types: Vec::new(),
            exclude_resource_types: Vec::new(),
            org_identifier: None,
            project_identifier: None,
        }
    }
}

/// Complete migration configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    pub source: ApiEndpointConfig,
    pub destination: ApiEndpointConfig,
    pub run: RunConfig,
}

impl MigrationConfig {
    /// Load configuration from the first config file found plus environment overrides
    pub fn load() -> MigrateResult<Self> {
        let mut config = Self::default();

        if let Some(config_path) = Self::find_config_file() {
            debug!("Loading config from: {}", config_path.display());
            config = Self::load_from_file(&config_path)?;
        }

        config.apply_env_overrides();
        debug!(?config, "Loaded migration configuration");
        Ok(config)
    }

    /// Load configuration from a specific file, then apply environment overrides
    pub fn load_with_file(path: &Path) -> MigrateResult<Self> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn load_from_file(path: &Path) -> MigrateResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MigrationError::config_error(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            MigrationError::config_error(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    fn find_config_file() -> Option<PathBuf> {
        ["./harness-migrate.toml", "./config/harness-migrate.toml"]
            .iter()
            .map(Path::new)
            .find(|path| path.is_file())
            .map(Path::to_path_buf)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(env::SOURCE_API_KEY) {
            self.source.api_key = key;
        }
        if let Some(account) = lookup(env::SOURCE_ACCOUNT_ID) {
            self.source.account_id = account;
        }
        if let Some(key) = lookup(env::DEST_API_KEY) {
            self.destination.api_key = key;
        }
        if let Some(account) = lookup(env::DEST_ACCOUNT_ID) {
            self.destination.account_id = account;
        }
        if let Some(url) = lookup(env::BASE_URL) {
            self.source.base_url = url.clone();
            self.destination.base_url = url;
        }
        if let Some(delay) = lookup(env::DELAY_MS) {
            if let Ok(delay_ms) = delay.parse() {
                self.run.delay_ms = delay_ms;
            }
        }
    }

    /// Check that everything the selected mode needs is present
    pub fn validate(&self) -> MigrateResult<()> {
        self.source.validate("source")?;
        if !self.run.dry_run {
            if !self.destination.is_configured() {
                return Err(MigrationError::MissingDestination);
            }
            self.destination.validate("destination")?;
        }
        if self.run.page_size == 0 {
            return Err(MigrationError::config_error("page_size must be positive"));
        }
        if self.run.project_identifier.is_some() && self.run.org_identifier.is_none() {
            return Err(MigrationError::InvalidScope(
                "project_identifier requires org_identifier".to_string(),
            ));
        }
        Ok(())
    }

    /// Write the configuration as TOML
    pub fn save_to_file(&self, path: &Path) -> MigrateResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| MigrationError::config_error(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "***".to_string()
    }
}
