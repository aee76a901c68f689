//! Configuration management for the seeder.
//!
//! Handles loading configuration from TOML files and environment variables:
//! the execution endpoint, script locations and batch tuning.

use crate::batch::{BatchOptions, DEFAULT_PROGRESS_EVERY, DEFAULT_SPLIT_THRESHOLD};
use crate::client::HttpClientConfig;
use crate::error::{Result, SeederError};
use crate::seeder::{SeederOptions, DEFAULT_PROBE_SCHEMA};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Remote SQL execution endpoint.
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Script file locations.
    #[serde(default)]
    pub scripts: ScriptsConfig,

    /// Batch execution tuning.
    #[serde(default)]
    pub execution: ExecutionConfig,
}

/// Remote endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL of the control plane.
    pub base_url: Option<String>,

    /// Project reference sent with every request.
    pub project_ref: Option<String>,

    /// Bearer token (prefer SEEDER_API_KEY over storing it here).
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            project_ref: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EndpointConfig {
    /// Applies environment variables (SEEDER_BASE_URL, etc.) as defaults.
    pub fn apply_env_defaults(&mut self) {
        if self.base_url.is_none() {
            self.base_url = std::env::var("SEEDER_BASE_URL").ok();
        }
        if self.project_ref.is_none() {
            self.project_ref = std::env::var("SEEDER_PROJECT_REF").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("SEEDER_API_KEY").ok();
        }
    }

    /// Validates the endpoint settings and builds the HTTP client config.
    pub fn to_client_config(&self) -> Result<HttpClientConfig> {
        let base_url = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                SeederError::config("base_url is required (or set SEEDER_BASE_URL)")
            })?;

        let url = Url::parse(base_url)
            .map_err(|e| SeederError::config(format!("Invalid base_url '{base_url}': {e}")))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(SeederError::config(format!(
                "Invalid scheme '{}'. Expected 'http' or 'https'",
                url.scheme()
            )));
        }

        let project_ref = self
            .project_ref
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                SeederError::config("project_ref is required (or set SEEDER_PROJECT_REF)")
            })?;

        let mut config =
            HttpClientConfig::new(base_url, project_ref).with_timeout(self.timeout_secs);
        if let Some(api_key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            config = config.with_api_key(api_key);
        }
        Ok(config)
    }
}

/// Script file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptsConfig {
    /// Schema script path.
    #[serde(default = "default_schema_path")]
    pub schema: PathBuf,

    /// Seed data script path.
    #[serde(default = "default_seed_path")]
    pub seed: PathBuf,
}

fn default_schema_path() -> PathBuf {
    PathBuf::from("schema.sql")
}

fn default_seed_path() -> PathBuf {
    PathBuf::from("seed.sql")
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            schema: default_schema_path(),
            seed: default_seed_path(),
        }
    }
}

/// Batch execution tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Scripts longer than this many characters are split.
    #[serde(default = "default_split_threshold")]
    pub split_threshold: usize,

    /// Schema listed by the connectivity probe.
    #[serde(default = "default_probe_schema")]
    pub probe_schema: String,

    /// Probe `/health` before each batch.
    #[serde(default = "default_health_check")]
    pub health_check: bool,

    /// Statements between progress log lines (0 disables).
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,
}

fn default_split_threshold() -> usize {
    DEFAULT_SPLIT_THRESHOLD
}

fn default_probe_schema() -> String {
    DEFAULT_PROBE_SCHEMA.to_string()
}

fn default_health_check() -> bool {
    true
}

fn default_progress_every() -> usize {
    DEFAULT_PROGRESS_EVERY
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            split_threshold: default_split_threshold(),
            probe_schema: default_probe_schema(),
            health_check: default_health_check(),
            progress_every: default_progress_every(),
        }
    }
}

impl ExecutionConfig {
    /// Batch options derived from this config.
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            split_threshold: self.split_threshold,
            health_check: self.health_check,
            progress_every: self.progress_every,
        }
    }

    /// Seeder options derived from this config.
    pub fn seeder_options(&self) -> SeederOptions {
        SeederOptions {
            probe_schema: self.probe_schema.clone(),
            batch: self.batch_options(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sql-seeder")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SeederError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            SeederError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Fills unset values from the environment.
    pub fn apply_env_defaults(&mut self) {
        self.endpoint.apply_env_defaults();
    }
}
