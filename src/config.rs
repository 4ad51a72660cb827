//! Configuration management for askdocs
//!
//! This module handles loading, parsing, validating, and merging
//! configuration from a YAML file, environment variables, and CLI
//! overrides. The result is resolved once at startup and passed down;
//! nothing else in the crate queries the environment.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AskdocsError, Result};

/// Main configuration structure for askdocs
///
/// Holds everything the client needs to reach the backend and render chat
/// output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Chat display settings
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend API, including the `/api` prefix
    ///
    /// Overridable with `ASKDOCS_API_BASE` or `--api-base`, which also lets
    /// tests point the client at a mock server.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_api_base() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout_seconds() -> u64 {
    120
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Chat display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Whether answers are followed by their cited sources
    #[serde(default = "default_show_sources")]
    pub show_sources: bool,

    /// Maximum characters of a source snippet shown before truncation
    #[serde(default = "default_max_snippet_chars")]
    pub max_snippet_chars: usize,
}

fn default_show_sources() -> bool {
    true
}

fn default_max_snippet_chars() -> usize {
    240
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            show_sources: default_show_sources(),
            max_snippet_chars: default_max_snippet_chars(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);
        config.validate()?;

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            backend: BackendConfig::default(),
            chat: ChatConfig::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AskdocsError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| AskdocsError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(api_base) = std::env::var("ASKDOCS_API_BASE") {
            self.backend.api_base = api_base;
        }

        if let Ok(timeout) = std::env::var("ASKDOCS_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.backend.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid ASKDOCS_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(show_sources) = std::env::var("ASKDOCS_SHOW_SOURCES") {
            if let Ok(value) = show_sources.parse() {
                self.chat.show_sources = value;
            } else {
                tracing::warn!("Invalid ASKDOCS_SHOW_SOURCES: {}", show_sources);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(api_base) = &cli.api_base {
            self.backend.api_base = api_base.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any setting cannot work at runtime
    pub fn validate(&self) -> Result<()> {
        let api_base = url::Url::parse(&self.backend.api_base).map_err(|e| {
            AskdocsError::Config(format!(
                "Invalid backend.api_base '{}': {}",
                self.backend.api_base, e
            ))
        })?;

        if api_base.scheme() != "http" && api_base.scheme() != "https" {
            return Err(AskdocsError::Config(format!(
                "backend.api_base must be http or https, got {}",
                api_base.scheme()
            ))
            .into());
        }

        if self.backend.timeout_seconds == 0 {
            return Err(AskdocsError::Config(
                "backend.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.chat.max_snippet_chars == 0 {
            return Err(AskdocsError::Config(
                "chat.max_snippet_chars must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
