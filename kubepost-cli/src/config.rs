//! CLI configuration management

use crate::output::OutputFormat;
use anyhow::{Context, Result};
use kubepost_common::pod::DEFAULT_NAMESPACE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Address `kubectl proxy` listens on by default
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8001";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: String,
    pub namespace: String,
    pub output: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub log_level: String,
    pub log_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            output: "json".to_string(),
            token: None,
            timeout_secs: 30,
            log_level: "warn".to_string(),
            log_path: None,
        }
    }
}

impl Config {
    /// Load `~/.config/kubepost/cli.toml`, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        Self::load_if_exists(&Self::config_path()?)
    }

    /// Only a missing file yields defaults; unreadable or malformed files are errors
    pub fn load_if_exists(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(path)
    }

    /// Load an explicitly named config file; a missing file is an error
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME is not set")?;
        Ok(PathBuf::from(home).join(".config/kubepost/cli.toml"))
    }

    /// Apply command-line overrides on top of this file's values
    pub fn resolve(&self, server: Option<String>, output: Option<OutputFormat>) -> Settings {
        Settings {
            server: server.unwrap_or_else(|| self.server.clone()),
            output: output.unwrap_or_else(|| OutputFormat::from_name(&self.output)),
            token: self.token.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Effective connection and output settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server: String,
    pub output: OutputFormat,
    pub token: Option<String>,
    pub timeout: Duration,
}
