//! Configuration for the navigator client
//!
//! Loaded from a TOML file with environment overrides for the backend address.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::logging::LoggingConfig;
use crate::query::CompileOptions;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:6969";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Backend connection settings
    pub api: ApiSettings,
    /// Query builder settings
    pub query: QuerySettings,
    /// Logging settings
    pub logging: LoggingConfig,
    /// Dashboard polling settings
    pub monitor: MonitorSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Backend base URL
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ApiSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Skip `exists` conditions that have no value
    pub require_value_for_exists: bool,
    /// Default document limit when browsing a collection
    pub default_limit: u64,
    /// Default sample size for collection field stats
    pub stats_sample_size: u64,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            require_value_for_exists: false,
            default_limit: 50,
            stats_sample_size: 100,
        }
    }
}

impl QuerySettings {
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions::default().require_value_for_exists(self.require_value_for_exists)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Dashboard refresh interval in seconds
    pub dashboard_interval_secs: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            dashboard_interval_secs: 60,
        }
    }
}

impl MonitorSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.dashboard_interval_secs)
    }
}

impl NavigatorConfig {
    /// Load from a TOML file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: NavigatorConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Apply `MONGONAV_BASE_URL` and `MONGONAV_TIMEOUT_SECS`
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("MONGONAV_BASE_URL") {
            let url = url.trim();
            if !url.is_empty() {
                self.api.base_url = url.to_string();
            }
        }
        if let Ok(timeout) = std::env::var("MONGONAV_TIMEOUT_SECS") {
            self.api.timeout_secs = timeout
                .trim()
                .parse()
                .with_context(|| format!("Invalid MONGONAV_TIMEOUT_SECS: {}", timeout))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.api.base_url)
            .with_context(|| format!("Invalid base URL: {}", self.api.base_url))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(anyhow::anyhow!(
                "Base URL must use http or https, got {}",
                url.scheme()
            ));
        }

        if self.api.timeout_secs == 0 {
            return Err(anyhow::anyhow!("Request timeout cannot be 0"));
        }

        if self.monitor.dashboard_interval_secs == 0 {
            return Err(anyhow::anyhow!("Dashboard interval cannot be 0"));
        }

        Ok(())
    }
}
