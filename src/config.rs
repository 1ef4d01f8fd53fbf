//! Configuration management for the math score service

use crate::models::loader::{DEFAULT_MODEL_FILE, DEFAULT_SEARCH_DIRS};
use anyhow::{Context, Result};
use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration file read when `APP_CONFIG` is not set
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// What the loader does with a candidate file that exists but cannot be decoded
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    /// Stop and report the corrupt file
    #[default]
    FailFast,
    /// Log the failure and try the next candidate
    SkipCorrupt,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub models: ModelsConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Listen port, overridden by the `PORT` environment variable
    pub port: u16,
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelsConfig {
    /// Artifact file name looked up in every search directory
    pub file_name: String,
    /// Directories searched in order, relative to the working directory
    pub search_dirs: Vec<String>,
    /// Handling of existing but undecodable candidates
    #[serde(default)]
    pub resolution: ResolutionPolicy,
}

/// Metrics reporting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    /// Seconds between periodic summaries (0 disables them)
    pub report_interval_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from `APP_CONFIG` (or the default path) and the
    /// `PORT` environment variable
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("APP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let port = std::env::var("PORT").ok();
        Self::load_with(path, port.as_deref())
    }

    /// Load configuration from a specific path, without environment overrides
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with(path, None)
    }

    /// Defaults, overlaid by the file at `path` if it exists, overlaid by `port`
    pub fn load_with<P: AsRef<Path>>(path: P, port: Option<&str>) -> Result<Self> {
        let defaults =
            Config::try_from(&AppConfig::default()).context("Failed to encode default configuration")?;

        let mut builder = Config::builder()
            .add_source(defaults)
            .add_source(File::from(path.as_ref()).required(false));

        if let Some(port) = port {
            let port: u16 = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {:?}", port))?;
            builder = builder
                .set_override("server.port", i64::from(port))
                .context("Failed to apply PORT override")?;
        }

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Socket address string the HTTP server binds to
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            models: ModelsConfig {
                file_name: DEFAULT_MODEL_FILE.to_string(),
                search_dirs: DEFAULT_SEARCH_DIRS.iter().map(|s| s.to_string()).collect(),
                resolution: ResolutionPolicy::FailFast,
            },
            metrics: MetricsConfig {
                report_interval_secs: 300,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
