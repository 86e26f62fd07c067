//! Configuration for SpendWise
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/spendwise/config.toml) if it exists
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Environment variables are applied on top:
//! - `SPENDWISE_API_URL` - backend base URL
//! - `SPENDWISE_TIMEOUT_SECS` - HTTP timeout in seconds

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/spendwise.toml");

pub const ENV_API_URL: &str = "SPENDWISE_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "SPENDWISE_TIMEOUT_SECS";

/// How the CLI prints a summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown output format: {} (valid: text, json)", s)),
        }
    }
}

/// Effective configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL, without trailing slash
    pub api_url: Option<String>,
    /// Timeout for backend requests
    pub timeout: Duration,
    pub format: OutputFormat,
    /// Default tracing filter when neither RUST_LOG nor --verbose is set
    pub log_level: String,
    /// File the config was read from (`None` for embedded defaults)
    pub source_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout: Duration::from_secs(30),
            format: OutputFormat::Text,
            log_level: "info".to_string(),
            source_path: None,
        }
    }
}

impl Config {
    /// Load config from `path` (or the default override location), then
    /// apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load config from disk without environment overrides
    pub fn load_file(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        p.display()
                    )));
                }
                Some(p.to_path_buf())
            }
            None => default_config_path().filter(|p| p.exists()),
        };

        match path {
            Some(path) => {
                debug!(path = %path.display(), "Loading config");
                let content = fs::read_to_string(&path)
                    .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;
                let mut config = Self::from_toml(&content)?;
                config.source_path = Some(path);
                Ok(config)
            }
            None => Self::from_toml(DEFAULT_CONFIG),
        }
    }

    /// Parse config from TOML content, filling gaps with defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();

        if let Some(source) = raw.source {
            if let Some(url) = source.api_url {
                config.api_url = normalize_url(&url);
            }
            if let Some(secs) = source.timeout_secs {
                config.timeout = timeout_from_secs(secs)?;
            }
        }

        if let Some(output) = raw.output {
            if let Some(format) = output.format {
                config.format = format.parse().map_err(Error::Config)?;
            }
        }

        if let Some(logging) = raw.logging {
            if let Some(level) = logging.level {
                config.log_level = level;
            }
        }

        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_url = normalize_url(&url);
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::Config(format!("{} must be a whole number, got {:?}", ENV_TIMEOUT_SECS, secs))
            })?;
            self.timeout = timeout_from_secs(secs)?;
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendwise").join("config.toml"))
}

fn normalize_url(url: &str) -> Option<String> {
    let url = url.trim().trim_end_matches('/');
    (!url.is_empty()).then(|| url.to_string())
}

fn timeout_from_secs(secs: u64) -> Result<Duration> {
    if secs == 0 {
        return Err(Error::Config("timeout_secs must be greater than 0".to_string()));
    }
    Ok(Duration::from_secs(secs))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    source: Option<RawSource>,
    output: Option<RawOutput>,
    logging: Option<RawLogging>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    api_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLogging {
    level: Option<String>,
}
