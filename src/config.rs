//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (API keys) are referenced by env-var name in the config and
//! resolved at runtime via `std::env::var`. Every section has defaults,
//! so a missing file at the default path is not fatal.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Errors raised while building the runtime configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("{env} not found. Set it in .env or the environment")]
    MissingApiKey { env: String },

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub llm: LlmConfig,
    pub sources: SourcesConfig,
    pub output: OutputConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    pub name: String,
    /// Artificial pause before a run, in milliseconds.
    pub simulated_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: "AGGREGATOR-001".to_string(),
            simulated_delay_ms: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub api_key_env: String,
    /// Fail config resolution when the key is not set.
    pub require_api_key: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini/gemini-1.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            require_api_key: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourcesConfig {
    pub polymarket: SourceToggle,
    pub kalshi: SourceToggle,
    pub predictit: SourceToggle,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            polymarket: SourceToggle { enabled: true },
            kalshi: SourceToggle { enabled: true },
            predictit: SourceToggle { enabled: true },
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceToggle {
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub csv_file: String,
    pub review_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            csv_file: "results.csv".to_string(),
            review_file: "review.txt".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn csv_path(&self) -> PathBuf {
        self.dir.join(&self.csv_file)
    }

    pub fn review_path(&self) -> PathBuf {
        self.dir.join(&self.review_file)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 8501,
        }
    }
}

/// Configuration plus secrets resolved from the environment.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub app: AppConfig,
    pub api_key: Option<SecretString>,
}

impl RuntimeConfig {
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&contents, &path.display().to_string())
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.output.csv_file.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "output.csv_file",
                message: "must not be empty".into(),
            });
        }
        if self.output.review_file.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "output.review_file",
                message: "must not be empty".into(),
            });
        }
        if self.dashboard.enabled && self.dashboard.port == 0 {
            return Err(ConfigError::Invalid {
                field: "dashboard.port",
                message: "must be non-zero when the dashboard is enabled".into(),
            });
        }
        Ok(())
    }

    /// Resolve secrets through `lookup` (normally `std::env::var`).
    pub fn resolve_with<F>(self, lookup: F) -> Result<RuntimeConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(&self.llm.api_key_env)
            .filter(|v| !v.is_empty())
            .map(SecretString::new);

        if api_key.is_none() && self.llm.require_api_key {
            return Err(ConfigError::MissingApiKey {
                env: self.llm.api_key_env.clone(),
            });
        }

        Ok(RuntimeConfig { app: self, api_key })
    }

    /// Resolve secrets from the process environment.
    pub fn resolve(self) -> Result<RuntimeConfig, ConfigError> {
        self.resolve_with(|name| std::env::var(name).ok())
    }
}
