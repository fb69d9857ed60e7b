use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project config file, optional for [`ConfigLoader::load`]
pub const CONFIG_FILE: &str = "voiceai.yaml";
/// Local overrides, never committed
pub const LOCAL_CONFIG_FILE: &str = "voiceai.local.yaml";
/// Environment prefix; nested keys split on `__` (`VOICEAI_API__BASE_URL`)
pub const ENV_PREFIX: &str = "VOICEAI_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["json", "pretty"];

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to extract configuration: {0}")]
    Extraction(#[from] Box<figment::Error>),

    #[error("api.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("Invalid endpoint for {key}: '{value}'. Must start with '/'")]
    InvalidEndpoint { key: &'static str, value: String },

    #[error("Invalid api.timeout_secs: 0. Must be at least 1")]
    InvalidTimeout,

    #[error("Invalid latency threshold {key}: 0. Must be positive")]
    ZeroLatencyThreshold { key: &'static str },

    #[error("latency.acceptable ({acceptable}) must not exceed latency.maximum ({maximum})")]
    InvertedLatencyBudget { acceptable: u64, maximum: u64 },

    #[error("Invalid confidence {key}: {value}. Must be within [0, 1]")]
    ConfidenceOutOfRange { key: &'static str, value: f64 },

    #[error("Confidence thresholds must satisfy minimum <= acceptable <= high")]
    UnorderedConfidence,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `voiceai.yaml` (optional)
    /// 3. `voiceai.local.yaml` (optional)
    /// 4. Environment variables (`VOICEAI_*`, highest priority)
    pub fn load() -> Result<Config, ConfigError> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(CONFIG_FILE))
            .merge(Yaml::file(LOCAL_CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from an explicit file, which must exist
    ///
    /// Environment variables still override the file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        // API
        if config.api.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }

        for (key, value) in [
            ("api.chat_endpoint", &config.api.chat_endpoint),
            ("api.session_endpoint", &config.api.session_endpoint),
            ("api.history_endpoint", &config.api.history_endpoint),
        ] {
            if !value.starts_with('/') {
                return Err(ConfigError::InvalidEndpoint {
                    key,
                    value: value.clone(),
                });
            }
        }

        if config.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        // Latency
        for (key, value) in [
            ("latency.acceptable", config.latency.acceptable),
            ("latency.maximum", config.latency.maximum),
            ("latency.simple_query", config.latency.simple_query),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroLatencyThreshold { key });
            }
        }

        if config.latency.acceptable > config.latency.maximum {
            return Err(ConfigError::InvertedLatencyBudget {
                acceptable: config.latency.acceptable,
                maximum: config.latency.maximum,
            });
        }

        // Confidence
        let confidence = &config.confidence;
        for (key, value) in [
            ("confidence.minimum", confidence.minimum),
            ("confidence.acceptable", confidence.acceptable),
            ("confidence.high", confidence.high),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ConfidenceOutOfRange { key, value });
            }
        }

        if confidence.minimum > confidence.acceptable || confidence.acceptable > confidence.high {
            return Err(ConfigError::UnorderedConfidence);
        }

        // Logging
        if !LOG_LEVELS.contains(&config.log.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.log.level.clone()));
        }

        if !LOG_FORMATS.contains(&config.log.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.log.format.clone()));
        }

        Ok(())
    }
}
