use serde::{Deserialize, Serialize};
use std::fmt;

/// Main configuration structure for the harness
///
/// Built once by the entry point and handed to collaborators by reference;
/// nothing mutates it after loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Service under test
    #[serde(default)]
    pub api: ApiConfig,

    /// Latency budgets
    #[serde(default)]
    pub latency: LatencyConfig,

    /// Backing store of the service under test
    #[serde(default)]
    pub db: DatabaseConfig,

    /// Confidence thresholds
    #[serde(default)]
    pub confidence: ConfidenceConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LoggingConfig,

    /// Response schema documents
    #[serde(default)]
    pub schemas: SchemaConfig,
}

/// HTTP API configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ApiConfig {
    /// Base URL of the Voice AI service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat (query/response) endpoint path
    #[serde(default = "default_chat_endpoint")]
    pub chat_endpoint: String,

    /// Session creation endpoint path
    #[serde(default = "default_session_endpoint")]
    pub session_endpoint: String,

    /// Conversation history endpoint path
    #[serde(default = "default_history_endpoint")]
    pub history_endpoint: String,

    /// Bearer token sent with every request
    #[serde(default)]
    pub auth_token: String,

    /// Transport-level request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_chat_endpoint() -> String {
    "/api/chat".to_string()
}

fn default_session_endpoint() -> String {
    "/api/session".to_string()
}

fn default_history_endpoint() -> String {
    "/api/history".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            chat_endpoint: default_chat_endpoint(),
            session_endpoint: default_session_endpoint(),
            history_endpoint: default_history_endpoint(),
            auth_token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// Join the base URL and an endpoint path
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), endpoint)
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("chat_endpoint", &self.chat_endpoint)
            .field("session_endpoint", &self.session_endpoint)
            .field("history_endpoint", &self.history_endpoint)
            .field("auth_token", &redacted(&self.auth_token))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Latency thresholds in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LatencyConfig {
    /// Soft budget; exceeding it is a degradation signal
    #[serde(default = "default_acceptable_latency")]
    pub acceptable: u64,

    /// Hard budget; exceeding it is a failure
    #[serde(default = "default_maximum_latency")]
    pub maximum: u64,

    /// Budget for trivial queries such as greetings
    #[serde(default = "default_simple_query_latency")]
    pub simple_query: u64,
}

const fn default_acceptable_latency() -> u64 {
    500
}

const fn default_maximum_latency() -> u64 {
    2000
}

const fn default_simple_query_latency() -> u64 {
    300
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            acceptable: default_acceptable_latency(),
            maximum: default_maximum_latency(),
            simple_query: default_simple_query_latency(),
        }
    }
}

/// Database configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// sqlx connection URL; empty disables persistence checks
    #[serde(default)]
    pub url: String,

    /// Username applied to server databases when non-empty
    #[serde(default)]
    pub username: String,

    /// Password applied to server databases when non-empty
    #[serde(default)]
    pub password: String,

    /// Milliseconds a scenario waits for the service to commit a turn
    #[serde(default = "default_write_settle_ms")]
    pub write_settle_ms: u64,
}

const fn default_write_settle_ms() -> u64 {
    1000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: String::new(),
            write_settle_ms: default_write_settle_ms(),
        }
    }
}

impl DatabaseConfig {
    /// Whether a backing store has been configured
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &redacted(&self.password))
            .field("write_settle_ms", &self.write_settle_ms)
            .finish()
    }
}

/// Confidence thresholds in `[0, 1]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConfidenceConfig {
    #[serde(default = "default_minimum_confidence")]
    pub minimum: f64,

    #[serde(default = "default_acceptable_confidence")]
    pub acceptable: f64,

    #[serde(default = "default_high_confidence")]
    pub high: f64,
}

const fn default_minimum_confidence() -> f64 {
    0.5
}

const fn default_acceptable_confidence() -> f64 {
    0.7
}

const fn default_high_confidence() -> f64 {
    0.9
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            minimum: default_minimum_confidence(),
            acceptable: default_acceptable_confidence(),
            high: default_high_confidence(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// JSON log file; empty disables file output
    #[serde(default = "default_log_file_path")]
    pub file_path: String,

    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Console log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_file_path() -> String {
    "logs/test.log".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file_path: default_log_file_path(),
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Location of the externally supplied JSON schema documents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchemaConfig {
    #[serde(default = "default_schema_dir")]
    pub dir: String,
}

fn default_schema_dir() -> String {
    "schemas".to_string()
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            dir: default_schema_dir(),
        }
    }
}

fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() {
        ""
    } else {
        "[REDACTED]"
    }
}
