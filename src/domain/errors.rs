//! Domain errors for the Voice AI harness.

use thiserror::Error;

/// A response broke its structural or semantic contract.
///
/// Messages name the violated expectation so they read as assertion failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Required field missing: {0}")]
    MissingField(&'static str),

    #[error("Intent mismatch: expected '{expected}', got '{}'", .actual.as_deref().unwrap_or("<none>"))]
    IntentMismatch {
        expected: String,
        actual: Option<String>,
    },

    #[error("Confidence {} below minimum {minimum}", .actual.map_or_else(|| "<none>".to_string(), |c| c.to_string()))]
    ConfidenceBelowMinimum { actual: Option<f64>, minimum: f64 },

    #[error("Response doesn't contain keyword: {0}")]
    MissingKeyword(String),

    #[error("Response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Schema '{schema}' violated: {}", .violations.join(", "))]
    SchemaViolation {
        schema: &'static str,
        violations: Vec<String>,
    },

    #[error("Schema '{schema}' could not be loaded: {reason}")]
    SchemaUnavailable { schema: String, reason: String },
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// A read against the backing store failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unsupported database URL: {0}")]
    UnsupportedUrl(String),

    #[error("Connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Row decode failed: {0}")]
    Decode(String),

    #[error("Connection already closed")]
    Closed,
}

pub type StoreResult<T> = Result<T, StoreError>;
