//! Voice AI Harness - black-box test harness for conversational Voice AI APIs
//!
//! Drives a running service over HTTP and checks what comes back: how fast,
//! whether the response honours its contract, and whether the turn landed in
//! the service's database.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Value types, latency classification, grounding checks, ports
//! - **Adapters Layer** (`adapters`): SQLite and PostgreSQL conversation stores
//! - **Infrastructure Layer** (`infrastructure`): HTTP client, validators, config, logging
//! - **Service Layer** (`services`): Persistence verifier and scenario suites
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use voiceai_harness::{ApiSessionClient, Config, ScenarioRunner, Suite};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let client = ApiSessionClient::new(&config.api)?;
//!     let mut runner = ScenarioRunner::new(client, config, None);
//!     let outcomes = runner.run(&[Suite::Normal], |_| {}).await;
//!     println!("{} scenarios ran", outcomes.len());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    ApiConfig, Config, ConversationRecord, ConversationResponse, ConversationTurn, DatabaseConfig,
    LatencyClassifier, LatencyResult, LatencyStatus, SessionMetrics,
};
pub use domain::{StoreError, ValidationError};
pub use infrastructure::api::{ApiError, ApiSessionClient, RawResponse, TimedResponse};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::validators::{ResponseValidator, SchemaId, SchemaRegistry};
pub use services::{Lookup, PersistenceVerifier, ScenarioOutcome, ScenarioRunner, ScenarioStatus, Suite};
