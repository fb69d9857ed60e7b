//! Infrastructure layer module
//!
//! External integrations used by the harness:
//! - Configuration management (figment)
//! - Logging infrastructure (tracing)
//! - HTTP client for the service under test (reqwest)
//! - Response validators and JSON schemas

pub mod api;
pub mod config;
pub mod logging;
pub mod validators;
