//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - Pretty or JSON console output on stderr
//! - JSON file output through tracing-appender
//! - Secret redaction for anything echoed back to the user

pub mod logger;
pub mod redaction;

pub use logger::LoggerImpl;
pub use redaction::SecretRedactor;
