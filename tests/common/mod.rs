//! Common test utilities for integration tests
//!
//! Fixtures shared by the API, persistence and scenario tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use voiceai_harness::domain::models::{ApiConfig, Config};

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Path to a SQLite database file in a fresh temporary directory
pub fn temp_db_path() -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let db_path = dir.path().join("conversations.db");
    (dir, db_path)
}

/// Setup test logging
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub const TEST_TOKEN: &str = "test-token";

/// API settings pointing at a mock server
pub fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        auth_token: TEST_TOKEN.to_string(),
        timeout_secs: 5,
        ..ApiConfig::default()
    }
}

/// Harness configuration pointing at a mock server, schemas from the crate
pub fn config(base_url: &str) -> Config {
    let mut config = Config {
        api: api_config(base_url),
        ..Config::default()
    };
    config.schemas.dir = concat!(env!("CARGO_MANIFEST_DIR"), "/schemas").to_string();
    config.db.write_settle_ms = 0;
    config
}

/// Well-formed chat response body
pub fn chat_body(session_id: &str, text: &str, intent: &str, confidence: f64) -> Value {
    json!({
        "session_id": session_id,
        "response_text": text,
        "intent": intent,
        "confidence": confidence,
        "response_time_ms": 120,
        "is_fallback": false,
        "entities": {},
        "status": "success",
        "error": null
    })
}
