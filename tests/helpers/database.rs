//! SQLite fixtures mirroring the service's `conversations` table.

#![allow(dead_code)]

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection, SqliteConnection};
use std::path::Path;
use std::str::FromStr;

/// One row as the service would write it
pub struct SeedRow<'a> {
    pub session_id: &'a str,
    pub user_input: &'a str,
    pub intent: &'a str,
    pub confidence: f64,
    pub response_time_ms: i64,
    pub is_fallback: bool,
    pub created_at: &'a str,
}

impl<'a> SeedRow<'a> {
    pub const fn new(
        session_id: &'a str,
        user_input: &'a str,
        intent: &'a str,
        created_at: &'a str,
    ) -> Self {
        Self {
            session_id,
            user_input,
            intent,
            confidence: 0.9,
            response_time_ms: 150,
            is_fallback: false,
            created_at,
        }
    }
}

pub fn database_url(path: &Path) -> String {
    format!("sqlite://{}", path.display())
}

/// Create the database file with an empty `conversations` table
pub async fn create_test_db(path: &Path) -> SqliteConnection {
    let mut conn = SqliteConnectOptions::from_str(&database_url(path))
        .expect("valid sqlite url")
        .create_if_missing(true)
        .connect()
        .await
        .expect("failed to create test database");

    sqlx::query(
        "CREATE TABLE conversations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id TEXT NOT NULL,
            user_input TEXT NOT NULL,
            ai_response TEXT,
            intent TEXT,
            confidence REAL,
            response_time_ms INTEGER,
            is_fallback BOOLEAN DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(&mut conn)
    .await
    .expect("failed to create conversations table");

    conn
}

pub async fn insert_rows(conn: &mut SqliteConnection, rows: &[SeedRow<'_>]) {
    for row in rows {
        sqlx::query(
            "INSERT INTO conversations
             (session_id, user_input, ai_response, intent, confidence, response_time_ms, is_fallback, created_at)
             VALUES (?, ?, 'reply', ?, ?, ?, ?, ?)",
        )
        .bind(row.session_id)
        .bind(row.user_input)
        .bind(row.intent)
        .bind(row.confidence)
        .bind(row.response_time_ms)
        .bind(row.is_fallback)
        .bind(row.created_at)
        .execute(&mut *conn)
        .await
        .expect("failed to insert conversation");
    }
}

/// Teardown test database connection
pub async fn teardown_test_db(conn: SqliteConnection) {
    conn.close().await.expect("failed to close test database");
}
