//! PostgreSQL implementation of the ConversationStore.
//!
//! Columns are cast in SQL so the decoded types do not depend on how the
//! service declared its table (`numeric` confidence, `timestamp` without zone).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgConnectOptions;
use sqlx::{ConnectOptions, Connection, PgConnection};
use std::str::FromStr;

use crate::adapters::MetricsRow;
use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::models::{ConversationRecord, SessionMetrics};
use crate::domain::ports::ConversationStore;

pub struct PostgresConversationStore {
    conn: Option<PgConnection>,
}

impl PostgresConversationStore {
    /// Open one connection; non-empty credentials override those in the URL
    pub async fn connect(database_url: &str, username: &str, password: &str) -> StoreResult<Self> {
        let mut options = PgConnectOptions::from_str(database_url)
            .map_err(|_| StoreError::UnsupportedUrl(database_url.to_string()))?;
        if !username.is_empty() {
            options = options.username(username);
        }
        if !password.is_empty() {
            options = options.password(password);
        }

        let conn = options.connect().await.map_err(StoreError::Connection)?;
        Ok(Self { conn: Some(conn) })
    }

    fn conn(&mut self) -> StoreResult<&mut PgConnection> {
        self.conn.as_mut().ok_or(StoreError::Closed)
    }
}

#[async_trait]
impl ConversationStore for PostgresConversationStore {
    async fn latest_for_input(
        &mut self,
        session_id: &str,
        user_input: &str,
    ) -> StoreResult<Option<ConversationRecord>> {
        let row: Option<ConversationRow> = sqlx::query_as(
            r#"SELECT id::int8 AS id, session_id, user_input, ai_response, intent,
                      confidence::float8 AS confidence, created_at::timestamptz AS created_at,
                      is_fallback
               FROM conversations
               WHERE session_id = $1 AND user_input = $2
               ORDER BY created_at DESC, id DESC LIMIT 1"#,
        )
        .bind(session_id)
        .bind(user_input)
        .fetch_optional(self.conn()?)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn latest_in_session(&mut self, session_id: &str) -> StoreResult<Option<ConversationRecord>> {
        let row: Option<ConversationRow> = sqlx::query_as(
            r#"SELECT id::int8 AS id, session_id, user_input, ai_response, intent,
                      confidence::float8 AS confidence, created_at::timestamptz AS created_at,
                      is_fallback
               FROM conversations
               WHERE session_id = $1
               ORDER BY created_at DESC, id DESC LIMIT 1"#,
        )
        .bind(session_id)
        .fetch_optional(self.conn()?)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn count_for_session(&mut self, session_id: &str) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conversations WHERE session_id = $1")
            .bind(session_id)
            .fetch_one(self.conn()?)
            .await?;

        u64::try_from(count).map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn metrics_for_session(&mut self, session_id: &str) -> StoreResult<Option<SessionMetrics>> {
        let row: MetricsRow = sqlx::query_as(
            r#"SELECT COUNT(*) AS total_interactions,
                      COALESCE(AVG(response_time_ms), 0)::float8 AS avg_response_time,
                      COALESCE(AVG(confidence), 0)::float8 AS avg_confidence
               FROM conversations WHERE session_id = $1"#,
        )
        .bind(session_id)
        .fetch_one(self.conn()?)
        .await?;

        row.into_metrics()
    }

    async fn close(&mut self) -> StoreResult<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().await?;
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[derive(sqlx::FromRow)]
struct ConversationRow {
    id: i64,
    session_id: String,
    user_input: String,
    ai_response: Option<String>,
    intent: Option<String>,
    confidence: Option<f64>,
    created_at: DateTime<Utc>,
    is_fallback: Option<bool>,
}

impl From<ConversationRow> for ConversationRecord {
    fn from(row: ConversationRow) -> Self {
        Self {
            id: row.id,
            session_id: row.session_id,
            user_input: row.user_input,
            ai_response: row.ai_response,
            intent: row.intent,
            confidence: row.confidence.unwrap_or_default(),
            created_at: row.created_at,
            is_fallback: row.is_fallback.unwrap_or_default(),
        }
    }
}
