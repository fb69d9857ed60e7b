//! SQLite implementation of the ConversationStore.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection, SqliteConnection};
use std::str::FromStr;
use std::time::Duration;

use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::models::{ConversationRecord, SessionMetrics};
use crate::adapters::MetricsRow;
use crate::domain::ports::ConversationStore;

pub struct SqliteConversationStore {
    conn: Option<SqliteConnection>,
}

impl SqliteConversationStore {
    /// Open one connection to an existing database
    ///
    /// The file is never created; a missing database is a connection error.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|_| StoreError::UnsupportedUrl(database_url.to_string()))?
            .busy_timeout(Duration::from_secs(5));

        let conn = options.connect().await.map_err(StoreError::Connection)?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: SqliteConnection) -> Self {
        Self { conn: Some(conn) }
    }

    fn conn(&mut self) -> StoreResult<&mut SqliteConnection> {
        self.conn.as_mut().ok_or(StoreError::Closed)
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    async fn latest_for_input(
        &mut self,
        session_id: &str,
        user_input: &str,
    ) -> StoreResult<Option<ConversationRecord>> {
        let row: Option<ConversationRow> = sqlx::query_as(
            r#"SELECT id, session_id, user_input, ai_response, intent, confidence, created_at, is_fallback
               FROM conversations
               WHERE session_id = ? AND user_input = ?
               ORDER BY created_at DESC, id DESC LIMIT 1"#,
        )
        .bind(session_id)
        .bind(user_input)
        .fetch_optional(self.conn()?)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn latest_in_session(&mut self, session_id: &str) -> StoreResult<Option<ConversationRecord>> {
        let row: Option<ConversationRow> = sqlx::query_as(
            r#"SELECT id, session_id, user_input, ai_response, intent, confidence, created_at, is_fallback
               FROM conversations
               WHERE session_id = ?
               ORDER BY created_at DESC, id DESC LIMIT 1"#,
        )
        .bind(session_id)
        .fetch_optional(self.conn()?)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn count_for_session(&mut self, session_id: &str) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conversations WHERE session_id = ?")
            .bind(session_id)
            .fetch_one(self.conn()?)
            .await?;

        u64::try_from(count).map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn metrics_for_session(&mut self, session_id: &str) -> StoreResult<Option<SessionMetrics>> {
        let row: MetricsRow = sqlx::query_as(
            r#"SELECT COUNT(*) AS total_interactions,
                      COALESCE(AVG(response_time_ms), 0.0) AS avg_response_time,
                      COALESCE(AVG(confidence), 0.0) AS avg_confidence
               FROM conversations WHERE session_id = ?"#,
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
        "sqlite"
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
    created_at: String,
    is_fallback: Option<bool>,
}

impl TryFrom<ConversationRow> for ConversationRecord {
    type Error = StoreError;

    fn try_from(row: ConversationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            session_id: row.session_id,
            user_input: row.user_input,
            ai_response: row.ai_response,
            intent: row.intent,
            confidence: row.confidence.unwrap_or_default(),
            created_at: parse_timestamp(&row.created_at)?,
            is_fallback: row.is_fallback.unwrap_or_default(),
        })
    }
}

/// SQLite has no timestamp type: accept RFC3339 and `CURRENT_TIMESTAMP` text
fn parse_timestamp(raw: &str) -> StoreResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| StoreError::Decode(format!("invalid created_at '{raw}'")))
}
