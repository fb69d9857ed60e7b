//! Adapters implementing domain ports against concrete backends.
//!
//! The conversation store backend is picked from the configured URL scheme.

pub mod postgres;
pub mod sqlite;

pub use postgres::PostgresConversationStore;
pub use sqlite::SqliteConversationStore;

use tracing::info;

use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::models::{DatabaseConfig, SessionMetrics};
use crate::domain::ports::ConversationStore;

/// Backends the harness can read conversations from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Sqlite,
    Postgres,
}

/// Classify a database URL, returning the URL sqlx should be given
///
/// A leading `jdbc:` is stripped so JDBC-style URLs keep working.
pub fn store_kind(database_url: &str) -> StoreResult<(StoreKind, &str)> {
    let url = database_url.trim();
    let url = url.strip_prefix("jdbc:").unwrap_or(url);

    if url.starts_with("sqlite:") {
        Ok((StoreKind::Sqlite, url))
    } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        Ok((StoreKind::Postgres, url))
    } else {
        Err(StoreError::UnsupportedUrl(database_url.to_string()))
    }
}

/// Connect to the store named by `db.url`
pub async fn open_store(config: &DatabaseConfig) -> StoreResult<Box<dyn ConversationStore>> {
    let (kind, url) = store_kind(&config.url)?;
    let store: Box<dyn ConversationStore> = match kind {
        StoreKind::Sqlite => Box::new(SqliteConversationStore::connect(url).await?),
        StoreKind::Postgres => Box::new(
            PostgresConversationStore::connect(url, &config.username, &config.password).await?,
        ),
    };

    info!(backend = store.backend(), "conversation store connected");
    Ok(store)
}

/// Aggregate row shared by both backends
#[derive(sqlx::FromRow)]
pub(crate) struct MetricsRow {
    total_interactions: i64,
    avg_response_time: f64,
    avg_confidence: f64,
}

impl MetricsRow {
    /// `None` when the session has no rows
    pub(crate) fn into_metrics(self) -> StoreResult<Option<SessionMetrics>> {
        let total = u64::try_from(self.total_interactions)
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        if total == 0 {
            return Ok(None);
        }
        Ok(Some(SessionMetrics {
            total_interactions: total,
            avg_response_time: self.avg_response_time,
            avg_confidence: self.avg_confidence,
        }))
    }
}
