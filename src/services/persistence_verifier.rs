//! Persistence verification against the service's backing store.
//!
//! Read failures never propagate: each operation reports them as
//! [`Lookup::Failed`] after logging the cause, so a flaky store reads as a
//! failed check in the scenario rather than an aborted batch.

use tracing::{debug, instrument, warn};

use crate::adapters::open_store;
use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::models::{ConversationRecord, DatabaseConfig, SessionMetrics};
use crate::domain::ports::ConversationStore;

/// Outcome of one persistence read
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    /// The query ran and matched nothing
    Missing,
    /// The query could not run; carries the logged cause
    Failed(String),
}

impl<T> Lookup<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Missing | Self::Failed(_) => None,
        }
    }

    /// The sentinel value: absent records, `false`, and zero all come from here
    pub fn value_or_default(self) -> T
    where
        T: Default,
    {
        self.into_option().unwrap_or_default()
    }

    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::Missing => Lookup::Missing,
            Self::Failed(cause) => Lookup::Failed(cause),
        }
    }
}

/// Confirms that turns sent through the API were durably recorded
///
/// Owns a single store connection; one verifier serves one caller at a time.
pub struct PersistenceVerifier {
    store: Box<dyn ConversationStore>,
}

impl PersistenceVerifier {
    /// Connect using `db.*` settings; connection failure is returned, not swallowed
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        Ok(Self::new(open_store(config).await?))
    }

    pub fn new(store: Box<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Most recent row for `(session_id, user_input)`
    #[instrument(skip(self))]
    pub async fn find_latest_conversation(
        &mut self,
        session_id: &str,
        user_input: &str,
    ) -> Lookup<ConversationRecord> {
        let result = self.store.latest_for_input(session_id, user_input).await;
        let result = result.map(|row| row.map_or(Lookup::Missing, Lookup::Found));
        self.settle("find_latest_conversation", session_id, result)
    }

    /// Whether the session's most recent row carries `expected_intent`
    ///
    /// `Missing` when the session has no rows.
    #[instrument(skip(self))]
    pub async fn intent_was_captured(&mut self, session_id: &str, expected_intent: &str) -> Lookup<bool> {
        let result = self.store.latest_in_session(session_id).await.map(|row| match row {
            Some(record) => Lookup::Found(record.intent.as_deref() == Some(expected_intent)),
            None => Lookup::Missing,
        });
        self.settle("intent_was_captured", session_id, result)
    }

    /// Fallback flag of the session's most recent row
    #[instrument(skip(self))]
    pub async fn fallback_was_logged(&mut self, session_id: &str) -> Lookup<bool> {
        let result = self.store.latest_in_session(session_id).await.map(|row| match row {
            Some(record) => Lookup::Found(record.is_fallback),
            None => Lookup::Missing,
        });
        self.settle("fallback_was_logged", session_id, result)
    }

    /// Rows recorded for the session; zero is `Found(0)`
    #[instrument(skip(self))]
    pub async fn conversation_count(&mut self, session_id: &str) -> Lookup<u64> {
        let result = self.store.count_for_session(session_id).await.map(Lookup::Found);
        self.settle("conversation_count", session_id, result)
    }

    /// Aggregates over the session
    ///
    /// An empty session is `Missing`; `value_or_default()` turns it into
    /// zeroed metrics.
    #[instrument(skip(self))]
    pub async fn session_metrics(&mut self, session_id: &str) -> Lookup<SessionMetrics> {
        let result = self
            .store
            .metrics_for_session(session_id)
            .await
            .map(|metrics| metrics.map_or(Lookup::Missing, Lookup::Found));
        self.settle("session_metrics", session_id, result)
    }

    /// Release the connection; later lookups report `Failed`
    pub async fn close(&mut self) -> StoreResult<()> {
        self.store.close().await?;
        debug!(backend = self.store.backend(), "conversation store closed");
        Ok(())
    }

    fn settle<T>(
        &self,
        operation: &'static str,
        session_id: &str,
        result: Result<Lookup<T>, StoreError>,
    ) -> Lookup<T> {
        match result {
            Ok(lookup) => lookup,
            Err(err) => {
                warn!(
                    operation,
                    session_id,
                    backend = self.store.backend(),
                    error = %err,
                    "persistence read failed"
                );
                Lookup::Failed(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;

    /// In-memory store that can be told to fail every query
    #[derive(Default)]
    struct FakeStore {
        rows: Vec<ConversationRecord>,
        broken: bool,
        closed: bool,
    }

    impl FakeStore {
        fn check(&self) -> StoreResult<()> {
            if self.closed {
                Err(StoreError::Closed)
            } else if self.broken {
                Err(StoreError::Decode("disk I/O error".to_string()))
            } else {
                Ok(())
            }
        }

        fn session(&self, session_id: &str) -> impl Iterator<Item = &ConversationRecord> {
            let session_id = session_id.to_string();
            self.rows.iter().filter(move |r| r.session_id == session_id)
        }
    }

    #[async_trait]
    impl ConversationStore for FakeStore {
        async fn latest_for_input(
            &mut self,
            session_id: &str,
            user_input: &str,
        ) -> StoreResult<Option<ConversationRecord>> {
            self.check()?;
            Ok(self
                .session(session_id)
                .filter(|r| r.user_input == user_input)
                .max_by_key(|r| (r.created_at, r.id))
                .cloned())
        }

        async fn latest_in_session(&mut self, session_id: &str) -> StoreResult<Option<ConversationRecord>> {
            self.check()?;
            Ok(self.session(session_id).max_by_key(|r| (r.created_at, r.id)).cloned())
        }

        async fn count_for_session(&mut self, session_id: &str) -> StoreResult<u64> {
            self.check()?;
            Ok(self.session(session_id).count() as u64)
        }

        async fn metrics_for_session(&mut self, session_id: &str) -> StoreResult<Option<SessionMetrics>> {
            self.check()?;
            let rows: Vec<_> = self.session(session_id).collect();
            if rows.is_empty() {
                return Ok(None);
            }
            let n = rows.len() as f64;
            Ok(Some(SessionMetrics {
                total_interactions: rows.len() as u64,
                avg_response_time: 0.0,
                avg_confidence: rows.iter().map(|r| r.confidence).sum::<f64>() / n,
            }))
        }

        async fn close(&mut self) -> StoreResult<()> {
            self.closed = true;
            Ok(())
        }

        fn backend(&self) -> &'static str {
            "fake"
        }
    }

    fn record(id: i64, session_id: &str, input: &str, intent: &str, is_fallback: bool) -> ConversationRecord {
        ConversationRecord {
            id,
            session_id: session_id.to_string(),
            user_input: input.to_string(),
            ai_response: Some("ok".to_string()),
            intent: Some(intent.to_string()),
            confidence: 0.8,
            created_at: Utc::now(),
            is_fallback,
        }
    }

    fn verifier(rows: Vec<ConversationRecord>) -> PersistenceVerifier {
        PersistenceVerifier::new(Box::new(FakeStore {
            rows,
            ..Default::default()
        }))
    }

    fn broken() -> PersistenceVerifier {
        PersistenceVerifier::new(Box::new(FakeStore {
            broken: true,
            ..Default::default()
        }))
    }

    #[tokio::test]
    async fn test_intent_without_rows_is_false() {
        let mut verifier = verifier(vec![]);
        let lookup = verifier.intent_was_captured("s1", "weather_query").await;
        assert_eq!(lookup, Lookup::Missing);
        assert!(!lookup.value_or_default());
    }

    #[tokio::test]
    async fn test_intent_of_latest_row() {
        let mut verifier = verifier(vec![
            record(1, "s1", "hi", "greeting", false),
            record(2, "s1", "weather?", "weather_query", false),
        ]);
        assert_eq!(verifier.intent_was_captured("s1", "weather_query").await, Lookup::Found(true));
        assert_eq!(verifier.intent_was_captured("s1", "greeting").await, Lookup::Found(false));
    }

    #[tokio::test]
    async fn test_fallback_and_count() {
        let mut verifier = verifier(vec![
            record(1, "s1", "hi", "greeting", false),
            record(2, "s1", "asdf", "unknown", true),
        ]);
        assert!(verifier.fallback_was_logged("s1").await.value_or_default());
        assert_eq!(verifier.conversation_count("s1").await, Lookup::Found(2));
        assert_eq!(verifier.conversation_count("s2").await, Lookup::Found(0));
    }

    #[tokio::test]
    async fn test_empty_session_metrics_default_to_zero() {
        let mut verifier = verifier(vec![]);
        let lookup = verifier.session_metrics("s1").await;
        assert_eq!(lookup, Lookup::Missing);
        assert_eq!(lookup.value_or_default(), SessionMetrics::default());
    }

    #[tokio::test]
    async fn test_failures_become_sentinels() {
        let mut verifier = broken();

        let record = verifier.find_latest_conversation("s1", "hi").await;
        assert!(record.is_failed());
        assert!(record.into_option().is_none());

        assert!(!verifier.intent_was_captured("s1", "x").await.value_or_default());
        assert!(!verifier.fallback_was_logged("s1").await.value_or_default());
        assert_eq!(verifier.conversation_count("s1").await.value_or_default(), 0);
        assert_eq!(
            verifier.session_metrics("s1").await.value_or_default(),
            SessionMetrics::default()
        );
    }

    #[tokio::test]
    async fn test_failure_keeps_cause() {
        let mut verifier = broken();
        match verifier.conversation_count("s1").await {
            Lookup::Failed(cause) => assert!(cause.contains("disk I/O error")),
            other => panic!("Expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_lookups_after_close_fail() {
        let mut verifier = verifier(vec![record(1, "s1", "hi", "greeting", false)]);
        verifier.close().await.unwrap();
        assert!(verifier.conversation_count("s1").await.is_failed());
    }

    #[test]
    fn test_lookup_map() {
        assert_eq!(Lookup::Found(2).map(|n| n * 2), Lookup::Found(4));
        assert_eq!(Lookup::<u8>::Missing.map(|n| n + 1), Lookup::Missing);
    }
}
