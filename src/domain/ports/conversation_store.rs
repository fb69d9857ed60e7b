/// Conversation store port (trait) read by the persistence verifier.
///
/// Adapters wrap a single connection to the service's backing database and
/// expose the read-only lookups over its `conversations` table. Writes are
/// the service's business, never ours.
use async_trait::async_trait;

use crate::domain::errors::StoreResult;
use crate::domain::models::{ConversationRecord, SessionMetrics};

/// Read access to persisted conversation turns
///
/// Methods take `&mut self`: an adapter owns one connection and serves one
/// caller at a time.
#[async_trait]
pub trait ConversationStore: Send {
    /// Most recent row for `(session_id, user_input)`
    ///
    /// # Returns
    /// - `Some(record)` newest by `created_at`, ties broken by highest `id`
    /// - `None` if the turn has not been written
    async fn latest_for_input(
        &mut self,
        session_id: &str,
        user_input: &str,
    ) -> StoreResult<Option<ConversationRecord>>;

    /// Most recent row of the session regardless of input
    async fn latest_in_session(&mut self, session_id: &str) -> StoreResult<Option<ConversationRecord>>;

    /// Number of rows recorded for the session
    async fn count_for_session(&mut self, session_id: &str) -> StoreResult<u64>;

    /// Aggregates over the session, `None` when it has no rows
    async fn metrics_for_session(&mut self, session_id: &str) -> StoreResult<Option<SessionMetrics>>;

    /// Release the connection; later calls fail with `StoreError::Closed`
    async fn close(&mut self) -> StoreResult<()>;

    /// Backend name for log lines
    fn backend(&self) -> &'static str;
}
