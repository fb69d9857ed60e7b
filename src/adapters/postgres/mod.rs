//! PostgreSQL adapter for the service's conversation store.

pub mod conversation_store;

pub use conversation_store::PostgresConversationStore;
