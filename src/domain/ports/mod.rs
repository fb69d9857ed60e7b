//! Port trait definitions (Hexagonal Architecture)
//!
//! - ConversationStore: read access to the service's persisted conversations

pub mod conversation_store;

pub use conversation_store::ConversationStore;
