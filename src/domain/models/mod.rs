pub mod config;
pub mod conversation;
pub mod grounding;
pub mod latency;

pub use config::{
    ApiConfig, ConfidenceConfig, Config, DatabaseConfig, LatencyConfig, LoggingConfig,
    SchemaConfig,
};
pub use conversation::{
    ConversationRecord, ConversationResponse, ConversationTurn, SessionMetrics, SUCCESS_STATUS,
};
pub use grounding::{Context, GroundingCase, GroundingCheck, GroundingReport};
pub use latency::{classify, LatencyClassifier, LatencyResult, LatencyStatus, LatencySummary};
