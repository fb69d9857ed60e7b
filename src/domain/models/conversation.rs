//! Conversation value types exchanged with, and persisted by, the service under test.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Status marker the service uses for a successful turn
pub const SUCCESS_STATUS: &str = "success";

/// One user turn sent to the chat endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub session_id: String,
    pub user_input: String,
    /// Epoch milliseconds at construction
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_data: Option<String>,
}

impl ConversationTurn {
    /// Text-only turn stamped with the current time
    pub fn new(session_id: impl Into<String>, user_input: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_input: user_input.into(),
            timestamp: Utc::now().timestamp_millis(),
            voice_data: None,
        }
    }

    /// Turn carrying an encoded audio payload
    pub fn with_voice_data(
        session_id: impl Into<String>,
        user_input: impl Into<String>,
        voice_data: impl Into<String>,
    ) -> Self {
        Self {
            voice_data: Some(voice_data.into()),
            ..Self::new(session_id, user_input)
        }
    }
}

/// Decoded chat endpoint response
///
/// Every field is optional on the wire; presence is checked by the
/// response validator rather than by decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationResponse {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub response_text: Option<String>,
    #[serde(default)]
    pub intent: Option<String>,
    /// Nominally within `[0, 1]`; the service does not enforce it
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub response_time_ms: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_fallback: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entities: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ConversationResponse {
    /// Status is "success" (any case) and no error field was sent
    pub fn is_success(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(SUCCESS_STATUS))
            && self.error.is_none()
    }

    /// An error field was sent and it is non-empty
    pub fn has_error(&self) -> bool {
        self.error.as_deref().is_some_and(|e| !e.is_empty())
    }

    pub fn text(&self) -> &str {
        self.response_text.as_deref().unwrap_or_default()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Durable row written by the service for one conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: i64,
    pub session_id: String,
    pub user_input: String,
    pub ai_response: Option<String>,
    pub intent: Option<String>,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
    pub is_fallback: bool,
}

/// Aggregates over every persisted row of one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMetrics {
    pub total_interactions: u64,
    pub avg_response_time: f64,
    pub avg_confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> ConversationResponse {
        serde_json::from_value(value).expect("response should decode")
    }

    #[test]
    fn test_turn_serializes_wire_names() {
        let turn = ConversationTurn::new("s1", "Hello");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["session_id"], "s1");
        assert_eq!(json["user_input"], "Hello");
        assert!(json["timestamp"].as_i64().unwrap() > 0);
        assert!(json.get("voice_data").is_none());
    }

    #[test]
    fn test_turn_with_voice_data() {
        let turn = ConversationTurn::with_voice_data("s1", "Hello", "UklGRg==");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["voice_data"], "UklGRg==");
    }

    #[test]
    fn test_successful_response() {
        let response = decode(json!({
            "session_id": "s1",
            "response_text": "It is sunny",
            "intent": "weather_query",
            "confidence": 0.85,
            "status": "success",
            "error": null
        }));
        assert!(response.is_success());
        assert!(!response.has_error());
        assert!(!response.is_fallback);
    }

    #[test]
    fn test_status_is_case_insensitive() {
        let response = decode(json!({"status": "SUCCESS"}));
        assert!(response.is_success());
    }

    #[test]
    fn test_empty_error_is_not_an_error() {
        let response = decode(json!({
            "confidence": 0.4,
            "status": "success",
            "error": ""
        }));
        assert!(!response.has_error());
        // an error field was still sent
        assert!(!response.is_success());
    }

    #[test]
    fn test_error_response() {
        let response = decode(json!({"status": "error", "error": "session expired"}));
        assert!(response.has_error());
        assert!(!response.is_success());
    }

    #[test]
    fn test_nulls_decode_to_defaults() {
        let response = decode(json!({"is_fallback": null, "entities": null}));
        assert!(!response.is_fallback);
        assert!(response.entities.is_empty());
        assert_eq!(response.text(), "");
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let response = decode(json!({"intent": "greeting", "trace_id": "abc"}));
        assert_eq!(response.intent.as_deref(), Some("greeting"));
    }

    #[test]
    fn test_entities_decode() {
        let response = decode(json!({"entities": {"city": "Paris", "days": 3}}));
        assert_eq!(response.entities["city"], "Paris");
        assert_eq!(response.entities["days"], 3);
    }
}
