//! Structural and semantic checks on chat responses
//!
//! Each check comes in two shapes: a predicate for callers that branch on the
//! answer, and an `ensure_*` form whose error names the violated expectation.

use serde_json::Value;

use super::schema::{SchemaId, SchemaRegistry};
use crate::domain::errors::{ValidationError, ValidationResult};
use crate::domain::models::ConversationResponse;

/// Fields every chat response must carry, in report order
pub const REQUIRED_FIELDS: [&str; 4] = ["response_text", "intent", "confidence", "session_id"];

/// Validates decoded chat responses; never mutates them
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseValidator;

impl ResponseValidator {
    /// Response text, intent, confidence, and session id are all present
    pub fn has_required_fields(response: &ConversationResponse) -> bool {
        Self::first_missing_field(response).is_none()
    }

    pub fn ensure_required_fields(response: &ConversationResponse) -> ValidationResult<()> {
        match Self::first_missing_field(response) {
            Some(field) => Err(ValidationError::MissingField(field)),
            None => Ok(()),
        }
    }

    fn first_missing_field(response: &ConversationResponse) -> Option<&'static str> {
        let present = [
            response.response_text.is_some(),
            response.intent.is_some(),
            response.confidence.is_some(),
            response.session_id.is_some(),
        ];
        REQUIRED_FIELDS
            .iter()
            .zip(present)
            .find_map(|(field, present)| (!present).then_some(*field))
    }

    /// Exact, case-sensitive intent equality; an absent intent never matches
    pub fn matches_intent(response: &ConversationResponse, expected: &str) -> bool {
        response.intent.as_deref() == Some(expected)
    }

    pub fn ensure_intent(response: &ConversationResponse, expected: &str) -> ValidationResult<()> {
        if Self::matches_intent(response, expected) {
            Ok(())
        } else {
            Err(ValidationError::IntentMismatch {
                expected: expected.to_string(),
                actual: response.intent.clone(),
            })
        }
    }

    /// `confidence >= minimum`, boundary included; an absent confidence fails
    pub fn meets_confidence(response: &ConversationResponse, minimum: f64) -> bool {
        response.confidence.is_some_and(|c| c >= minimum)
    }

    pub fn ensure_confidence(response: &ConversationResponse, minimum: f64) -> ValidationResult<()> {
        if Self::meets_confidence(response, minimum) {
            Ok(())
        } else {
            Err(ValidationError::ConfidenceBelowMinimum {
                actual: response.confidence,
                minimum,
            })
        }
    }

    /// Every keyword occurs in the response text, ignoring case
    ///
    /// Keywords are checked in the given order and the first absent one is
    /// reported.
    pub fn contains_keywords<I, S>(response: &ConversationResponse, keywords: I) -> ValidationResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let text = response.text().to_lowercase();
        for keyword in keywords {
            let keyword = keyword.as_ref();
            if !text.contains(&keyword.to_lowercase()) {
                return Err(ValidationError::MissingKeyword(keyword.to_string()));
            }
        }
        Ok(())
    }

    /// Full structural validation of a raw response body
    pub fn conforms_to_schema(
        registry: &SchemaRegistry,
        body: &Value,
        schema: SchemaId,
    ) -> ValidationResult<()> {
        registry.validate(schema, body)
    }

    /// [`Self::conforms_to_schema`] for an undecoded body
    pub fn conforms_to_schema_str(
        registry: &SchemaRegistry,
        body: &str,
        schema: SchemaId,
    ) -> ValidationResult<()> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| ValidationError::InvalidJson(e.to_string()))?;
        registry.validate(schema, &value)
    }
}
