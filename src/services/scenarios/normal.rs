//! Happy-path conversation.

use tracing::warn;

use super::{ensure, expect_status, stored, ScenarioContext, ScenarioError, ScenarioResult};
use crate::infrastructure::validators::ResponseValidator;

const WEATHER_INPUT: &str = "What's the weather today?";
const WEATHER_INTENT: &str = "weather_query";
const WEATHER_MIN_CONFIDENCE: f64 = 0.8;

/// Weather question: intent, confidence, wording, latency, and persistence
pub(super) async fn weather_query(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let session_id = ctx.new_session().await?;

    let timed = ctx.client.send_query(WEATHER_INPUT, &session_id).await?;
    expect_status(&timed.response, &[200])?;

    let response = timed.response.conversation()?;
    ResponseValidator::ensure_intent(&response, WEATHER_INTENT)?;
    ResponseValidator::ensure_confidence(&response, WEATHER_MIN_CONFIDENCE)?;
    ensure(response.response_text.is_some(), || {
        "response_text should not be null".to_string()
    })?;
    ResponseValidator::contains_keywords(&response, ["weather"])?;

    let latency = ctx.classifier.classify(timed.elapsed_ms);
    ensure(latency.within_threshold, || {
        format!(
            "Latency {}ms exceeds threshold {}ms",
            latency.latency_ms,
            ctx.classifier.maximum_ms()
        )
    })?;
    if latency.is_degraded() {
        warn!(latency_ms = latency.latency_ms, "weather query slower than acceptable");
        ctx.note(format!(
            "latency {}ms above acceptable {}ms",
            latency.latency_ms,
            ctx.classifier.acceptable_ms()
        ));
    }

    ctx.note(format!(
        "intent={} confidence={:.2} latency={}ms",
        response.intent.as_deref().unwrap_or_default(),
        response.confidence.unwrap_or_default(),
        latency.latency_ms
    ));

    if let Some(verifier) = ctx.persisted().await {
        let lookup = verifier.find_latest_conversation(&session_id, WEATHER_INPUT).await;
        let record = stored(lookup, "latest conversation")?
            .ok_or_else(|| ScenarioError::assertion("Conversation should be logged in database"))?;
        ensure(record.intent.as_deref() == Some(WEATHER_INTENT), || {
            format!(
                "Intent in DB should match expected: expected '{WEATHER_INTENT}', got '{}'",
                record.intent.as_deref().unwrap_or("<none>")
            )
        })?;
    }

    Ok(())
}
