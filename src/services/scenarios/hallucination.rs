//! Factual accuracy and uncertainty signalling.

use super::{ensure, expect_status, ScenarioContext, ScenarioResult};
use crate::domain::models::ConversationResponse;
use crate::infrastructure::validators::ResponseValidator;

const UNCERTAIN_PHRASES: [&str; 2] = ["not sure", "don't know"];
const NO_INFORMATION_PHRASES: [&str; 3] = ["don't have", "not familiar", "can't find"];

fn mentions_any(response: &ConversationResponse, phrases: &[&str]) -> bool {
    let text = response.text().to_lowercase();
    phrases.iter().any(|phrase| text.contains(phrase))
}

/// A factual question must be answered with at least the acceptable
/// confidence; hedging does not excuse a low score
pub(super) async fn factual_accuracy(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let session_id = ctx.new_session().await?;
    let timed = ctx
        .client
        .send_query("What year was the company founded?", &session_id)
        .await?;
    expect_status(&timed.response, &[200])?;

    let response = timed.response.conversation()?;
    ResponseValidator::ensure_confidence(&response, ctx.config.confidence.acceptable)?;
    if mentions_any(&response, &UNCERTAIN_PHRASES) {
        ctx.note("confident answer still signals uncertainty");
    }
    ctx.note(format!(
        "confidence {:.2}",
        response.confidence.unwrap_or_default()
    ));
    Ok(())
}

pub(super) async fn unknown_topic(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let session_id = ctx.new_session().await?;
    let timed = ctx
        .client
        .send_query(
            "Tell me about the fictional product XYZ-9999 that doesn't exist",
            &session_id,
        )
        .await?;
    expect_status(&timed.response, &[200])?;

    let response = timed.response.conversation()?;
    let handled = response.is_fallback
        || response.confidence.unwrap_or_default() < ctx.config.confidence.minimum
        || mentions_any(&response, &NO_INFORMATION_PHRASES);
    ensure(handled, || {
        "Unknown topics should be handled with uncertainty or fallback".to_string()
    })
}

/// Two phrasings of one question; both answers go in the report for review
pub(super) async fn contradictory_information(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let session_id = ctx.new_session().await?;

    let first = ctx
        .client
        .send_query("What are your business hours?", &session_id)
        .await?
        .response
        .conversation()?;
    let second = ctx
        .client
        .send_query("What time do you open and close?", &session_id)
        .await?
        .response
        .conversation()?;

    ctx.note(format!("first answer: {}", first.text()));
    ctx.note(format!("second answer: {}", second.text()));
    Ok(())
}

pub(super) async fn out_of_scope(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let session_id = ctx.new_session().await?;
    let timed = ctx
        .client
        .send_query("What is the meaning of life and the universe?", &session_id)
        .await?;
    expect_status(&timed.response, &[200])?;

    let response = timed.response.conversation()?;
    let minimum = ctx.config.confidence.minimum;
    ensure(
        response.is_fallback || response.confidence.unwrap_or_default() < minimum,
        || "Out-of-scope questions should have low confidence or trigger fallback".to_string(),
    )
}

pub(super) async fn confidence_threshold(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let session_id = ctx.new_session().await?;
    let response = ctx
        .client
        .send_query("What services do you offer?", &session_id)
        .await?
        .response
        .conversation()?;

    let confidence = response.confidence.unwrap_or_default();
    if confidence >= ctx.config.confidence.high {
        ensure(!response.is_fallback, || {
            "High confidence responses should not be fallbacks".to_string()
        })?;
        ensure(response.intent.is_some(), || {
            "High confidence responses should have a clear intent".to_string()
        })?;
    }
    ctx.note(format!("confidence {confidence:.2}"));
    Ok(())
}
