//! Complete user journeys across several turns.

use serde_json::Value;

use super::{ensure, expect_status, stored, ScenarioContext, ScenarioResult};

const MULTI_TURN: [&str; 5] = [
    "Hi there",
    "I need to book an appointment",
    "Tomorrow at 2pm",
    "Yes, that works",
    "Thank you",
];

pub(super) async fn customer_support_workflow(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let session_id = ctx.new_session().await?;

    let greeting = ctx.client.send_query("Hello, I need help", &session_id).await?;
    expect_status(&greeting.response, &[200])?;
    ensure(greeting.response.conversation()?.response_text.is_some(), || {
        "Greeting should be answered".to_string()
    })?;

    let query = ctx
        .client
        .send_query("I want to check my order status", &session_id)
        .await?;
    expect_status(&query.response, &[200])?;
    let order = query.response.conversation()?;
    ensure(order.intent.is_some(), || {
        "Order status query should be classified".to_string()
    })?;
    ctx.note(format!(
        "order intent {}",
        order.intent.as_deref().unwrap_or_default()
    ));

    let follow_up = ctx.client.send_query("When will it arrive?", &session_id).await?;
    expect_status(&follow_up.response, &[200])?;

    let history: Vec<Value> = ctx.client.get_history(&session_id).await?.decode()?;
    ensure(history.len() >= 3, || {
        format!("History should hold at least 3 turns, got {}", history.len())
    })?;

    if let Some(verifier) = ctx.persisted().await {
        let lookup = verifier.conversation_count(&session_id).await;
        let count = stored(lookup, "conversation count")?.unwrap_or_default();
        ensure(count >= 3, || {
            format!("All conversations should be logged: expected at least 3, got {count}")
        })?;
    }
    Ok(())
}

pub(super) async fn multi_turn_conversation(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let session_id = ctx.new_session().await?;

    for turn in MULTI_TURN {
        let timed = ctx.client.send_query(turn, &session_id).await?;
        expect_status(&timed.response, &[200])?;
        let response = timed.response.conversation()?;
        ctx.note(format!(
            "{turn} -> {}",
            response.intent.as_deref().unwrap_or("<none>")
        ));
    }

    if let Some(verifier) = ctx.persisted().await {
        let lookup = verifier.session_metrics(&session_id).await;
        let metrics = stored(lookup, "session metrics")?.unwrap_or_default();
        let expected = MULTI_TURN.len() as u64;
        ensure(metrics.total_interactions == expected, || {
            format!(
                "All turns should be recorded: expected {expected}, got {}",
                metrics.total_interactions
            )
        })?;
    }
    Ok(())
}

/// A gibberish turn must not leave the session stuck in fallback
pub(super) async fn error_recovery_workflow(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let session_id = ctx.new_session().await?;

    let valid = ctx.client.send_query("Hello", &session_id).await?;
    expect_status(&valid.response, &[200])?;

    let gibberish = ctx
        .client
        .send_query("asdfghjkl random gibberish", &session_id)
        .await?;
    expect_status(&gibberish.response, &[200])?;
    let fallback = gibberish.response.conversation()?;
    ctx.note(format!("gibberish fallback={}", fallback.is_fallback));

    let recovery = ctx
        .client
        .send_query_validated("What can you help me with?", &session_id)
        .await?;
    let recovered = recovery.response.conversation()?;
    ensure(!recovered.is_fallback, || {
        "Recovery query should not be a fallback".to_string()
    })
}
