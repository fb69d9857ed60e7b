//! Unusual inputs and boundary conditions.

use super::{ensure, expect_status, ScenarioContext, ScenarioError, ScenarioResult};

const SPECIAL_INPUT: &str = "What's the weather? <script>alert('test')</script> @#$%^&*()";
const UNICODE_INPUT: &str = "What's the weather today? 🌤️ ñ é ü 中文";
const SQL_INJECTION_INPUT: &str = "'; DROP TABLE conversations; --";
const INVALID_SESSION_ID: &str = "invalid-session-12345";

pub(super) async fn empty_input(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let session_id = ctx.new_session().await?;
    let timed = ctx.client.send_query("", &session_id).await?;
    expect_status(&timed.response, &[200, 400])?;

    let response = timed.response.conversation()?;
    ensure(response.is_fallback, || {
        "Empty input should trigger fallback".to_string()
    })?;
    ctx.note(format!("status {}", timed.response.status));
    Ok(())
}

/// 5000 characters; rejecting it as too large is acceptable
pub(super) async fn very_long_input(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let session_id = ctx.new_session().await?;
    let input = "What is the weather ".repeat(250);
    let timed = ctx.client.send_query(&input, &session_id).await?;
    expect_status(&timed.response, &[200, 400, 413])?;
    ctx.note(format!(
        "{} chars answered with status {} in {}ms",
        input.len(),
        timed.response.status,
        timed.elapsed_ms
    ));
    Ok(())
}

pub(super) async fn special_characters(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let session_id = ctx.new_session().await?;
    let timed = ctx.client.send_query(SPECIAL_INPUT, &session_id).await?;
    expect_status(&timed.response, &[200])?;

    let response = timed.response.conversation()?;
    let text = response
        .response_text
        .as_deref()
        .ok_or_else(|| ScenarioError::assertion("response_text should not be null"))?;
    ensure(!text.contains("<script>"), || {
        "Response should not contain injected scripts".to_string()
    })
}

pub(super) async fn unicode_and_emoji(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let session_id = ctx.new_session().await?;
    let timed = ctx.client.send_query(UNICODE_INPUT, &session_id).await?;
    expect_status(&timed.response, &[200])?;

    let response = timed.response.conversation()?;
    ensure(response.response_text.is_some(), || {
        "response_text should not be null".to_string()
    })
}

/// The store must still answer after the service saw an injection attempt
pub(super) async fn sql_injection(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let session_id = ctx.new_session().await?;
    let timed = ctx.client.send_query(SQL_INJECTION_INPUT, &session_id).await?;
    expect_status(&timed.response, &[200, 400])?;

    if let Some(verifier) = ctx.verifier() {
        let count = verifier.conversation_count(&session_id).await;
        ensure(!count.is_failed(), || {
            format!("Database should still be accessible: {count:?}")
        })?;
    }
    Ok(())
}

pub(super) async fn invalid_session_id(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let timed = ctx.client.send_query("Hello", INVALID_SESSION_ID).await?;
    expect_status(&timed.response, &[400, 401, 404])?;
    ctx.note(format!("rejected with status {}", timed.response.status));
    Ok(())
}
