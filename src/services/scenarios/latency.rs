//! Response-time budgets.

use super::{ensure, expect_status, ScenarioContext, ScenarioResult};
use crate::domain::models::LatencySummary;

const SIMPLE_QUERY: &str = "Hello";
const COMPLEX_QUERY: &str = "I need to schedule a meeting for next Tuesday at 3pm \
     with the sales team to discuss quarterly targets and budget allocation";
const AVERAGE_QUERIES: [&str; 10] = [
    "Hello",
    "What's the weather?",
    "Help me",
    "What time is it?",
    "Tell me a joke",
    "What services do you offer?",
    "Contact support",
    "Schedule appointment",
    "Cancel order",
    "Track package",
];
const LOAD_QUERY: &str = "Quick test query";
const LOAD_REQUESTS: usize = 5;

pub(super) async fn simple_query(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let session_id = ctx.new_session().await?;
    let timed = ctx.client.send_query(SIMPLE_QUERY, &session_id).await?;
    expect_status(&timed.response, &[200])?;

    let budget = ctx.classifier.simple_query_ms();
    ensure(ctx.classifier.simple_query_ok(timed.elapsed_ms), || {
        format!(
            "Simple query latency {}ms exceeds threshold {budget}ms",
            timed.elapsed_ms
        )
    })?;
    ctx.note(format!("latency {}ms (threshold {budget}ms)", timed.elapsed_ms));
    Ok(())
}

pub(super) async fn complex_query(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let session_id = ctx.new_session().await?;
    let timed = ctx.client.send_query(COMPLEX_QUERY, &session_id).await?;
    expect_status(&timed.response, &[200])?;

    let result = ctx.classifier.classify(timed.elapsed_ms);
    ensure(result.within_threshold, || {
        format!(
            "Complex query latency {}ms exceeds maximum {}ms",
            result.latency_ms,
            ctx.classifier.maximum_ms()
        )
    })?;
    ctx.note(format!(
        "latency {}ms (max {}ms, {})",
        result.latency_ms,
        ctx.classifier.maximum_ms(),
        result.status()
    ));
    Ok(())
}

/// Mean over ten varied queries must stay within the acceptable budget
pub(super) async fn average(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let session_id = ctx.new_session().await?;

    let mut samples = Vec::with_capacity(AVERAGE_QUERIES.len());
    for query in AVERAGE_QUERIES {
        let timed = ctx.client.send_query(query, &session_id).await?;
        samples.push(timed.elapsed_ms);
        expect_status(&timed.response, &[200, 400])?;
    }

    let Some(summary) = LatencySummary::from_samples(&samples) else {
        return Ok(());
    };
    let acceptable = ctx.classifier.acceptable_ms();
    ctx.note(format!(
        "avg {:.2}ms min {}ms max {}ms over {} requests",
        summary.mean_ms, summary.min_ms, summary.max_ms, summary.count
    ));
    #[allow(clippy::cast_precision_loss)]
    let within = summary.mean_ms <= acceptable as f64;
    ensure(within, || {
        format!(
            "Average latency {:.2}ms exceeds acceptable {acceptable}ms",
            summary.mean_ms
        )
    })
}

/// Rapid sequential requests; rate limiting (429) is a legitimate answer
pub(super) async fn under_load(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let session_id = ctx.new_session().await?;

    let mut latencies = Vec::with_capacity(LOAD_REQUESTS);
    for _ in 0..LOAD_REQUESTS {
        let timed = ctx.client.send_query(LOAD_QUERY, &session_id).await?;
        latencies.push(timed.elapsed_ms);
        expect_status(&timed.response, &[200, 429])?;
    }

    if let (Some(first), Some(last)) = (latencies.first(), latencies.last()) {
        ctx.note(format!("first {first}ms last {last}ms all {latencies:?}"));
    }
    Ok(())
}
