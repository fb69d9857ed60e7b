mod common;
mod helpers;

use serde_json::json;
use std::time::Duration;
use voiceai_harness::domain::models::Config;
use voiceai_harness::infrastructure::api::ApiSessionClient;
use voiceai_harness::services::{
    PersistenceVerifier, Scenario, ScenarioRunner, ScenarioStatus, Suite,
};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::chat_body;
use helpers::database::{create_test_db, database_url, insert_rows, teardown_test_db, SeedRow};

const SESSION: &str = "sess-1";
const WEATHER_INPUT: &str = "What's the weather today?";

async fn mount_session(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"session_id": SESSION})))
        .mount(server)
        .await;
}

async fn mount_weather(server: &MockServer, intent: &str, confidence: f64) {
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"user_input": WEATHER_INPUT})))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(
            SESSION,
            "Today's weather in Paris is sunny",
            intent,
            confidence,
        )))
        .mount(server)
        .await;
}

async fn mount_any_chat(server: &MockServer, delay: Duration) {
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_body(SESSION, "Hi there", "greeting", 0.95))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

fn runner(config: Config, verifier: Option<PersistenceVerifier>) -> ScenarioRunner {
    let client = ApiSessionClient::new(&config.api).unwrap();
    ScenarioRunner::new(client, config, verifier)
}

#[tokio::test]
async fn test_normal_suite_passes_without_store() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_weather(&server, "weather_query", 0.92).await;

    let mut runner = runner(common::config(&server.uri()), None);
    let mut started = Vec::new();
    let outcomes = runner
        .run(&[Suite::Normal], |scenario| started.push(scenario))
        .await;

    assert_eq!(started, vec![Scenario::WeatherQuery]);
    assert_eq!(outcomes.len(), 1);
    let outcome = &outcomes[0];
    assert_eq!(outcome.name, "weather_query");
    assert_eq!(outcome.suite, Suite::Normal);
    assert_eq!(outcome.status, ScenarioStatus::Passed);
    assert!(outcome
        .notes
        .iter()
        .any(|n| n.contains("persistence check skipped")));
}

#[tokio::test]
async fn test_wrong_intent_fails_scenario() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_weather(&server, "greeting", 0.92).await;

    let mut runner = runner(common::config(&server.uri()), None);
    let outcome = runner.run_scenario(Scenario::WeatherQuery).await;

    match &outcome.status {
        ScenarioStatus::Failed(message) => assert!(message.contains("Intent mismatch")),
        other => panic!("Expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_low_confidence_fails_scenario() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_weather(&server, "weather_query", 0.6).await;

    let mut runner = runner(common::config(&server.uri()), None);
    let outcome = runner.run_scenario(Scenario::WeatherQuery).await;

    match &outcome.status {
        ScenarioStatus::Failed(message) => assert!(message.contains("below minimum 0.8")),
        other => panic!("Expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_session_failure_aborts_scenario() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/session"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let mut runner = runner(common::config(&server.uri()), None);
    let outcome = runner.run_scenario(Scenario::WeatherQuery).await;
    assert!(matches!(outcome.status, ScenarioStatus::Aborted(_)));
    assert_eq!(outcome.status.label(), "ABORTED");
}

#[tokio::test]
async fn test_latency_suite_against_fast_service() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_any_chat(&server, Duration::ZERO).await;

    let mut runner = runner(common::config(&server.uri()), None);
    let outcomes = runner.run(&[Suite::Latency], |_| {}).await;

    assert_eq!(outcomes.len(), 4);
    for outcome in &outcomes {
        assert!(outcome.status.is_passed(), "{}: {:?}", outcome.name, outcome.status);
    }
    let average = outcomes
        .iter()
        .find(|o| o.name == "average_latency")
        .unwrap();
    assert!(average.notes.iter().any(|n| n.contains("over 10 requests")));
}

#[tokio::test]
async fn test_slow_simple_query_fails() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_any_chat(&server, Duration::from_millis(200)).await;

    let mut config = common::config(&server.uri());
    config.latency.simple_query = 50;

    let mut runner = runner(config, None);
    let outcome = runner.run_scenario(Scenario::SimpleQueryLatency).await;
    match &outcome.status {
        ScenarioStatus::Failed(message) => {
            assert!(message.contains("exceeds threshold 50ms"), "{message}");
        }
        other => panic!("Expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_session_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"session_id": "invalid-session-12345"})))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "unknown session"})))
        .mount(&server)
        .await;

    let mut runner = runner(common::config(&server.uri()), None);
    let outcome = runner.run_scenario(Scenario::InvalidSessionId).await;
    assert_eq!(outcome.status, ScenarioStatus::Passed);
}

#[tokio::test]
async fn test_weather_query_checks_persisted_intent() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_weather(&server, "weather_query", 0.92).await;

    let (_dir, db_path) = common::temp_db_path();
    let mut conn = create_test_db(&db_path).await;
    insert_rows(
        &mut conn,
        &[SeedRow::new(SESSION, WEATHER_INPUT, "weather_query", "2024-05-01 10:00:00")],
    )
    .await;
    teardown_test_db(conn).await;

    let mut config = common::config(&server.uri());
    config.db.url = database_url(&db_path);
    let verifier = PersistenceVerifier::connect(&config.db).await.unwrap();

    let mut runner = runner(config, Some(verifier));
    let outcome = runner.run_scenario(Scenario::WeatherQuery).await;
    runner.close().await;

    assert_eq!(outcome.status, ScenarioStatus::Passed);
    assert!(!outcome
        .notes
        .iter()
        .any(|n| n.contains("persistence check skipped")));
}

#[tokio::test]
async fn test_unpersisted_turn_fails() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_weather(&server, "weather_query", 0.92).await;

    let (_dir, db_path) = common::temp_db_path();
    let conn = create_test_db(&db_path).await;
    teardown_test_db(conn).await;

    let mut config = common::config(&server.uri());
    config.db.url = database_url(&db_path);
    let verifier = PersistenceVerifier::connect(&config.db).await.unwrap();

    let mut runner = runner(config, Some(verifier));
    let outcome = runner.run_scenario(Scenario::WeatherQuery).await;

    assert_eq!(
        outcome.status,
        ScenarioStatus::Failed("Conversation should be logged in database".to_string())
    );
}

#[tokio::test]
async fn test_failure_messages_are_redacted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/session"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string("rejected Authorization: Bearer abc123secret"),
        )
        .mount(&server)
        .await;

    let mut runner = runner(common::config(&server.uri()), None);
    let outcome = runner.run_scenario(Scenario::WeatherQuery).await;

    let message = outcome.status.message().unwrap();
    assert!(!message.contains("abc123secret"));
    assert!(message.contains("[REDACTED]"));
}

async fn mount_factual(server: &MockServer, text: &str, confidence: f64) {
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"user_input": "What year was the company founded?"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_body(SESSION, text, "company_info", confidence)),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_hedged_low_confidence_answer_fails_factual_accuracy() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_factual(&server, "I'm not sure", 0.3).await;

    let mut runner = runner(common::config(&server.uri()), None);
    let outcome = runner.run_scenario(Scenario::FactualAccuracy).await;

    match &outcome.status {
        ScenarioStatus::Failed(message) => {
            assert!(message.contains("Confidence 0.3 below minimum 0.7"), "{message}");
        }
        other => panic!("Expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_confident_answer_passes_factual_accuracy() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_factual(&server, "The company was founded in 1998", 0.85).await;

    let mut runner = runner(common::config(&server.uri()), None);
    let outcome = runner.run_scenario(Scenario::FactualAccuracy).await;
    assert_eq!(outcome.status, ScenarioStatus::Passed);
}

#[tokio::test]
async fn test_store_query_failure_is_reported() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_weather(&server, "weather_query", 0.92).await;

    // a valid database file without the conversations table
    let (_dir, db_path) = common::temp_db_path();
    std::fs::File::create(&db_path).unwrap();

    let mut config = common::config(&server.uri());
    config.db.url = database_url(&db_path);
    let verifier = PersistenceVerifier::connect(&config.db).await.unwrap();

    let mut runner = runner(config, Some(verifier));
    let outcome = runner.run_scenario(Scenario::WeatherQuery).await;

    match &outcome.status {
        ScenarioStatus::Failed(message) => {
            assert!(message.starts_with("Store query for latest conversation failed"), "{message}");
        }
        other => panic!("Expected failure, got {other:?}"),
    }
}
