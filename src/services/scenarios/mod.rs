//! Scenario suites driven against a live Voice AI service.
//!
//! Each scenario is one end-to-end check: it opens its own session, talks to
//! the API, and optionally reads the service's store back. Assertion and
//! validation faults fail a scenario; transport and setup faults abort it.

mod edge_cases;
mod end_to_end;
mod hallucination;
mod latency;
mod normal;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::errors::ValidationError;
use crate::domain::models::{Config, LatencyClassifier};
use crate::infrastructure::api::{ApiError, ApiSessionClient, RawResponse};
use crate::infrastructure::logging::SecretRedactor;
use crate::services::persistence_verifier::{Lookup, PersistenceVerifier};

const PERSISTENCE_SKIPPED: &str = "persistence check skipped: db.url not configured";

/// Named group of scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Suite {
    Normal,
    Latency,
    Edge,
    Hallucination,
    #[serde(rename = "e2e")]
    EndToEnd,
}

impl Suite {
    pub const ALL: [Self; 5] = [
        Self::Normal,
        Self::Latency,
        Self::Edge,
        Self::Hallucination,
        Self::EndToEnd,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Latency => "latency",
            Self::Edge => "edge",
            Self::Hallucination => "hallucination",
            Self::EndToEnd => "e2e",
        }
    }

    /// Scenarios of the suite in execution order
    pub const fn scenarios(self) -> &'static [Scenario] {
        use Scenario::*;
        match self {
            Self::Normal => &[WeatherQuery],
            Self::Latency => &[
                SimpleQueryLatency,
                ComplexQueryLatency,
                AverageLatency,
                LatencyUnderLoad,
            ],
            Self::Edge => &[
                EmptyInput,
                VeryLongInput,
                SpecialCharacters,
                UnicodeAndEmoji,
                SqlInjection,
                InvalidSessionId,
            ],
            Self::Hallucination => &[
                FactualAccuracy,
                UnknownTopic,
                ContradictoryInformation,
                OutOfScopeQuestion,
                ConfidenceThreshold,
            ],
            Self::EndToEnd => &[
                CustomerSupportWorkflow,
                MultiTurnConversation,
                ErrorRecoveryWorkflow,
            ],
        }
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Suite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|suite| suite.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown suite '{s}'"))
    }
}

/// Every scenario the harness knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    WeatherQuery,
    SimpleQueryLatency,
    ComplexQueryLatency,
    AverageLatency,
    LatencyUnderLoad,
    EmptyInput,
    VeryLongInput,
    SpecialCharacters,
    UnicodeAndEmoji,
    SqlInjection,
    InvalidSessionId,
    FactualAccuracy,
    UnknownTopic,
    ContradictoryInformation,
    OutOfScopeQuestion,
    ConfidenceThreshold,
    CustomerSupportWorkflow,
    MultiTurnConversation,
    ErrorRecoveryWorkflow,
}

impl Scenario {
    pub const fn name(self) -> &'static str {
        match self {
            Self::WeatherQuery => "weather_query",
            Self::SimpleQueryLatency => "simple_query_latency",
            Self::ComplexQueryLatency => "complex_query_latency",
            Self::AverageLatency => "average_latency",
            Self::LatencyUnderLoad => "latency_under_load",
            Self::EmptyInput => "empty_input",
            Self::VeryLongInput => "very_long_input",
            Self::SpecialCharacters => "special_characters",
            Self::UnicodeAndEmoji => "unicode_and_emoji",
            Self::SqlInjection => "sql_injection",
            Self::InvalidSessionId => "invalid_session_id",
            Self::FactualAccuracy => "factual_accuracy",
            Self::UnknownTopic => "unknown_topic",
            Self::ContradictoryInformation => "contradictory_information",
            Self::OutOfScopeQuestion => "out_of_scope_question",
            Self::ConfidenceThreshold => "confidence_threshold",
            Self::CustomerSupportWorkflow => "customer_support_workflow",
            Self::MultiTurnConversation => "multi_turn_conversation",
            Self::ErrorRecoveryWorkflow => "error_recovery_workflow",
        }
    }

    pub fn suite(self) -> Suite {
        Suite::ALL
            .into_iter()
            .find(|suite| suite.scenarios().contains(&self))
            .unwrap_or(Suite::Normal)
    }

    async fn run(self, ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
        match self {
            Self::WeatherQuery => normal::weather_query(ctx).await,
            Self::SimpleQueryLatency => latency::simple_query(ctx).await,
            Self::ComplexQueryLatency => latency::complex_query(ctx).await,
            Self::AverageLatency => latency::average(ctx).await,
            Self::LatencyUnderLoad => latency::under_load(ctx).await,
            Self::EmptyInput => edge_cases::empty_input(ctx).await,
            Self::VeryLongInput => edge_cases::very_long_input(ctx).await,
            Self::SpecialCharacters => edge_cases::special_characters(ctx).await,
            Self::UnicodeAndEmoji => edge_cases::unicode_and_emoji(ctx).await,
            Self::SqlInjection => edge_cases::sql_injection(ctx).await,
            Self::InvalidSessionId => edge_cases::invalid_session_id(ctx).await,
            Self::FactualAccuracy => hallucination::factual_accuracy(ctx).await,
            Self::UnknownTopic => hallucination::unknown_topic(ctx).await,
            Self::ContradictoryInformation => hallucination::contradictory_information(ctx).await,
            Self::OutOfScopeQuestion => hallucination::out_of_scope(ctx).await,
            Self::ConfidenceThreshold => hallucination::confidence_threshold(ctx).await,
            Self::CustomerSupportWorkflow => end_to_end::customer_support_workflow(ctx).await,
            Self::MultiTurnConversation => end_to_end::multi_turn_conversation(ctx).await,
            Self::ErrorRecoveryWorkflow => end_to_end::error_recovery_workflow(ctx).await,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a scenario did not pass
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("{0}")]
    Assertion(String),

    #[error("Session setup failed: {0}")]
    Setup(#[source] ApiError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ScenarioError {
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }

    /// Transport and setup faults abort; the rest are failures
    pub const fn is_abort(&self) -> bool {
        match self {
            Self::Setup(_) => true,
            Self::Api(err) => err.is_transport(),
            Self::Assertion(_) | Self::Validation(_) => false,
        }
    }
}

pub type ScenarioResult = Result<(), ScenarioError>;

/// Fail with `message` unless `condition` holds
pub fn ensure(condition: bool, message: impl FnOnce() -> String) -> ScenarioResult {
    if condition {
        Ok(())
    } else {
        Err(ScenarioError::Assertion(message()))
    }
}

/// Fail unless the response status is one of `accepted`
pub fn expect_status(response: &RawResponse, accepted: &[u16]) -> ScenarioResult {
    ensure(response.status_in(accepted), || {
        format!(
            "Expected status {}, got {}",
            accepted
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(" or "),
            response.status
        )
    })
}

/// Unwrap a persistence read, failing with the store's cause when the query
/// could not run
pub fn stored<T>(lookup: Lookup<T>, what: &str) -> Result<Option<T>, ScenarioError> {
    match lookup {
        Lookup::Found(value) => Ok(Some(value)),
        Lookup::Missing => Ok(None),
        Lookup::Failed(cause) => Err(ScenarioError::Assertion(format!(
            "Store query for {what} failed: {cause}"
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum ScenarioStatus {
    Passed,
    Failed(String),
    Aborted(String),
}

impl ScenarioStatus {
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Failed(_) => "FAILED",
            Self::Aborted(_) => "ABORTED",
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Passed => None,
            Self::Failed(msg) | Self::Aborted(msg) => Some(msg),
        }
    }
}

/// Result of running one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub suite: Suite,
    pub name: &'static str,
    #[serde(flatten)]
    pub status: ScenarioStatus,
    pub notes: Vec<String>,
    pub duration_ms: u64,
}

/// Everything a scenario may use while it runs
pub struct ScenarioContext<'a> {
    pub client: &'a ApiSessionClient,
    pub config: &'a Config,
    pub classifier: LatencyClassifier,
    verifier: Option<&'a mut PersistenceVerifier>,
    notes: Vec<String>,
}

impl<'a> ScenarioContext<'a> {
    pub fn new(
        client: &'a ApiSessionClient,
        config: &'a Config,
        verifier: Option<&'a mut PersistenceVerifier>,
    ) -> Self {
        Self {
            client,
            config,
            classifier: LatencyClassifier::from_config(&config.latency),
            verifier,
            notes: Vec::new(),
        }
    }

    /// Record an observation that appears in the report
    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Create a session; any failure aborts the scenario
    pub async fn new_session(&self) -> Result<String, ScenarioError> {
        let session = self
            .client
            .create_session()
            .await
            .map_err(ScenarioError::Setup)?;
        ensure(!session.session_id.is_empty(), || {
            "Session ID should not be empty".to_string()
        })?;
        Ok(session.session_id)
    }

    /// The verifier for an immediate read, or `None` (noted) when unconfigured
    pub fn verifier(&mut self) -> Option<&mut PersistenceVerifier> {
        if self.verifier.is_none() {
            self.note(PERSISTENCE_SKIPPED);
            return None;
        }
        self.verifier.as_deref_mut()
    }

    /// Like [`Self::verifier`], after giving the service `db.write_settle_ms`
    /// to commit what it was just sent
    pub async fn persisted(&mut self) -> Option<&mut PersistenceVerifier> {
        if self.verifier.is_none() {
            self.note(PERSISTENCE_SKIPPED);
            return None;
        }
        tokio::time::sleep(Duration::from_millis(self.config.db.write_settle_ms)).await;
        self.verifier.as_deref_mut()
    }

    fn into_notes(self) -> Vec<String> {
        self.notes
    }
}

/// Runs suites against one service, one scenario at a time
pub struct ScenarioRunner {
    client: ApiSessionClient,
    config: Config,
    verifier: Option<PersistenceVerifier>,
}

impl ScenarioRunner {
    pub fn new(client: ApiSessionClient, config: Config, verifier: Option<PersistenceVerifier>) -> Self {
        Self {
            client,
            config,
            verifier,
        }
    }

    /// Run `suites` in order; `on_start` is told about each scenario before it runs
    pub async fn run(
        &mut self,
        suites: &[Suite],
        mut on_start: impl FnMut(Scenario),
    ) -> Vec<ScenarioOutcome> {
        let mut outcomes = Vec::new();
        for suite in suites {
            info!(suite = %suite, "running suite");
            for &scenario in suite.scenarios() {
                on_start(scenario);
                outcomes.push(self.run_scenario(scenario).await);
            }
        }
        outcomes
    }

    pub async fn run_scenario(&mut self, scenario: Scenario) -> ScenarioOutcome {
        let mut ctx = ScenarioContext::new(&self.client, &self.config, self.verifier.as_mut());
        let started = Instant::now();
        let result = scenario.run(&mut ctx).await;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let status = match result {
            Ok(()) => {
                info!(scenario = scenario.name(), duration_ms, "scenario passed");
                ScenarioStatus::Passed
            }
            Err(err) if err.is_abort() => {
                warn!(scenario = scenario.name(), error = %err, "scenario aborted");
                ScenarioStatus::Aborted(SecretRedactor::new().redact(&err.to_string()))
            }
            Err(err) => {
                warn!(scenario = scenario.name(), error = %err, "scenario failed");
                ScenarioStatus::Failed(SecretRedactor::new().redact(&err.to_string()))
            }
        };

        ScenarioOutcome {
            suite: scenario.suite(),
            name: scenario.name(),
            status,
            notes: ctx.into_notes(),
            duration_ms,
        }
    }

    /// Release the store connection, if any
    pub async fn close(mut self) {
        if let Some(verifier) = self.verifier.as_mut() {
            if let Err(err) = verifier.close().await {
                warn!(error = %err, "failed to close conversation store");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_scenario_belongs_to_one_suite() {
        let total: usize = Suite::ALL.iter().map(|s| s.scenarios().len()).sum();
        assert_eq!(total, 19);
        assert_eq!(Scenario::SqlInjection.suite(), Suite::Edge);
        assert_eq!(Scenario::ErrorRecoveryWorkflow.suite(), Suite::EndToEnd);
    }

    #[test]
    fn test_suite_parsing() {
        assert_eq!("e2e".parse::<Suite>().unwrap(), Suite::EndToEnd);
        assert_eq!("Latency".parse::<Suite>().unwrap(), Suite::Latency);
        assert!("load".parse::<Suite>().is_err());
    }

    #[test]
    fn test_stored_surfaces_query_failure() {
        assert_eq!(stored(Lookup::Found(3_u64), "count").unwrap(), Some(3));
        assert_eq!(stored::<u64>(Lookup::Missing, "count").unwrap(), None);

        let err = stored::<u64>(Lookup::Failed("database is locked".to_string()), "conversation count")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Store query for conversation count failed: database is locked"
        );
        assert!(!err.is_abort());
    }

    #[test]
    fn test_expect_status_message() {
        let response = RawResponse {
            status: 500,
            body: String::new(),
        };
        let err = expect_status(&response, &[200, 400]).unwrap_err();
        assert_eq!(err.to_string(), "Expected status 200 or 400, got 500");
        assert!(!err.is_abort());
    }

    #[test]
    fn test_setup_errors_abort() {
        let err = ScenarioError::Setup(ApiError::MissingSessionId);
        assert!(err.is_abort());
        assert!(!ScenarioError::from(ApiError::MissingSessionId).is_abort());
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = ScenarioOutcome {
            suite: Suite::EndToEnd,
            name: "multi_turn_conversation",
            status: ScenarioStatus::Failed("All turns should be recorded".to_string()),
            notes: vec![],
            duration_ms: 12,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["suite"], "e2e");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["message"], "All turns should be recorded");
    }
}
