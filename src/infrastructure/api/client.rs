use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

use super::errors::ApiError;
use crate::domain::models::{ApiConfig, ConversationResponse, ConversationTurn};
use crate::infrastructure::validators::{ResponseValidator, SchemaId, SchemaRegistry};

/// Status code and body of one HTTP exchange, before any interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn json(&self) -> Result<Value, ApiError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    pub fn conversation(&self) -> Result<ConversationResponse, ApiError> {
        self.decode()
    }

    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Status is one of `accepted`
    pub fn status_in(&self, accepted: &[u16]) -> bool {
        accepted.contains(&self.status)
    }

    pub fn expect_status(&self, expected: u16) -> Result<(), ApiError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(ApiError::UnexpectedStatus {
                expected,
                actual: self.status,
                body: self.body.clone(),
            })
        }
    }
}

/// A response with the wall-clock time spent waiting for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedResponse {
    pub response: RawResponse,
    pub elapsed_ms: u64,
}

/// A freshly created session
#[derive(Debug, Clone)]
pub struct CreatedSession {
    pub session_id: String,
    pub response: RawResponse,
}

/// HTTP client for the Voice AI service
///
/// Every call is a single attempt. Status codes are only asserted by the
/// operations documented to do so; everything else hands the status back to
/// the caller.
#[derive(Debug, Clone)]
pub struct ApiSessionClient {
    http_client: ReqwestClient,
    config: ApiConfig,
}

impl ApiSessionClient {
    /// Build a client with bearer auth and JSON content negotiation
    ///
    /// # Errors
    /// Returns an error if the token is not a valid header value or the
    /// underlying client cannot be built
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.auth_token))
            .map_err(|_| ApiError::InvalidAuthToken)?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        let http_client = ReqwestClient::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .tcp_nodelay(true)
            .build()?;

        info!(base_url = %config.base_url, "API client initialized");

        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Create a session; requires 200 and a `session_id` in the body
    #[instrument(skip(self))]
    pub async fn create_session(&self) -> Result<CreatedSession, ApiError> {
        let response = self
            .execute(self.http_client.post(self.config.url(&self.config.session_endpoint)))
            .await?
            .response;
        response.expect_status(200)?;

        let session_id = response
            .json()?
            .get("session_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(ApiError::MissingSessionId)?;

        debug!(%session_id, "session created");
        Ok(CreatedSession {
            session_id,
            response,
        })
    }

    /// [`Self::create_session`] plus session schema conformance
    pub async fn create_session_with_schema(
        &self,
        registry: &SchemaRegistry,
    ) -> Result<CreatedSession, ApiError> {
        let session = self.create_session().await?;
        ResponseValidator::conforms_to_schema(registry, &session.response.json()?, SchemaId::SessionResponse)?;
        info!("session response schema validation passed");
        Ok(session)
    }

    /// Post a prebuilt turn and time it; any status is returned
    #[instrument(skip(self, turn), fields(session_id = %turn.session_id))]
    pub async fn send_turn(&self, turn: &ConversationTurn) -> Result<TimedResponse, ApiError> {
        let timed = self
            .execute(
                self.http_client
                    .post(self.config.url(&self.config.chat_endpoint))
                    .json(turn),
            )
            .await?;

        debug!(
            status = timed.response.status,
            elapsed_ms = timed.elapsed_ms,
            "chat response received"
        );
        Ok(timed)
    }

    /// Send `user_input` in `session_id`; any status is returned
    pub async fn send_query(&self, user_input: &str, session_id: &str) -> Result<TimedResponse, ApiError> {
        self.send_turn(&ConversationTurn::new(session_id, user_input)).await
    }

    /// [`Self::send_query`] requiring 200 and every required field
    pub async fn send_query_validated(
        &self,
        user_input: &str,
        session_id: &str,
    ) -> Result<TimedResponse, ApiError> {
        let timed = self.send_query(user_input, session_id).await?;
        timed.response.expect_status(200)?;
        ResponseValidator::ensure_required_fields(&timed.response.conversation()?)?;
        Ok(timed)
    }

    /// [`Self::send_query`] requiring 200 and voice schema conformance
    pub async fn send_query_with_schema(
        &self,
        user_input: &str,
        session_id: &str,
        registry: &SchemaRegistry,
    ) -> Result<TimedResponse, ApiError> {
        let timed = self.send_query(user_input, session_id).await?;
        timed.response.expect_status(200)?;
        ResponseValidator::conforms_to_schema(registry, &timed.response.json()?, SchemaId::VoiceResponse)?;
        info!("voice response schema validation passed");
        Ok(timed)
    }

    /// Fetch the session's history; requires 200
    #[instrument(skip(self))]
    pub async fn get_history(&self, session_id: &str) -> Result<RawResponse, ApiError> {
        let response = self
            .execute(
                self.http_client
                    .get(self.config.url(&self.config.history_endpoint))
                    .query(&[("session_id", session_id)]),
            )
            .await?
            .response;
        response.expect_status(200)?;
        Ok(response)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<TimedResponse, ApiError> {
        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        Ok(TimedResponse {
            response: RawResponse { status, body },
            elapsed_ms,
        })
    }
}
