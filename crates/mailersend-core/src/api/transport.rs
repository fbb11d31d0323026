//! Retrying HTTP transport
//!
//! Every API call funnels through [`RetryingTransport::execute`], which
//! rewrites the base URL when an override is configured, forces the user
//! agent, buffers the request body so every attempt sends identical bytes,
//! and retries transport failures, `429` and `5xx` responses with exponential
//! backoff. The body of the most recent `4xx`/`5xx` response is parked in a
//! slot that the error bridge reads after the typed client has given up on it.

use crate::error::{AppError, ClientError, TransportError};
use crate::utils::logging::VerboseLogger;
use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.mailersend.com/v1";
/// Redirects requests for the default API base; only meant for test servers.
pub const BASE_URL_ENV_VAR: &str = "MAILERSEND_API_BASE_URL";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = "mailersend/dev";

static USER_AGENT_OVERRIDE: OnceLock<String> = OnceLock::new();

/// Set the product user agent. Only the first call has an effect.
pub fn set_user_agent(user_agent: impl Into<String>) -> bool {
    USER_AGENT_OVERRIDE.set(user_agent.into()).is_ok()
}

pub fn user_agent() -> &'static str {
    USER_AGENT_OVERRIDE
        .get()
        .map(String::as_str)
        .unwrap_or(DEFAULT_USER_AGENT)
}

/// Read the base URL override from the environment.
pub fn base_url_override_from_env() -> Option<String> {
    std::env::var(BASE_URL_ENV_VAR)
        .ok()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}

/// Retry configuration for API requests
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,
    /// Wait before the first retry; doubles on each following one
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryConfig {
    /// Backoff yielding `base_delay * 2^attempt` with no jitter.
    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.base_delay,
            initial_interval: self.base_delay,
            randomization_factor: 0.0,
            multiplier: 2.0,
            max_interval: Duration::from_secs(300),
            max_elapsed_time: None,
            ..Default::default()
        }
    }

    fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub verbose: bool,
    /// Replaces [`DEFAULT_API_BASE`] at the start of request URLs.
    pub base_url_override: Option<String>,
    pub retry: RetryConfig,
    /// Deadline for the whole request, backoff sleeps included.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            base_url_override: None,
            retry: RetryConfig::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// An outbound request with its body fully buffered.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Take over a built `reqwest::Request`, draining its body into memory.
    pub fn capture(request: reqwest::Request) -> Result<Self, TransportError> {
        let body = match request.body() {
            None => None,
            Some(body) => Some(
                body.as_bytes()
                    .ok_or_else(|| {
                        TransportError::InvalidRequest(
                            "streaming request bodies cannot be retried".to_string(),
                        )
                    })?
                    .to_vec(),
            ),
        };

        Ok(Self {
            method: request.method().clone(),
            url: request.url().to_string(),
            headers: request.headers().clone(),
            body,
        })
    }
}

/// A response whose body has been read into memory. Consuming accessors
/// make the body readable exactly once.
#[derive(Debug)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ApiResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn json<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        serde_json::from_slice(&self.body).map_err(|e| ClientError::Parse(e.to_string()))
    }
}

pub struct RetryingTransport {
    client: Client,
    config: TransportConfig,
    logger: VerboseLogger,
    in_flight: tokio::sync::Mutex<()>,
    last_error_body: Mutex<Option<Vec<u8>>>,
}

impl RetryingTransport {
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            logger: VerboseLogger::new(config.verbose),
            config,
            in_flight: tokio::sync::Mutex::new(()),
            last_error_body: Mutex::new(None),
        })
    }

    /// Remove and return the body of the most recent 4xx/5xx response.
    pub fn take_last_error_body(&self) -> Option<Vec<u8>> {
        self.last_error_body
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    fn store_error_body(&self, body: Option<Vec<u8>>) {
        *self
            .last_error_body
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = body;
    }

    /// Send a request, retrying transient failures.
    ///
    /// Returns the final response for any status, including 4xx/5xx once
    /// retries are exhausted, or a terminal transport error.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, AppError> {
        let _guard = self.in_flight.lock().await;
        self.store_error_body(None);

        let request = self.prepare(request);
        match tokio::time::timeout(self.config.timeout, self.run_attempts(&request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                timeout_secs: self.config.timeout.as_secs(),
            }
            .into()),
        }
    }

    fn prepare(&self, mut request: ApiRequest) -> ApiRequest {
        if let Some(base) = &self.config.base_url_override {
            if let Some(rest) = request.url.strip_prefix(DEFAULT_API_BASE) {
                request.url = format!("{}{}", base.trim_end_matches('/'), rest);
            }
        }

        let agent = HeaderValue::from_str(user_agent())
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT));
        request.headers.insert(USER_AGENT, agent);
        request
    }

    async fn run_attempts(&self, request: &ApiRequest) -> Result<ApiResponse, AppError> {
        let retry = &self.config.retry;
        let mut backoff = retry.backoff();
        let mut attempt = 0u32;

        loop {
            let computed_wait = backoff.next_backoff().unwrap_or(retry.base_delay);
            let last_attempt = attempt + 1 >= retry.max_attempts();

            self.logger.trace_request(
                request.method.as_str(),
                &request.url,
                request.body.as_deref(),
            );

            match self.send_once(request).await {
                Err(err) if err.is_builder() => {
                    return Err(TransportError::InvalidRequest(err.to_string()).into());
                }
                Err(err) => {
                    if last_attempt {
                        log::warn!(
                            "Max retry attempts reached ({}), giving up",
                            retry.max_retries
                        );
                        return Err(TransportError::RetriesExhausted {
                            retries: retry.max_retries,
                            cause: err.to_string(),
                        }
                        .into());
                    }
                    log::debug!(
                        "Transport error on attempt {}: {}; retrying after {:?}",
                        attempt,
                        err,
                        computed_wait
                    );
                    tokio::time::sleep(computed_wait).await;
                }
                Ok(response) => {
                    self.logger
                        .trace_response(response.status.as_u16(), &response.body);

                    if response.status.as_u16() < 400 {
                        return Ok(response);
                    }

                    self.store_error_body(Some(response.body.clone()));

                    if !is_retryable(response.status) || last_attempt {
                        return Ok(response);
                    }

                    let wait = retry_after(&response.headers, Utc::now()).unwrap_or(computed_wait);
                    log::debug!(
                        "Got {} on attempt {}; retrying after {:?}",
                        response.status.as_u16(),
                        attempt,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                }
            }

            attempt += 1;
        }
    }

    async fn send_once(&self, request: &ApiRequest) -> Result<ApiResponse, reqwest::Error> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.as_str())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Parse `Retry-After` as integer seconds or an HTTP-date. Anything else is
/// ignored so the computed backoff applies.
fn retry_after(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let date = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    Some((date - now).to_std().unwrap_or(Duration::ZERO))
}
