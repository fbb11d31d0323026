//! OAuth token refresh against the MailerSend authorization server.

use crate::api::transport::user_agent;
use crate::error::{AppError, AuthError, TransportError};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

pub const OAUTH_TOKEN_URL: &str = "https://app.mailersend.com/oauth/token";
/// Overrides the token endpoint; only used to point tests at a mock server.
pub const OAUTH_URL_ENV_VAR: &str = "MAILERSEND_OAUTH_URL";
pub const OAUTH_CLIENT_ID: &str = "mailersend-cli";

const REFRESH_TIMEOUT_SECS: u64 = 30;

/// Successful response of the token endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TokenGrant {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Lifetime of the access token in seconds.
    #[serde(default)]
    pub expires_in: i64,
}

/// Exchanges a refresh token for a fresh access token.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AppError>;
}

fn refresh_failed(reason: impl Into<String>) -> AppError {
    AppError::Auth(AuthError::RefreshFailed {
        reason: reason.into(),
    })
}

#[derive(Debug, Clone)]
pub struct OAuthClient {
    client: Client,
    token_url: String,
}

impl OAuthClient {
    /// Client for the default token endpoint, or the one named by
    /// `MAILERSEND_OAUTH_URL`.
    pub fn new() -> Result<Self, AppError> {
        let token_url = std::env::var(OAUTH_URL_ENV_VAR)
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| OAUTH_TOKEN_URL.to_string());
        Self::with_token_url(token_url)
    }

    pub fn with_token_url(token_url: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REFRESH_TIMEOUT_SECS))
            .user_agent(user_agent())
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            token_url: token_url.into(),
        })
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }
}

#[async_trait]
impl TokenRefresher for OAuthClient {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AppError> {
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", OAUTH_CLIENT_ID),
            ("refresh_token", refresh_token),
        ];

        log::debug!("Refreshing OAuth access token via {}", self.token_url);

        let response = self
            .client
            .post(&self.token_url)
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| refresh_failed(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(refresh_failed(format!(
                "token endpoint returned {}",
                status.as_u16()
            )));
        }

        let grant: TokenGrant = response
            .json()
            .await
            .map_err(|e| refresh_failed(format!("invalid token response: {}", e)))?;

        if grant.access_token.is_empty() {
            return Err(refresh_failed("token response has no access_token"));
        }

        Ok(grant)
    }
}
