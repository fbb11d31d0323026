//! Credential resolution
//!
//! Resolution order, first match wins:
//! 1. `MAILERSEND_API_TOKEN` when set and non-empty
//! 2. the profile named by `--profile`
//! 3. the active profile
//!
//! Within a profile a static API token beats OAuth. OAuth access tokens that
//! expire within five minutes are refreshed before use and written back.

use super::config::{Config, Profile};
use crate::core::auth::{OAuthClient, TokenRefresher};
use crate::error::{AppError, AuthError, ConfigError};
use chrono::{DateTime, Duration, Utc};
use std::env;
use std::path::{Path, PathBuf};

pub const TOKEN_ENV_VAR: &str = "MAILERSEND_API_TOKEN";

/// Access tokens this close to expiry are refreshed before use.
const REFRESH_WINDOW_SECS: i64 = 5 * 60;

/// Get the API token from the environment, if set and non-empty.
pub fn env_token() -> Option<String> {
    env::var(TOKEN_ENV_VAR).ok().filter(|t| !t.is_empty())
}

/// Where a resolved token came from, for `auth status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    Environment,
    ApiToken { profile: String },
    OAuth { profile: String },
}

pub struct CredentialStore<R: TokenRefresher = OAuthClient> {
    path: PathBuf,
    refresher: R,
    env_token: Option<String>,
}

impl CredentialStore<OAuthClient> {
    /// Store backed by the file at `path`, refreshing through the default
    /// OAuth endpoint.
    pub fn open(path: PathBuf) -> Result<Self, AppError> {
        Ok(Self::new(path, OAuthClient::new()?))
    }
}

impl<R: TokenRefresher> CredentialStore<R> {
    pub fn new(path: PathBuf, refresher: R) -> Self {
        Self {
            path,
            refresher,
            env_token: env_token(),
        }
    }

    /// Replace the token captured from `MAILERSEND_API_TOKEN` at construction.
    pub fn with_env_token(mut self, token: Option<String>) -> Self {
        self.env_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Config, AppError> {
        Ok(Config::load(&self.path)?)
    }

    pub fn save(&self, config: &Config) -> Result<(), AppError> {
        Ok(config.save(&self.path)?)
    }

    /// Describe which credential `get_token` would use, without refreshing.
    pub fn token_source(&self, profile_override: Option<&str>) -> Result<TokenSource, AppError> {
        if self.env_token.is_some() {
            return Ok(TokenSource::Environment);
        }

        let config = self.load()?;
        let (name, profile) = select_profile(&config, profile_override)?;
        if profile.api_token().is_some() {
            Ok(TokenSource::ApiToken {
                profile: name.to_string(),
            })
        } else if profile.oauth_access_token().is_some() {
            Ok(TokenSource::OAuth {
                profile: name.to_string(),
            })
        } else {
            Err(ConfigError::NoToken.into())
        }
    }

    /// Resolve the bearer token for this invocation.
    pub async fn get_token(&self, profile_override: Option<&str>) -> Result<String, AppError> {
        if let Some(token) = &self.env_token {
            return Ok(token.clone());
        }

        let mut config = self.load()?;
        let (name, profile) = select_profile(&config, profile_override)?;
        let name = name.to_string();
        let profile = profile.clone();

        if let Some(token) = profile.api_token() {
            return Ok(token.to_string());
        }

        let access_token = profile
            .oauth_access_token()
            .ok_or(ConfigError::NoToken)?
            .to_string();

        let Some(expires_at) = profile.oauth_expires_at else {
            return Ok(access_token);
        };

        let now = Utc::now();
        if !needs_refresh(expires_at, now) {
            return Ok(access_token);
        }

        match self.refresh_profile(&mut config, &name, &profile).await {
            Ok(token) => Ok(token),
            Err(err) if now < expires_at => {
                log::warn!(
                    "OAuth refresh for profile '{}' failed, using current token: {}",
                    name,
                    err
                );
                Ok(access_token)
            }
            Err(err) => Err(err),
        }
    }

    async fn refresh_profile(
        &self,
        config: &mut Config,
        name: &str,
        profile: &Profile,
    ) -> Result<String, AppError> {
        let refresh_token = profile
            .oauth_refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::RefreshFailed {
                reason: format!("profile {} has no refresh token", name),
            })?;

        let grant = self.refresher.refresh(refresh_token).await?;
        let expires_at = Duration::try_seconds(grant.expires_in)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| AuthError::RefreshFailed {
                reason: format!("invalid expires_in {}", grant.expires_in),
            })?;

        let stored = config
            .profiles
            .get_mut(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            })?;
        stored.oauth_access_token = Some(grant.access_token.clone());
        if !grant.refresh_token.is_empty() {
            stored.oauth_refresh_token = Some(grant.refresh_token);
        }
        stored.oauth_expires_at = Some(expires_at);

        self.save(config)?;
        log::debug!("Refreshed OAuth token for profile '{}'", name);

        Ok(grant.access_token)
    }
}

fn select_profile<'a>(
    config: &'a Config,
    profile_override: Option<&str>,
) -> Result<(&'a str, &'a Profile), AppError> {
    match profile_override {
        Some(name) => Ok(config
            .profiles
            .get_key_value(name)
            .map(|(name, profile)| (name.as_str(), profile))
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            })?),
        None => Ok(config.active()?),
    }
}

fn needs_refresh(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires_at <= now + Duration::seconds(REFRESH_WINDOW_SECS)
}
