use crate::storage::config::Profile;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Which kind of credential a profile holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    ApiToken,
    #[serde(rename = "oauth")]
    OAuth,
    None,
}

impl CredentialKind {
    /// `api_token` wins over OAuth, matching token resolution.
    pub fn of(profile: &Profile) -> Self {
        if profile.api_token().is_some() {
            CredentialKind::ApiToken
        } else if profile.oauth_access_token().is_some() {
            CredentialKind::OAuth
        } else {
            CredentialKind::None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CredentialKind::ApiToken => "api token",
            CredentialKind::OAuth => "oauth",
            CredentialKind::None => "none",
        }
    }
}

/// One row of `profile list`
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub name: String,
    pub active: bool,
    pub credential: CredentialKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_expires_at: Option<DateTime<Utc>>,
}
