//! Builds an authenticated API client for one command invocation.

use crate::api::client::MailerSendClient;
use crate::api::transport::{
    DEFAULT_TIMEOUT_SECS, RetryConfig, RetryingTransport, TransportConfig,
    base_url_override_from_env,
};
use crate::core::auth::TokenRefresher;
use crate::error::AppError;
use crate::storage::config::config_file_path;
use crate::storage::credentials::CredentialStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Persistent flags of the current invocation.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    pub profile: Option<String>,
    pub verbose: bool,
    pub json: bool,
    /// Directory holding `config.yaml`, replacing `<config-dir>/mailersend`.
    pub config_dir: Option<PathBuf>,
}

impl InvocationContext {
    pub fn config_path(&self) -> Result<PathBuf, AppError> {
        Ok(config_file_path(self.config_dir.as_deref())?)
    }
}

#[derive(Debug, Clone)]
pub struct ClientFactory {
    base_url_override: Option<String>,
    retry: RetryConfig,
    timeout: Duration,
}

impl Default for ClientFactory {
    fn default() -> Self {
        Self {
            base_url_override: None,
            retry: RetryConfig::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientFactory {
    /// Factory honouring `MAILERSEND_API_BASE_URL`.
    pub fn from_env() -> Self {
        Self {
            base_url_override: base_url_override_from_env(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    pub fn transport_config(&self, verbose: bool) -> TransportConfig {
        TransportConfig {
            verbose,
            base_url_override: self.base_url_override.clone(),
            retry: self.retry.clone(),
            timeout: self.timeout,
        }
    }

    /// Resolve the token from the invocation's configuration file and build
    /// the client.
    pub async fn build(&self, ctx: &InvocationContext) -> Result<MailerSendClient, AppError> {
        let store = CredentialStore::open(ctx.config_path()?)?;
        self.build_with_store(ctx, &store).await
    }

    /// Token errors ("no token found", "profile <name> not found") are
    /// returned untouched.
    pub async fn build_with_store<R: TokenRefresher>(
        &self,
        ctx: &InvocationContext,
        store: &CredentialStore<R>,
    ) -> Result<MailerSendClient, AppError> {
        let token = store.get_token(ctx.profile.as_deref()).await?;
        let transport = RetryingTransport::new(self.transport_config(ctx.verbose))?;
        Ok(MailerSendClient::new(Arc::new(transport), token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::TokenGrant;
    use crate::error::ConfigError;
    use crate::storage::config::{Config, Profile};
    use async_trait::async_trait;
    use tempfile::tempdir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct NoRefresh;

    #[async_trait]
    impl TokenRefresher for NoRefresh {
        async fn refresh(&self, _refresh_token: &str) -> Result<TokenGrant, AppError> {
            panic!("refresh should not be called");
        }
    }

    fn store_with(dir: &std::path::Path, config: &Config) -> CredentialStore<NoRefresh> {
        let path = dir.join("config.yaml");
        config.save(&path).unwrap();
        CredentialStore::new(path, NoRefresh).with_env_token(None)
    }

    #[tokio::test]
    async fn test_client_uses_resolved_token_and_override() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/domains/d1"))
            .and(header("authorization", "Bearer cfg-tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"id": "d1", "name": "a.com"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let temp_dir = tempdir().unwrap();
        let mut config = Config::default();
        config.set_profile("p1".to_string(), Profile::with_api_token("cfg-tok"));
        let store = store_with(temp_dir.path(), &config);

        let factory = ClientFactory::default().with_base_url(server.uri());
        let client = factory
            .build_with_store(&InvocationContext::default(), &store)
            .await
            .unwrap();

        assert_eq!(client.get_domain("d1").await.unwrap().name, "a.com");
    }

    #[tokio::test]
    async fn test_token_errors_propagate_verbatim() {
        let temp_dir = tempdir().unwrap();
        let store = store_with(temp_dir.path(), &Config::default());
        let factory = ClientFactory::default();

        let err = factory
            .build_with_store(&InvocationContext::default(), &store)
            .await
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "no profiles configured");

        let ctx = InvocationContext {
            profile: Some("ghost".to_string()),
            ..InvocationContext::default()
        };
        let err = factory.build_with_store(&ctx, &store).await.err().unwrap();
        assert!(matches!(
            err,
            AppError::Config(ConfigError::ProfileNotFound { .. })
        ));
        assert_eq!(err.to_string(), "profile ghost not found");
    }

    #[test]
    fn test_transport_config_carries_verbosity() {
        let config = ClientFactory::default().transport_config(true);
        assert!(config.verbose);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry.max_retries, 3);
    }
}
