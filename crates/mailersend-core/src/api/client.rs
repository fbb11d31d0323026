use crate::api::error_bridge::bridge_result;
use crate::api::models::{
    Activity, ActivityQuery, ApiToken, DataEnvelope, Domain, EmailRequest, Paginated, SendOutcome,
    SmsRequest, Template, Webhook,
};
use crate::api::pagination::Page;
use crate::api::transport::{ApiRequest, ApiResponse, DEFAULT_API_BASE, RetryingTransport};
use crate::error::{AppError, ClientError, TransportError};
use reqwest::header::{ACCEPT, HeaderMap};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;

const MESSAGE_ID_HEADERS: [&str; 2] = ["x-message-id", "x-sms-message-id"];

/// Typed MailerSend API client.
///
/// Requests are assembled with `reqwest` builders, then handed to the shared
/// [`RetryingTransport`]. Failed responses come back as [`AppError::Api`]
/// carrying the server's message and field errors.
#[derive(Clone)]
pub struct MailerSendClient {
    builder: Client,
    transport: Arc<RetryingTransport>,
    pub base_url: String,
    token: String,
}

impl MailerSendClient {
    pub fn new(transport: Arc<RetryingTransport>, token: impl Into<String>) -> Self {
        MailerSendClient {
            builder: Client::new(),
            transport,
            base_url: DEFAULT_API_BASE.to_string(),
            token: token.into(),
        }
    }

    /// The transport, for callers that read the last error body directly.
    pub fn transport(&self) -> &Arc<RetryingTransport> {
        &self.transport
    }

    pub fn build_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.builder
            .request(method, url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
    }

    /// Send through the transport and turn 4xx/5xx into bridged API errors.
    pub async fn send(&self, request: RequestBuilder) -> Result<ApiResponse, AppError> {
        let request = request
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let request = ApiRequest::capture(request)?;

        let response = self.transport.execute(request).await?;
        bridge_result(Self::handle_response(response), &self.transport)
    }

    pub fn handle_response(response: ApiResponse) -> Result<ApiResponse, AppError> {
        let status = response.status();
        if status.as_u16() < 400 {
            return Ok(response);
        }

        Err(ClientError::Status {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or_default().to_string(),
        }
        .into())
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AppError> {
        let response = self.send(request).await?;
        Ok(response.json::<T>()?)
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        page: u32,
        per_page: u32,
        extra: &[(String, String)],
    ) -> Result<Page<T>, AppError> {
        let request = self
            .build_request(Method::GET, path)
            .query(&[("page", page), ("limit", per_page)])
            .query(extra);
        let envelope: Paginated<T> = self.get_json(request).await?;
        Ok(envelope.into())
    }

    /// List sending domains
    pub async fn list_domains(&self, page: u32, per_page: u32) -> Result<Page<Domain>, AppError> {
        self.get_page("/domains", page, per_page, &[]).await
    }

    pub async fn get_domain(&self, domain_id: &str) -> Result<Domain, AppError> {
        let path = format!("/domains/{}", domain_id);
        let envelope: DataEnvelope<Domain> =
            self.get_json(self.build_request(Method::GET, &path)).await?;
        Ok(envelope.data)
    }

    /// List activity events of a domain within a date window
    pub async fn list_activity(
        &self,
        domain_id: &str,
        query: &ActivityQuery,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Activity>, AppError> {
        let path = format!("/activity/{}", domain_id);
        self.get_page(&path, page, per_page, &query.to_query_pairs())
            .await
    }

    pub async fn list_templates(&self, page: u32, per_page: u32) -> Result<Page<Template>, AppError> {
        self.get_page("/templates", page, per_page, &[]).await
    }

    pub async fn list_webhooks(
        &self,
        domain_id: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Webhook>, AppError> {
        let filter = [("domain_id".to_string(), domain_id.to_string())];
        self.get_page("/webhooks", page, per_page, &filter).await
    }

    pub async fn list_tokens(&self, page: u32, per_page: u32) -> Result<Page<ApiToken>, AppError> {
        self.get_page("/token", page, per_page, &[]).await
    }

    /// Queue an email. The service answers `202` with the id in a header.
    pub async fn send_email(&self, email: &EmailRequest) -> Result<SendOutcome, AppError> {
        let request = self.build_request(Method::POST, "/email").json(email);
        let response = self.send(request).await?;
        Ok(send_outcome(response.status().as_u16(), response.headers()))
    }

    pub async fn send_sms(&self, sms: &SmsRequest) -> Result<SendOutcome, AppError> {
        let request = self.build_request(Method::POST, "/sms").json(sms);
        let response = self.send(request).await?;
        Ok(send_outcome(response.status().as_u16(), response.headers()))
    }
}

fn send_outcome(status: u16, headers: &HeaderMap) -> SendOutcome {
    let message_id = MESSAGE_ID_HEADERS
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    SendOutcome { status, message_id }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::EmailAddress;
    use crate::api::transport::{RetryConfig, TransportConfig};
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> MailerSendClient {
        let transport = RetryingTransport::new(TransportConfig {
            base_url_override: Some(server.uri()),
            retry: RetryConfig {
                max_retries: 1,
                base_delay: Duration::from_millis(5),
            },
            ..TransportConfig::default()
        })
        .expect("transport creation failed");
        MailerSendClient::new(Arc::new(transport), "test-token")
    }

    #[test]
    fn test_build_request_sets_auth_headers() {
        let transport = Arc::new(RetryingTransport::new(TransportConfig::default()).unwrap());
        let client = MailerSendClient::new(transport, "abc");

        let request = client
            .build_request(Method::GET, "/domains")
            .build()
            .expect("Failed to build request");

        assert_eq!(request.url().as_str(), "https://api.mailersend.com/v1/domains");
        assert_eq!(request.headers()["authorization"], "Bearer abc");
        assert_eq!(request.headers()["accept"], "application/json");
    }

    #[tokio::test]
    async fn test_list_domains_sends_page_and_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/domains"))
            .and(query_param("page", "2"))
            .and(query_param("limit", "10"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": "d1", "name": "a.com"}],
                "links": {"next": "https://api/domains?page=3"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = client_for(&server).list_domains(2, 10).await.unwrap();
        assert_eq!(page.items[0].id, "d1");
        assert!(page.has_next);
    }

    #[tokio::test]
    async fn test_list_activity_sends_unix_dates() {
        use chrono::TimeZone;

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/activity/d1"))
            .and(query_param("date_from", "1735689600"))
            .and(query_param("date_to", "1735776000"))
            .and(query_param("event[]", "opened"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let query = ActivityQuery {
            date_from: chrono::Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            date_to: chrono::Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap(),
            events: vec!["opened".to_string()],
        };
        let page = client_for(&server)
            .list_activity("d1", &query, 1, 10)
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_next);
    }

    #[tokio::test]
    async fn test_send_email_reads_message_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/email"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "to": [{"email": "x@y.z"}],
                "subject": "S",
                "text": "T"
            })))
            .respond_with(ResponseTemplate::new(202).insert_header("X-Message-Id", "m-123"))
            .mount(&server)
            .await;

        let email = EmailRequest {
            from: None,
            to: vec![EmailAddress::new("x@y.z")],
            subject: "S".to_string(),
            text: Some("T".to_string()),
            html: None,
        };
        let outcome = client_for(&server).send_email(&email).await.unwrap();
        assert_eq!(outcome.status, 202);
        assert_eq!(outcome.message_id.as_deref(), Some("m-123"));
    }

    #[tokio::test]
    async fn test_validation_error_is_bridged() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sms"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "message": "Validation failed",
                "errors": {"from": ["invalid number"]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sms = SmsRequest {
            from: "+1".to_string(),
            to: vec!["+2".to_string()],
            text: "hi".to_string(),
        };
        let client = client_for(&server);
        let err = client.send_sms(&sms).await.unwrap_err();

        let api = err.api_error().expect("should be an API error");
        assert_eq!(api.status_code, 422);
        assert_eq!(api.message, "Validation failed");
        assert_eq!(api.field_errors["from"], vec!["invalid number"]);
        assert!(client.transport().take_last_error_body().is_none());
    }

    #[tokio::test]
    async fn test_exhausted_rate_limit_surfaces_as_429() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "message": "Too Many Attempts."
            })))
            .expect(2)
            .mount(&server)
            .await;

        let err = client_for(&server).list_tokens(1, 25).await.unwrap_err();
        assert_eq!(err.to_string(), "API error 429: Too Many Attempts.");
    }

    #[tokio::test]
    async fn test_unparseable_body_is_client_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/templates"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_templates(1, 25).await.unwrap_err();
        assert!(err.to_string().starts_with("failed to parse response:"));
    }
}
