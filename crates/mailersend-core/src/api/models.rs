use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Custom deserializer: accepts string or numeric identifiers and normalises
/// them to strings
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "unexpected identifier: {}",
            other
        ))),
    }
}

/// Treats `null` like an absent value for collection fields.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Pagination envelope
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Links {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Meta {
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub last_page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// `{data: [...], links: {next?}, meta: {...}}`
#[derive(Debug, Deserialize, Clone)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Paginated<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub data: Vec<T>,
    #[serde(default)]
    pub links: Option<Links>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

impl<T> Paginated<T> {
    /// A non-empty `links.next` is the only "more pages" signal.
    pub fn has_next(&self) -> bool {
        self.links
            .as_ref()
            .and_then(|links| links.next.as_deref())
            .is_some_and(|next| !next.is_empty())
    }
}

/// `{data: {...}}` wrapper for single-resource responses.
#[derive(Debug, Deserialize, Clone)]
pub struct DataEnvelope<T> {
    pub data: T,
}

// Domain models
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Domain {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_dns_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

// Activity models
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Activity {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, rename = "type")]
    pub event: String,
    #[serde(default)]
    pub email: Option<ActivityEmail>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ActivityEmail {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub recipient: Option<ActivityRecipient>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ActivityRecipient {
    #[serde(default)]
    pub email: String,
}

/// Filters for the activity endpoint. Dates are sent as Unix seconds.
#[derive(Debug, Clone)]
pub struct ActivityQuery {
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub events: Vec<String>,
}

impl ActivityQuery {
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("date_from".to_string(), self.date_from.timestamp().to_string()),
            ("date_to".to_string(), self.date_to.timestamp().to_string()),
        ];
        pairs.extend(
            self.events
                .iter()
                .map(|event| ("event[]".to_string(), event.clone())),
        );
        pairs
    }
}

// Sending models
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct EmailAddress {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EmailAddress {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct EmailRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<EmailAddress>,
    pub to: Vec<EmailAddress>,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct SmsRequest {
    pub from: String,
    pub to: Vec<String>,
    pub text: String,
}

/// Result of an accepted send; the id comes from the `X-Message-Id` or
/// `X-SMS-Message-Id` response header.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SendOutcome {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

// Account resources
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Template {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Webhook {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiToken {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_domain_page_deserialization() {
        let json = r#"{
            "data": [{"id":"x","name":"a.com","is_verified":true,"is_dns_active":true,"created_at":"2024-01-01T00:00:00Z"}],
            "links": {"next": null},
            "meta": {"current_page":1,"last_page":1,"per_page":25,"total":1}
        }"#;

        let page: Paginated<Domain> = serde_json::from_str(json).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].name, "a.com");
        assert!(page.data[0].is_verified);
        assert!(!page.has_next());
        assert_eq!(page.meta.unwrap().total, Some(1));
    }

    #[test]
    fn test_has_next_requires_non_empty_link() {
        let page: Paginated<Domain> =
            serde_json::from_str(r#"{"data":[],"links":{"next":""}}"#).unwrap();
        assert!(!page.has_next());

        let page: Paginated<Domain> =
            serde_json::from_str(r#"{"data":[],"links":{"next":"https://x/?page=2"}}"#).unwrap();
        assert!(page.has_next());

        let page: Paginated<Domain> = serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert!(page.data.is_empty());
        assert!(!page.has_next());
    }

    #[test]
    fn test_numeric_ids_become_strings() {
        let webhook: Webhook = serde_json::from_str(
            r#"{"id": 42, "name": "hook", "url": "https://h", "enabled": true, "events": null}"#,
        )
        .unwrap();
        assert_eq!(webhook.id, "42");
        assert!(webhook.events.is_empty());
    }

    #[test]
    fn test_email_request_omits_absent_fields() {
        let request = EmailRequest {
            from: None,
            to: vec![EmailAddress::new("x@y.z")],
            subject: "S".to_string(),
            text: Some("T".to_string()),
            html: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"to": [{"email": "x@y.z"}], "subject": "S", "text": "T"})
        );
    }

    #[test]
    fn test_activity_query_pairs() {
        let query = ActivityQuery {
            date_from: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            date_to: Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap(),
            events: vec!["delivered".to_string(), "opened".to_string()],
        };

        let pairs = query.to_query_pairs();
        assert_eq!(pairs[0], ("date_from".to_string(), "1735689600".to_string()));
        assert_eq!(pairs[1], ("date_to".to_string(), "1735776000".to_string()));
        assert_eq!(pairs[2].0, "event[]");
        assert_eq!(pairs.len(), 4);
    }
}
