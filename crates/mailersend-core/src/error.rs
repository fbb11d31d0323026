use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Top-level error for every operation in the crate.
///
/// Displays transparently so the user sees exactly the text of the wrapped
/// error, most importantly the [`ApiError`] rendering.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Cli(#[from] CliError),
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<AppError>,
    },
}

/// The error shape presented to users for any HTTP 4xx/5xx response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status_code: u16,
    pub message: String,
    /// Field name to validation messages, as reported by the server.
    pub field_errors: BTreeMap<String, Vec<String>>,
    pub raw_body: Option<String>,
}

impl ApiError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            field_errors: BTreeMap::new(),
            raw_body: None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API error {}: {}", self.status_code, self.message)?;

        let width = self
            .field_errors
            .keys()
            .map(|field| field.chars().count())
            .max()
            .unwrap_or(0);

        for (field, messages) in &self.field_errors {
            for message in messages {
                write!(f, "\n  {:<width$}  {}", field, message, width = width)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Errors produced by the typed client before they pass through the error
/// bridge. `Status` only knows the canonical reason phrase; the response body
/// lives in the transport's last-error slot.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{status} {message}")]
    Status { status: u16, message: String },
    #[error("failed to parse response: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed after {retries} retries: {cause}")]
    RetriesExhausted { retries: u32, cause: String },
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no profiles configured")]
    NoProfiles,
    #[error("profile {name} not found")]
    ProfileNotFound { name: String },
    #[error("no token found")]
    NoToken,
    #[error("failed to parse config: {detail}")]
    Parse { detail: String },
    #[error("failed to serialize config: {detail}")]
    Serialize { detail: String },
    #[error("file I/O error at {path}: {source}")]
    FileIo {
        path: String,
        source: std::io::Error,
    },
    #[error("configuration directory not found")]
    ConfigDirNotFound,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("refresh failed: {reason}")]
    RefreshFailed { reason: String },
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("domain {input} not found")]
    DomainNotFound { input: String },
    #[error("domain ID {id} not found")]
    DomainIdNotFound { id: String },
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("failed to render output: {0}")]
    Output(String),
}

impl AppError {
    /// Wrap the error with a short description of the step that failed.
    pub fn context(self, context: impl Into<String>) -> Self {
        AppError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The structured API error underneath any added context.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            AppError::Api(err) => Some(err),
            AppError::Context { source, .. } => source.api_error(),
            _ => None,
        }
    }

    pub fn troubleshooting_hint(&self) -> Option<String> {
        match self {
            AppError::Config(ConfigError::NoToken | ConfigError::NoProfiles) => Some(
                "Run 'mailersend auth login' or set MAILERSEND_API_TOKEN".to_string(),
            ),
            AppError::Config(ConfigError::ProfileNotFound { .. }) => {
                Some("'mailersend profile list' shows the configured profiles".to_string())
            }
            AppError::Auth(AuthError::RefreshFailed { .. }) => {
                Some("Log in again with 'mailersend auth login'".to_string())
            }
            AppError::Api(err) if err.status_code == 401 => {
                Some("Check that your API token is valid and not revoked".to_string())
            }
            AppError::Transport(TransportError::RetriesExhausted { .. }) => {
                Some("Check your internet connection and try again".to_string())
            }
            AppError::Context { source, .. } => source.troubleshooting_hint(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_without_field_errors() {
        let err = ApiError::new(404, "Resource not found");
        assert_eq!(format!("{}", err), "API error 404: Resource not found");
    }

    #[test]
    fn test_api_error_display_aligns_field_names() {
        let mut err = ApiError::new(422, "Validation failed");
        err.field_errors
            .insert("from.email".to_string(), vec!["required".to_string()]);
        err.field_errors
            .insert("to".to_string(), vec!["at least one".to_string()]);

        let rendered = format!("{}", err);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "API error 422: Validation failed");
        assert_eq!(lines[1], "  from.email  required");
        assert_eq!(lines[2], "  to          at least one");
    }

    #[test]
    fn test_api_error_display_one_line_per_message() {
        let mut err = ApiError::new(422, "Invalid");
        err.field_errors.insert(
            "subject".to_string(),
            vec!["too long".to_string(), "must be text".to_string()],
        );

        let rendered = format!("{}", err);
        assert_eq!(rendered.lines().count(), 3);
        assert!(rendered.contains("subject  too long"));
        assert!(rendered.contains("subject  must be text"));
    }

    #[test]
    fn test_app_error_is_transparent() {
        let app_err = AppError::Api(ApiError::new(500, "Server Error"));
        assert_eq!(format!("{}", app_err), "API error 500: Server Error");

        let app_err = AppError::Config(ConfigError::ProfileNotFound {
            name: "work".to_string(),
        });
        assert_eq!(format!("{}", app_err), "profile work not found");
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::RetriesExhausted {
            retries: 3,
            cause: "connection refused".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "request failed after 3 retries: connection refused"
        );
    }

    #[test]
    fn test_context_keeps_api_error_structure() {
        let mut inner = ApiError::new(422, "Validation failed");
        inner
            .field_errors
            .insert("name".to_string(), vec!["required".to_string()]);
        let err = AppError::Api(inner.clone()).context("failed to fetch current route");

        assert!(
            format!("{}", err).starts_with("failed to fetch current route: API error 422")
        );
        assert_eq!(err.api_error(), Some(&inner));
    }

    #[test]
    fn test_troubleshooting_hints() {
        assert!(AppError::Config(ConfigError::NoToken)
            .troubleshooting_hint()
            .is_some());
        assert!(AppError::Api(ApiError::new(401, "Unauthenticated."))
            .troubleshooting_hint()
            .is_some());
        assert!(AppError::Api(ApiError::new(422, "Invalid"))
            .troubleshooting_hint()
            .is_none());
    }
}
