//! Turns status errors from the typed client into user-facing API errors.
//!
//! The typed client only knows the status line of a failed response. The
//! body, with the server's message and per-field validation errors, is
//! recovered from the transport's last-error slot.

use crate::api::transport::RetryingTransport;
use crate::error::{ApiError, AppError, ClientError};
use serde_json::Value;
use std::collections::BTreeMap;

/// Enrich a status error with the body the transport captured. Any other
/// error is returned unchanged.
pub fn bridge(err: AppError, transport: &RetryingTransport) -> AppError {
    if !is_status_error(&err) {
        return err;
    }
    enrich(err, transport.take_last_error_body())
}

/// Result form of [`bridge`]; `Ok` values pass through untouched.
pub fn bridge_result<T>(
    result: Result<T, AppError>,
    transport: &RetryingTransport,
) -> Result<T, AppError> {
    result.map_err(|err| bridge(err, transport))
}

fn is_status_error(err: &AppError) -> bool {
    matches!(err, AppError::Client(ClientError::Status { .. }))
}

/// Build an [`ApiError`] from a status error and an optional response body.
pub fn enrich(err: AppError, captured_body: Option<Vec<u8>>) -> AppError {
    let (status_code, short_message) = match &err {
        AppError::Client(ClientError::Status { status, message }) => (*status, message.clone()),
        _ => return err,
    };

    let mut api_error = ApiError::new(status_code, short_message);

    if let Some(body) = captured_body.filter(|b| !b.is_empty()) {
        if let Ok(envelope) = serde_json::from_slice::<Value>(&body) {
            if let Some(message) = envelope
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
            {
                api_error.message = message.to_string();
            }
            if let Some(errors) = envelope.get("errors") {
                api_error.field_errors = field_errors(errors);
            }
        } else {
            log::debug!("error body for status {} is not JSON", status_code);
        }
        api_error.raw_body = Some(String::from_utf8_lossy(&body).into_owned());
    }

    if api_error.message.trim().is_empty() {
        api_error.message = err.to_string().trim().to_string();
    }

    AppError::Api(api_error)
}

/// Accepts `{field: [msg, ...]}`; a bare string value counts as one message.
fn field_errors(errors: &Value) -> BTreeMap<String, Vec<String>> {
    let Some(map) = errors.as_object() else {
        return BTreeMap::new();
    };

    map.iter()
        .filter_map(|(field, value)| {
            let messages: Vec<String> = match value {
                Value::String(s) => vec![s.clone()],
                Value::Array(items) => items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
                _ => Vec::new(),
            };
            (!messages.is_empty()).then(|| (field.clone(), messages))
        })
        .collect()
}
