//! Input validation for command arguments

use crate::error::CliError;
use chrono::{DateTime, NaiveDate, Utc};

/// Validate email format
pub fn validate_email(email: &str) -> crate::Result<()> {
    if email.is_empty() {
        return Err(CliError::InvalidArguments("Email cannot be empty".to_string()).into());
    }

    // Exactly one @ with a non-empty local part and a dotted domain
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(CliError::InvalidArguments(format!(
            "Invalid email '{}': Email must have username and domain parts",
            email
        ))
        .into());
    }

    if !parts[1].contains('.') {
        return Err(CliError::InvalidArguments(format!(
            "Invalid email '{}': Domain must contain dot",
            email
        ))
        .into());
    }

    Ok(())
}

/// Validate an API token pasted at the login prompt
pub fn validate_api_token(token: &str) -> crate::Result<()> {
    if token.trim().is_empty() {
        return Err(CliError::InvalidArguments("API token cannot be empty".to_string()).into());
    }

    if token.chars().any(char::is_whitespace) {
        return Err(
            CliError::InvalidArguments("API token must not contain whitespace".to_string()).into(),
        );
    }

    Ok(())
}

/// Phone numbers in international format, e.g. `+12025550123`
pub fn validate_phone_number(number: &str) -> crate::Result<()> {
    let digits = number.strip_prefix('+').unwrap_or(number);
    if digits.len() < 7 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(CliError::InvalidArguments(format!(
            "Invalid phone number '{}': expected digits with an optional leading +",
            number
        ))
        .into());
    }
    Ok(())
}

/// Parse a `YYYY-MM-DD` argument as midnight UTC
pub fn parse_date(value: &str) -> crate::Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        CliError::InvalidArguments(format!(
            "Invalid date '{}': expected YYYY-MM-DD",
            value
        ))
    })?;

    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc())
}
