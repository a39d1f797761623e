//! Error taxonomy shared by the fetcher, configuration, and form checks.

use std::fmt;

use thiserror::Error;

/// Failure talking to the catalog API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed (connection refused, DNS, reset...).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    /// The server answered with a non-2xx status.
    #[error("{}", describe_http(.status, .message))]
    Http {
        /// HTTP status code returned by the server.
        status: u16,
        /// Server supplied `message` field, when the body carried one.
        message: Option<String>,
    },
    /// A 2xx body that could not be decoded into the expected records.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Status code for HTTP failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn describe_http(status: &u16, message: &Option<String>) -> String {
    match message.as_deref() {
        Some(message) if !message.trim().is_empty() => message.to_string(),
        _ => format!("HTTP error! status: {status}"),
    }
}

/// Form field a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Game name.
    Name,
    /// Game genre.
    Genre,
    /// Game platform.
    Platform,
    /// Game release year.
    ReleaseYear,
    /// Headline rating of a game or star rating of a review.
    Rating,
    /// Review author.
    Author,
    /// Review body.
    Text,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Field::Name => "name",
            Field::Genre => "genre",
            Field::Platform => "platform",
            Field::ReleaseYear => "release year",
            Field::Rating => "rating",
            Field::Author => "author",
            Field::Text => "review",
        };
        f.write_str(label)
    }
}

/// A client-side form check failed; nothing was sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ValidationError {
    /// Offending field.
    pub field: Field,
    /// User-facing explanation.
    pub reason: String,
}

impl ValidationError {
    pub(crate) fn new(field: Field, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Configuration could not be loaded or holds unusable values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Layered source failed to load or deserialize.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    /// A value parsed but cannot be used.
    #[error("invalid `{key}`: {reason}")]
    Invalid {
        /// Configuration key.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_prefers_server_message() {
        let err = ApiError::Http {
            status: 404,
            message: Some("Game not found".to_string()),
        };
        assert_eq!(err.to_string(), "Game not found");
        assert_eq!(err.status(), Some(404));

        let bare = ApiError::Http {
            status: 500,
            message: None,
        };
        assert_eq!(bare.to_string(), "HTTP error! status: 500");
    }

    #[test]
    fn validation_error_displays_reason() {
        let err = ValidationError::new(Field::Name, "Name is required");
        assert_eq!(err.to_string(), "Name is required");
        assert_eq!(err.field.to_string(), "name");
    }
}
