//! Error types for the runner, JSON extraction and the users client.
//!
//! # Design
//! `HttpError` covers everything that can go wrong between building a request
//! and holding a parsed body. `ExtractionError` covers reading fields out of
//! that body. `ApiError` is what the typed users client returns and simply
//! wraps the two.

use std::fmt;
use std::time::Duration;

/// Errors returned by `RequestRunner`.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The response status differs from the one the request declared.
    #[error("unexpected status {got}, expected {expected}")]
    UnexpectedStatus { got: u16, expected: u16 },

    /// DNS, TLS, connection or body transfer failure.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// A body declared as JSON did not parse.
    #[error("invalid JSON body: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request payload could not be turned into JSON.
    #[error("could not serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request cancelled")]
    Cancelled,

    /// Base URL and path do not combine into a usable URI.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Writing to or closing a download sink failed.
    #[error("sink error: {0}")]
    Io(#[from] std::io::Error),
}

impl HttpError {
    /// Classifies a reqwest failure, given the timeout that was in force.
    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            HttpError::Timeout(timeout)
        } else {
            HttpError::Transport(err)
        }
    }
}

/// The shape of a JSON value, used in type-mismatch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl JsonKind {
    pub fn of(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => JsonKind::Null,
            Value::Bool(_) => JsonKind::Bool,
            Value::Number(n) if n.is_f64() => JsonKind::Float,
            Value::Number(_) => JsonKind::Integer,
            Value::String(_) => JsonKind::String,
            Value::Array(_) => JsonKind::Array,
            Value::Object(_) => JsonKind::Object,
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JsonKind::Null => "null",
            JsonKind::Bool => "bool",
            JsonKind::Integer => "integer",
            JsonKind::Float => "float",
            JsonKind::String => "string",
            JsonKind::Array => "array",
            JsonKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// Errors returned by the `extract*` helpers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("missing key `{0}`")]
    MissingKey(String),

    #[error("expected {expected}, found {actual}")]
    TypeMismatch { expected: JsonKind, actual: JsonKind },
}

/// Errors returned by `UsersClient` parse methods and the scenario.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("bad response body: {0}")]
    Extraction(#[from] ExtractionError),

    /// A JSON body was required but the response had none.
    #[error("empty response body (status {status})")]
    MissingBody { status: u16 },
}

/// Errors raised while assembling a `Config`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
