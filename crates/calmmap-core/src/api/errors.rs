//! Request error type shared by every API call.

use std::fmt;

use serde_json::Value;

/// Maximum number of characters of a raw response body kept in a message.
pub const BODY_EXCERPT_CHARS: usize = 200;

/// Message used when the server gives no usable error text.
pub const GENERIC_SERVER_ERROR: &str = "Server error";

/// Categories of request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestErrorKind {
    /// No response at all (connection refused, DNS, reset, body read failure)
    Network,
    /// The server answered with a non-2xx status
    HttpStatus,
}

impl fmt::Display for RequestErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestErrorKind::Network => write!(f, "network"),
            RequestErrorKind::HttpStatus => write!(f, "http_status"),
        }
    }
}

/// A failed API call with a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    pub kind: RequestErrorKind,
    /// HTTP status, when a response was received
    pub status: Option<u16>,
    /// One-line message suitable for inline display
    pub message: String,
}

impl RequestError {
    /// Creates a network-level error.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: RequestErrorKind::Network,
            status: None,
            message: message.into(),
        }
    }

    /// Creates an HTTP status error with an explicit message.
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: RequestErrorKind::HttpStatus,
            status: Some(status),
            message: message.into(),
        }
    }

    /// Creates an HTTP status error from a parsed JSON body.
    ///
    /// Uses the server's `error` field when present, else a generic message.
    pub fn from_json_body(status: u16, body: &Value) -> Self {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|msg| !msg.is_empty())
            .map_or_else(
                || format!("{GENERIC_SERVER_ERROR} (HTTP {status})"),
                str::to_string,
            );
        Self::http_status(status, message)
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RequestError {}

/// Returns at most [`BODY_EXCERPT_CHARS`] characters of `body`.
pub fn body_excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
