//! Error types for the movie API client.
//!
//! # Design
//! Two failure families cross the adapter boundary: `Network` (no response
//! reached the client at all) and `Http` (the server answered with a non-2xx
//! status, normalized to a status code plus a human-readable message).
//! `AuthRequired` never involves the network — it is the synchronous guard
//! the stores apply before dispatching a mutation without a session.

use std::fmt;

/// Errors produced by `ApiClient` and the transport seam.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// The transport obtained no response (connection refused, DNS failure,
    /// timeout).
    Network(String),

    /// The server returned a non-2xx status. `message` comes from the error
    /// body's `error`/`message` field when present, else `HTTP <status>`.
    Http { status: u16, message: String },

    /// A mutation was attempted without an authenticated session. Raised
    /// locally, before any network call.
    AuthRequired,

    /// The request payload could not be serialized to JSON.
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    Deserialization(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Http { status, message } => {
                write!(f, "HTTP {status}: {message}")
            }
            ApiError::AuthRequired => write!(f, "authentication required"),
            ApiError::Serialization(msg) => {
                write!(f, "serialization failed: {msg}")
            }
            ApiError::Deserialization(msg) => {
                write!(f, "deserialization failed: {msg}")
            }
        }
    }
}

impl std::error::Error for ApiError {}
