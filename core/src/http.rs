//! HTTP transport types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. The coordination stores never talk
//! to the network directly — they hand an `HttpRequest` to an injected
//! [`Transport`] and interpret the `HttpResponse` it returns. This keeps the
//! core deterministic: unit tests inject a scripted transport, integration
//! tests inject a real one backed by ureq.
//!
//! All fields use owned types (`String`, `Vec`) so values can be recorded,
//! cloned, and compared freely in tests.

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
///
/// Produced by a [`Transport`] after executing an `HttpRequest`; status
/// interpretation and body parsing happen in `ApiClient`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Executes HTTP round trips on behalf of the client core.
///
/// Implementations return the response for any status code — 4xx/5xx are
/// data, not errors — and report `ApiError::Network` only when no response
/// was obtained at all (connection refused, DNS failure, timeout).
/// Implementations own the request timeout; the core does not retry.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl HttpResponse {
    /// Whether the status is in the 2xx success range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
