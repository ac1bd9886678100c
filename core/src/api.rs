//! Authenticated JSON request adapter.
//!
//! # Design
//! `ApiClient` is the single place where requests are assembled and
//! responses are interpreted. It prefixes the configured base URL, always
//! sets JSON content headers, attaches a bearer token whenever the token
//! store holds one, and normalizes non-2xx responses into
//! `ApiError::Http { status, message }` by mining the error body for an
//! `error`/`message` field. It never touches session state — the stores
//! built on top own their own lifecycles.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::token::TokenStore;

/// Base URL used when `MOVIEDB_API_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Environment variable overriding the backend base URL.
pub const BASE_URL_ENV: &str = "MOVIEDB_API_URL";

/// Issues authenticated JSON requests against the backend.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            tokens,
        }
    }

    /// Build a client from `MOVIEDB_API_URL`, falling back to
    /// [`DEFAULT_BASE_URL`].
    pub fn from_env(transport: Arc<dyn Transport>, tokens: Arc<dyn TokenStore>) -> Self {
        let base_url = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(&base_url, transport, tokens)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shared handle to the token store. Reading is fine anywhere; writing
    /// is reserved to the session store.
    pub fn tokens(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.tokens)
    }

    pub fn has_token(&self) -> bool {
        self.tokens.get().is_some()
    }

    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(HttpMethod::Get, path, None)
    }

    pub fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let body =
            serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.request(HttpMethod::Post, path, Some(body))
    }

    /// POST with no payload (e.g. logout).
    pub fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(HttpMethod::Post, path, None)
    }

    pub fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(HttpMethod::Delete, path, None)
    }

    /// Execute one round trip and parse the JSON body into `T`.
    pub fn request<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
    ) -> Result<T, ApiError> {
        self.request_with_headers(method, path, body, &[])
    }

    /// Like [`request`](Self::request) but with caller header overrides,
    /// merged last so callers win on a (case-insensitive) name collision.
    pub fn request_with_headers<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        overrides: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let request = self.build_request(method, path, body, overrides);
        let response = self.transport.execute(&request)?;
        Self::parse_response(response)
    }

    fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        overrides: &[(&str, &str)],
    ) -> HttpRequest {
        let mut headers = vec![(
            "content-type".to_string(),
            "application/json".to_string(),
        )];
        if let Some(token) = self.tokens.get() {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        for (name, value) in overrides {
            headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
            headers.push((name.to_string(), value.to_string()));
        }
        HttpRequest {
            method,
            path: format!("{}{}", self.base_url, path),
            headers,
            body,
        }
    }

    fn parse_response<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                message: error_message(&response),
            });
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

/// Pull a human-readable message out of an error body, falling back to the
/// bare status when the body is not the expected JSON shape.
fn error_message(response: &HttpResponse) -> String {
    serde_json::from_str::<serde_json::Value>(&response.body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("HTTP {}", response.status))
}
