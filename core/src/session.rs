//! Session lifecycle: login, logout, and token verification.
//!
//! # Design
//! Three states: `Unauthenticated`, `Initializing` (a persisted token
//! exists but has not been verified this process), `Authenticated`. The
//! store is the only writer of the persisted token; `ApiClient` just reads
//! it. Wherever the state is ambiguous — verification failed, the response
//! is missing an identity — the store clears everything and lands in
//! `Unauthenticated` rather than trusting a possibly stale session.
//!
//! Invalid credentials are a normal negative result, not an error: `login`
//! returns `false` and never panics or propagates.

use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::types::{LoginRequest, LoginResponse, RegisterRequest, User, VerifyResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    /// A persisted token exists but has not been verified yet. Treated as
    /// unauthenticated by every read until `verify` resolves it.
    Initializing,
    Authenticated,
}

/// Holds the current authenticated identity and drives the auth endpoints.
#[derive(Debug, Clone)]
pub struct SessionStore {
    api: ApiClient,
    state: SessionState,
    user: Option<User>,
}

impl SessionStore {
    /// Starts `Initializing` when a token survives from a previous run,
    /// else `Unauthenticated`. Call [`verify`](Self::verify) to resolve.
    pub fn new(api: ApiClient) -> Self {
        let state = if api.has_token() {
            SessionState::Initializing
        } else {
            SessionState::Unauthenticated
        };
        Self {
            api,
            state,
            user: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// `true` only in `Authenticated`; an unresolved `Initializing` token
    /// does not count.
    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    pub fn is_admin(&self) -> bool {
        self.is_authenticated()
            && self
                .user
                .as_ref()
                .is_some_and(|u| u.role == crate::types::Role::Admin)
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Verify the persisted token against the backend.
    ///
    /// No token: clears local identity and stays `Unauthenticated` — calling
    /// this twice from `Unauthenticated` is a no-op both times. Token
    /// present: a successful verification stores the returned identity; any
    /// failure discards the token.
    pub fn verify(&mut self) -> bool {
        if !self.api.has_token() {
            self.user = None;
            self.state = SessionState::Unauthenticated;
            return false;
        }
        match self.api.get::<VerifyResponse>("/auth/verify") {
            Ok(VerifyResponse {
                success: true,
                user: Some(user),
            }) => {
                self.user = Some(user);
                self.state = SessionState::Authenticated;
                true
            }
            Ok(_) => {
                debug!("token verification returned no identity, clearing session");
                self.clear_local();
                false
            }
            Err(e) => {
                debug!(error = %e, "token verification failed, clearing session");
                self.clear_local();
                false
            }
        }
    }

    /// Attempt to authenticate. Returns `true` and persists the issued
    /// token on success; invalid credentials and transport failures both
    /// return `false` with no state change.
    pub fn login(&mut self, email: &str, password: &str) -> bool {
        let payload = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.api.post::<LoginResponse, _>("/auth/login", &payload) {
            Ok(LoginResponse {
                success: true,
                user: Some(user),
                token: Some(token),
            }) => {
                self.api.tokens().set(&token);
                self.user = Some(user);
                self.state = SessionState::Authenticated;
                true
            }
            Ok(_) => {
                debug!(email, "login rejected by backend");
                false
            }
            Err(ApiError::Http { status, message }) if status == 400 || status == 401 => {
                debug!(email, %message, "invalid credentials");
                false
            }
            Err(e) => {
                warn!(email, error = %e, "login failed");
                false
            }
        }
    }

    /// Create an account and sign in as it. Mirrors [`login`](Self::login):
    /// the issued token is persisted on success; a rejected registration
    /// (email already taken, invalid input) is a normal negative result.
    pub fn register(&mut self, email: &str, password: &str, name: &str) -> bool {
        let payload = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };
        match self.api.post::<LoginResponse, _>("/auth/register", &payload) {
            Ok(LoginResponse {
                success: true,
                user: Some(user),
                token: Some(token),
            }) => {
                self.api.tokens().set(&token);
                self.user = Some(user);
                self.state = SessionState::Authenticated;
                true
            }
            Ok(_) => {
                debug!(email, "registration rejected by backend");
                false
            }
            Err(ApiError::Http { status, message }) if status == 400 || status == 409 => {
                debug!(email, %message, "registration rejected");
                false
            }
            Err(e) => {
                warn!(email, error = %e, "registration failed");
                false
            }
        }
    }

    /// Best-effort backend notification, then unconditional local teardown.
    /// A failed notification is logged and swallowed; the token and
    /// identity are discarded either way.
    pub fn logout(&mut self) {
        if self.api.has_token() {
            if let Err(e) = self.api.post_empty::<serde_json::Value>("/auth/logout") {
                warn!(error = %e, "logout notification failed");
            }
        }
        self.clear_local();
    }

    fn clear_local(&mut self) {
        self.api.tokens().clear();
        self.user = None;
        self.state = SessionState::Unauthenticated;
    }
}
