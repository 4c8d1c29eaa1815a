//! Session and CSRF Token
//!
//! A session carries the per-visitor CSRF token. It is loaded once per
//! request and shared between middleware and handlers through
//! [`SessionHandle`].

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::http::HeaderValue;
use platform::crypto::{constant_time_eq, random_token};

/// Bytes of entropy in a freshly generated CSRF token
const CSRF_TOKEN_BYTES: usize = 20;

/// Anti-forgery token bound to a session
///
/// Always URL-safe base64, so it is a valid header value.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Fresh random token
    pub fn generate() -> Self {
        Self(random_token(CSRF_TOKEN_BYTES))
    }

    /// Accept a stored token if it only uses the URL-safe alphabet
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare with a client-supplied value in constant time
    pub fn matches(&self, candidate: &str) -> bool {
        constant_time_eq(self.0.as_bytes(), candidate.as_bytes())
    }

    pub fn header_value(&self) -> HeaderValue {
        HeaderValue::from_str(&self.0).unwrap_or_else(|_| HeaderValue::from_static(""))
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CsrfToken(..)")
    }
}

impl fmt::Display for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session state
#[derive(Debug, Clone, Default)]
pub struct Session {
    csrf_token: Option<CsrfToken>,
    changed: bool,
}

impl Session {
    /// Empty session for a first-time visitor
    pub fn new() -> Self {
        Self::default()
    }

    /// Session rebuilt from storage; unchanged until mutated
    pub fn restore(csrf_token: Option<CsrfToken>) -> Self {
        Self {
            csrf_token,
            changed: false,
        }
    }

    /// Current CSRF token, created on first use
    pub fn get_csrf_token(&mut self) -> CsrfToken {
        match &self.csrf_token {
            Some(token) => token.clone(),
            None => self.new_csrf_token(),
        }
    }

    /// Replace the CSRF token
    pub fn new_csrf_token(&mut self) -> CsrfToken {
        let token = CsrfToken::generate();
        self.csrf_token = Some(token.clone());
        self.changed = true;
        token
    }

    pub fn peek_csrf_token(&self) -> Option<&CsrfToken> {
        self.csrf_token.as_ref()
    }

    /// Whether the session must be written back
    pub fn is_changed(&self) -> bool {
        self.changed
    }
}

/// Request-scoped handle to the session
#[derive(Debug, Clone, Default)]
pub struct SessionHandle(Arc<Mutex<Session>>);

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    /// Current CSRF token, created on first use
    pub fn csrf_token(&self) -> CsrfToken {
        self.lock().get_csrf_token()
    }

    /// Copy of the session state, for persisting
    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
