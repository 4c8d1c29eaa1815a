//! Cookie Session Store
//!
//! Keeps the session in a signed cookie so no server-side storage is needed.

use axum::http::{HeaderMap, HeaderValue};
use kernel::error::app_error::AppError;
use platform::cookie::{CookieConfig, extract_cookie};
use platform::crypto::{sign_token, verify_token};
use serde::{Deserialize, Serialize};

use crate::domain::session::{CsrfToken, Session};
use crate::error::PersonaResult;

#[derive(Debug, Serialize, Deserialize)]
struct SessionPayload {
    csrf: String,
}

/// Session store backed by an HMAC-signed cookie
#[derive(Debug, Clone)]
pub struct CookieSessionStore {
    cookie: CookieConfig,
    key: [u8; 32],
}

impl CookieSessionStore {
    pub fn new(cookie: CookieConfig, key: [u8; 32]) -> Self {
        Self { cookie, key }
    }

    /// Session carried by the request; a missing or tampered cookie starts a new one
    pub fn load(&self, request: &HeaderMap) -> Session {
        let Some(raw) = extract_cookie(request, &self.cookie.name) else {
            return Session::new();
        };

        let payload = match verify_token(&self.key, &raw) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(error = %e, "Discarding unverifiable session cookie");
                return Session::new();
            }
        };

        match serde_json::from_str::<SessionPayload>(&payload)
            .ok()
            .and_then(|payload| CsrfToken::parse(&payload.csrf))
        {
            Some(token) => Session::restore(Some(token)),
            None => {
                tracing::debug!("Discarding malformed session payload");
                Session::new()
            }
        }
    }

    /// Set-Cookie header for a changed session
    pub fn save(&self, session: &Session) -> PersonaResult<Option<HeaderValue>> {
        if !session.is_changed() {
            return Ok(None);
        }
        let Some(token) = session.peek_csrf_token() else {
            return Ok(None);
        };

        let payload = serde_json::to_string(&SessionPayload {
            csrf: token.as_str().to_string(),
        })
        .map_err(AppError::from)?;

        let value = sign_token(&self.key, &payload);
        Ok(Some(self.cookie.set_cookie_header(&value)?))
    }
}
