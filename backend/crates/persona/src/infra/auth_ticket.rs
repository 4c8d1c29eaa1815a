//! Auth Ticket
//!
//! Signed cookie naming the authenticated email.

use std::time::Duration;

use axum::http::{HeaderMap, header};
use chrono::Utc;
use kernel::error::app_error::AppError;
use platform::cookie::{CookieConfig, extract_cookie};
use platform::crypto::{sign_token, verify_token};
use serde::{Deserialize, Serialize};

use crate::error::PersonaResult;

#[derive(Debug, Serialize, Deserialize)]
struct TicketPayload {
    /// Authenticated email
    sub: String,
    /// Issued at, seconds since the epoch
    iat: i64,
}

/// Identity cookie issued on login and expired on logout
#[derive(Debug, Clone)]
pub struct AuthTicket {
    cookie: CookieConfig,
    key: [u8; 32],
    max_age: Option<Duration>,
}

impl AuthTicket {
    pub fn new(cookie: CookieConfig, key: [u8; 32], max_age: Option<Duration>) -> Self {
        Self {
            cookie,
            key,
            max_age,
        }
    }

    /// Headers issuing a ticket for `userid`
    pub fn remember(&self, userid: &str) -> PersonaResult<HeaderMap> {
        let payload = serde_json::to_string(&TicketPayload {
            sub: userid.to_string(),
            iat: Utc::now().timestamp(),
        })
        .map_err(AppError::from)?;

        let mut headers = HeaderMap::new();
        headers.append(
            header::SET_COOKIE,
            self.cookie.set_cookie_header(&sign_token(&self.key, &payload))?,
        );
        Ok(headers)
    }

    /// Headers expiring the ticket
    pub fn forget(&self) -> PersonaResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.append(header::SET_COOKIE, self.cookie.delete_cookie_header()?);
        Ok(headers)
    }

    /// Email named by a valid, unexpired ticket
    pub fn authenticated_userid(&self, request: &HeaderMap) -> Option<String> {
        let raw = extract_cookie(request, &self.cookie.name)?;
        if raw.is_empty() {
            return None;
        }

        let payload = verify_token(&self.key, &raw)
            .map_err(|e| tracing::debug!(error = %e, "Ignoring unverifiable auth ticket"))
            .ok()?;
        let ticket: TicketPayload = serde_json::from_str(&payload).ok()?;

        if let Some(max_age) = self.max_age {
            let age = Utc::now().timestamp() - ticket.iat;
            if age < 0 || age as u64 > max_age.as_secs() {
                tracing::debug!(age, "Ignoring expired auth ticket");
                return None;
            }
        }

        Some(ticket.sub)
    }
}
