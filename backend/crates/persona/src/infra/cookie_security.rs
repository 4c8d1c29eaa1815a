//! Cookie Security Provider
//!
//! [`SecurityProvider`] built from a signed session cookie and a signed
//! identity cookie.

use axum::http::{HeaderMap, HeaderValue};
use platform::crypto::hmac_sha256;

use crate::application::config::PersonaConfig;
use crate::domain::security::SecurityProvider;
use crate::domain::session::Session;
use crate::error::PersonaResult;
use crate::infra::auth_ticket::AuthTicket;
use crate::infra::cookie_session::CookieSessionStore;

/// Security provider keeping all state in signed cookies
#[derive(Debug, Clone)]
pub struct CookieSecurityProvider {
    sessions: CookieSessionStore,
    tickets: AuthTicket,
}

impl CookieSecurityProvider {
    pub fn new(config: &PersonaConfig) -> Self {
        // Separate keys so a session cookie never verifies as an auth ticket
        let session_key = hmac_sha256(&config.secret, b"persona.session");
        let ticket_key = hmac_sha256(&config.secret, b"persona.auth");

        Self {
            sessions: CookieSessionStore::new(config.session_cookie(), session_key),
            tickets: AuthTicket::new(config.auth_cookie(), ticket_key, config.auth_max_age),
        }
    }
}

impl SecurityProvider for CookieSecurityProvider {
    fn load_session(&self, request: &HeaderMap) -> Session {
        self.sessions.load(request)
    }

    fn save_session(&self, session: &Session) -> PersonaResult<Option<HeaderValue>> {
        self.sessions.save(session)
    }

    fn remember(&self, _request: &HeaderMap, userid: &str) -> PersonaResult<HeaderMap> {
        self.tickets.remember(userid)
    }

    fn forget(&self, _request: &HeaderMap) -> PersonaResult<HeaderMap> {
        self.tickets.forget()
    }

    fn authenticated_userid(&self, request: &HeaderMap) -> Option<String> {
        self.tickets.authenticated_userid(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    fn pair(value: &HeaderValue) -> String {
        value.to_str().unwrap().split(';').next().unwrap().to_string()
    }

    #[test]
    fn test_session_cookie_not_accepted_as_ticket() {
        let config = PersonaConfig {
            session_cookie_name: "shared".to_string(),
            auth_cookie_name: "shared".to_string(),
            ..PersonaConfig::development("http://localhost")
        };
        let provider = CookieSecurityProvider::new(&config);

        let mut session = Session::new();
        session.get_csrf_token();
        let cookie = provider.save_session(&session).unwrap().unwrap();

        let mut request = HeaderMap::new();
        request.insert(header::COOKIE, HeaderValue::from_str(&pair(&cookie)).unwrap());
        assert!(provider.authenticated_userid(&request).is_none());
    }

    #[test]
    fn test_remember_and_forget() {
        let config = PersonaConfig::development("http://localhost");
        let provider = CookieSecurityProvider::new(&config);

        let issued = provider.remember(&HeaderMap::new(), "bob@example.com").unwrap();
        let set_cookie = &issued[header::SET_COOKIE];
        assert!(set_cookie.to_str().unwrap().starts_with("persona_auth="));

        let mut request = HeaderMap::new();
        request.insert(header::COOKIE, HeaderValue::from_str(&pair(set_cookie)).unwrap());
        assert_eq!(
            provider.authenticated_userid(&request).as_deref(),
            Some("bob@example.com")
        );

        let cleared = provider.forget(&request).unwrap();
        assert!(cleared[header::SET_COOKIE].to_str().unwrap().contains("Max-Age=0"));
    }
}
