//! Security Provider Trait
//!
//! The hosting side of the flow: session storage and the headers that
//! establish or clear an authenticated identity.

use axum::http::{HeaderMap, HeaderValue};

use crate::domain::session::Session;
use crate::error::PersonaResult;

/// Session and identity provider
pub trait SecurityProvider: Send + Sync {
    /// Load the session attached to `request`, or start an empty one
    fn load_session(&self, request: &HeaderMap) -> Session;

    /// Header persisting `session`, or `None` when it did not change
    fn save_session(&self, session: &Session) -> PersonaResult<Option<HeaderValue>>;

    /// Headers establishing `userid` as the authenticated identity
    fn remember(&self, request: &HeaderMap, userid: &str) -> PersonaResult<HeaderMap>;

    /// Headers clearing whatever identity `request` carries
    fn forget(&self, request: &HeaderMap) -> PersonaResult<HeaderMap>;

    /// Identity established by an earlier `remember`, if still valid
    fn authenticated_userid(&self, request: &HeaderMap) -> Option<String>;
}
