//! CSRF Token Attachment

use axum::http::HeaderName;

use crate::application::context::ViewRequest;
use crate::domain::session::CsrfToken;
use crate::error::{PersonaError, PersonaResult};

/// Response header carrying the session CSRF token
pub const CSRF_HEADER: HeaderName = HeaderName::from_static("x-csrf-token");

/// Form field a client may echo the token in instead of the header
pub const CSRF_FIELD: &str = "csrf_token";

/// Put the session's CSRF token on the response and return it
///
/// The token comes from the session, so repeated calls within one request
/// set the same value.
pub fn attach_csrf_token(request: &mut ViewRequest) -> CsrfToken {
    let token = request.session.csrf_token();
    request
        .response_headers
        .insert(CSRF_HEADER, token.header_value());
    token
}

/// Require the client to echo `expected` in the header or the form
pub fn check_csrf_token(request: &ViewRequest, expected: &CsrfToken) -> PersonaResult<()> {
    let supplied = request
        .headers
        .get(&CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
        .or_else(|| request.form.get(CSRF_FIELD));

    match supplied {
        Some(candidate) if expected.matches(candidate) => Ok(()),
        _ => Err(PersonaError::InvalidCsrfToken),
    }
}
