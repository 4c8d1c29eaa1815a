//! Persona Middleware
//!
//! Request setup shared by every route of a persona-enabled app, and a gate
//! for routes that need a signed-in user.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::{PersonaAssets, PersonaConfig};
use crate::domain::security::SecurityProvider;
use crate::domain::session::SessionHandle;
use crate::domain::verifier::Verifier;
use crate::error::PersonaError;
use crate::presentation::handlers::{PersonaAppState, forbidden_page};

/// Email of the signed-in user, stored in request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

/// Middleware loading the session and the Persona assets
///
/// Inserts [`SessionHandle`], [`PersonaAssets`] and, when signed in,
/// [`AuthenticatedUser`] into the request extensions. The session is written
/// back after the handler ran.
pub async fn persona_request<V, P>(
    State(state): State<PersonaAppState<V, P>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    V: Verifier + Send + Sync + 'static,
    P: SecurityProvider + 'static,
{
    let headers = req.headers();
    let session = SessionHandle::new(state.provider.load_session(headers));
    let userid = state.provider.authenticated_userid(headers);

    let assets = PersonaAssets::build(&state.config, userid.as_deref(), &session.csrf_token());

    req.extensions_mut().insert(session.clone());
    req.extensions_mut().insert(assets);
    if let Some(userid) = userid {
        req.extensions_mut().insert(AuthenticatedUser(userid));
    }

    let mut response = next.run(req).await;

    match state.provider.save_session(&session.snapshot()) {
        Ok(Some(cookie)) => {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!(error = %e, "Failed to persist persona session");
        }
    }

    response
}

/// Middleware answering with the forbidden page unless a user is signed in
///
/// Must run inside [`persona_request`].
pub async fn require_persona_user(
    State(config): State<Arc<PersonaConfig>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if req.extensions().get::<AuthenticatedUser>().is_some() {
        return next.run(req).await;
    }

    match req.extensions().get::<PersonaAssets>().cloned() {
        Some(assets) => forbidden_page(config, &assets).await,
        None => PersonaError::Internal("persona_request middleware is not installed".to_string())
            .into_response(),
    }
}
