//! Persona Router

use axum::{
    Router, middleware,
    routing::{any, get},
};

use crate::domain::security::SecurityProvider;
use crate::domain::verifier::Verifier;
use crate::presentation::handlers::{self, PersonaAppState};
use crate::presentation::middleware::persona_request;

/// Create the login and logout routes
///
/// The handlers read the session installed by [`persona_request`]; mount
/// the router through [`with_persona`] or add that middleware yourself.
pub fn persona_router<V, P>(state: PersonaAppState<V, P>) -> Router
where
    V: Verifier + Send + Sync + 'static,
    P: SecurityProvider + 'static,
{
    let login_path = state.config.login_path.clone();
    let logout_path = state.config.logout_path.clone();

    Router::new()
        .route(
            &login_path,
            get(handlers::login::<V, P>).post(handlers::login::<V, P>),
        )
        .route(&logout_path, any(handlers::logout::<V, P>))
        .with_state(state)
}

/// Merge the persona routes into `app` and wrap everything in [`persona_request`]
pub fn with_persona<V, P>(app: Router, state: PersonaAppState<V, P>) -> Router
where
    V: Verifier + Send + Sync + 'static,
    P: SecurityProvider + 'static,
{
    app.merge(persona_router(state.clone()))
        .layer(middleware::from_fn_with_state(state, persona_request::<V, P>))
}
