//! API Server Entry Point
//!
//! Demo site protected by Persona sign-in.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use axum::{
    Extension, Router, http,
    http::{Method, header},
    middleware,
    response::Html,
    routing::get,
};
use persona::middleware::{AuthenticatedUser, require_persona_user};
use persona::{
    CookieSecurityProvider, PersonaAppState, PersonaAssets, PersonaConfig, RemoteVerifier,
    with_persona,
};
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer, ExposeHeaders};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

const DEFAULT_BIND: &str = "0.0.0.0:31113";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,persona=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr: SocketAddr = env::var("PERSONA_BIND")
        .unwrap_or_else(|_| DEFAULT_BIND.to_string())
        .parse()?;

    // Persona configuration
    let config = if cfg!(debug_assertions) && env::var("PERSONA_AUDIENCES").is_err() {
        tracing::warn!("PERSONA_AUDIENCES not set, using development configuration");
        PersonaConfig::development(format!("http://localhost:{}", addr.port()))
    } else {
        PersonaConfig::from_env()?
    };

    tracing::info!(
        verifier = %config.verifier_url,
        audiences = ?config.audiences,
        require_csrf = config.require_csrf,
        "Persona configured"
    );

    let verifier = RemoteVerifier::from_config(&config)?;
    let provider = CookieSecurityProvider::new(&config);
    let state = PersonaAppState::new(verifier, provider, config);

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let csrf_header = http::HeaderName::from_static("x-csrf-token");

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
            csrf_header.clone(),
        ]))
        .expose_headers(ExposeHeaders::list([csrf_header]))
        .allow_credentials(true);

    // Build router
    let protected = Router::new()
        .route("/", get(home))
        .route_layer(middleware::from_fn_with_state(
            state.config.clone(),
            require_persona_user,
        ));

    let app = with_persona(protected, state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET / (signed-in users only)
async fn home(
    Extension(user): Extension<AuthenticatedUser>,
    Extension(assets): Extension<PersonaAssets>,
) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n  <head>\n    <meta charset=\"utf-8\" />\n    <title>Welcome</title>\n    {}\n  </head>\n  <body>\n    <p>Signed in as {}.</p>\n    <button id=\"signout\">Sign out</button>\n  </body>\n</html>\n",
        assets.js,
        escape_html(&user.0),
    ))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
