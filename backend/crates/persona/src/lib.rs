//! Persona (BrowserID) Login Module
//!
//! Clean Architecture structure:
//! - `domain/` - Assertions, identity claims, sessions, collaborator traits
//! - `application/` - Login, logout, CSRF and forbidden-page use cases
//! - `infra/` - Remote verifier client and signed-cookie security provider
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Flow
//! - `GET /login` hands out the session CSRF token in `X-Csrf-Token`
//! - `POST /login` verifies the Persona assertion and remembers the email
//! - `/logout` forgets the identity
//! - protected routes render a 403 page with a Persona sign-in button
//!
//! ## Security Model
//! - Assertion checks are delegated to the verifier service
//! - Session and identity cookies are HMAC-SHA256 signed
//! - `came_from` redirect targets are NOT validated (open redirect risk)

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::{PersonaAssets, PersonaConfig};
pub use error::{ConfigError, PersonaError, PersonaResult};
pub use infra::{CookieSecurityProvider, RemoteVerifier};
pub use presentation::router::{persona_router, with_persona};
pub use presentation::handlers::PersonaAppState;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
