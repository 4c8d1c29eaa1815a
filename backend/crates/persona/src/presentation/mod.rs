//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::PersonaAppState;
pub use middleware::{AuthenticatedUser, persona_request, require_persona_user};
pub use router::{persona_router, with_persona};
