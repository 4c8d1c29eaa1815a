//! Application Layer
//!
//! Use cases and application services.

pub mod assets;
pub mod config;
pub mod context;
pub mod csrf;
pub mod forbidden;
pub mod login;
pub mod logout;
pub mod verify_login;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use assets::PersonaAssets;
pub use config::PersonaConfig;
pub use context::{DEFAULT_REDIRECT, FormData, FormEncoding, ViewRequest};
pub use csrf::{CSRF_FIELD, CSRF_HEADER, attach_csrf_token, check_csrf_token};
pub use forbidden::ForbiddenPageUseCase;
pub use login::{LoginOutput, LoginUseCase};
pub use logout::{LogoutOutput, LogoutUseCase};
pub use verify_login::VerifyLoginUseCase;
