//! Domain Layer
//!
//! Assertions, identity claims, sessions, and the collaborator traits the
//! application layer is written against.

pub mod assertion;
pub mod security;
pub mod session;
pub mod verifier;

// Re-exports
pub use assertion::{Assertion, IdentityClaim};
pub use security::SecurityProvider;
pub use session::{CsrfToken, Session, SessionHandle};
pub use verifier::{LocalVerifier, Verifier, VerifyError};
