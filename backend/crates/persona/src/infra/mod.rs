//! Infrastructure Layer
//!
//! Remote verifier client and the signed-cookie security provider.

pub mod auth_ticket;
pub mod cookie_security;
pub mod cookie_session;
pub mod remote_verifier;

pub use auth_ticket::AuthTicket;
pub use cookie_security::CookieSecurityProvider;
pub use cookie_session::CookieSessionStore;
pub use remote_verifier::RemoteVerifier;
