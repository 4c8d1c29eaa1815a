//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" shared by every crate in the workspace:
//! - The unified application error type and its result alias
//! - The error classification that maps onto HTTP status codes
//! - Conversions from common library errors
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
