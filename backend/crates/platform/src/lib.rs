//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (random tokens, Base64url, HMAC-SHA256 signed tokens)
//! - Cookie management (Set-Cookie building, Cookie header parsing)

pub mod cookie;
pub mod crypto;
