//! Assertion and Identity Claim

use std::fmt;

use serde::Deserialize;

/// Signed identity assertion submitted by the browser
///
/// Opaque to this crate; only the verifier looks inside it.
#[derive(Clone, PartialEq, Eq)]
pub struct Assertion(String);

impl Assertion {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

// Assertions are bearer credentials until they expire
impl fmt::Debug for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Assertion(<{} bytes>)", self.0.len())
    }
}

/// Verified outcome of an assertion check
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentityClaim {
    /// Verified subject
    pub email: String,
    /// Relying party the assertion was issued for
    #[serde(default)]
    pub audience: Option<String>,
    /// Identity provider that vouched for the email
    #[serde(default)]
    pub issuer: Option<String>,
    /// Expiry in milliseconds since the epoch
    #[serde(default)]
    pub expires: Option<i64>,
}

impl IdentityClaim {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            audience: None,
            issuer: None,
            expires: None,
        }
    }
}
