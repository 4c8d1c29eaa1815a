//! API DTOs (Data Transfer Objects)

use serde::Serialize;

// ============================================================================
// Login
// ============================================================================

/// Login response
///
/// Empty object when the login form is requested, `redirect` and `success`
/// once an assertion was accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoginResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl LoginResponse {
    pub fn form() -> Self {
        Self::default()
    }

    pub fn logged_in(redirect: impl Into<String>) -> Self {
        Self {
            redirect: Some(redirect.into()),
            success: Some(true),
        }
    }
}

// ============================================================================
// Logout
// ============================================================================

/// Logout response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoutResponse {
    pub redirect: String,
}
