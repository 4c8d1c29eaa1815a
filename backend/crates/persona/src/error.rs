//! Persona Error Types
//!
//! This module provides persona-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::http::header::InvalidHeaderValue;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::verifier::VerifyError;

/// Persona-specific result type alias
pub type PersonaResult<T> = Result<T, PersonaError>;

/// Persona-specific error variants
///
/// Only the client-caused variants are recovered into deliberate 4xx
/// responses. Everything else is a fault and surfaces as a 500.
#[derive(Debug, Error)]
pub enum PersonaError {
    /// The verifier rejected the assertion (malformed or untrusted)
    #[error("Invalid assertion")]
    InvalidAssertion,

    /// A required form field was not submitted; a broken client, not a login failure
    #[error("Missing form field: {0}")]
    MissingField(&'static str),

    /// CSRF token missing or not matching the session
    #[error("Invalid CSRF token")]
    InvalidCsrfToken,

    /// Verifier failed in a way that is not a rejection
    #[error("Unexpected verifier failure: {0}")]
    Verifier(#[source] VerifyError),

    /// Forbidden template could not be read
    #[error("Failed to load template {}: {source}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A header produced by the security provider was not valid
    #[error("Invalid header value: {0}")]
    Header(#[from] InvalidHeaderValue),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PersonaError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            PersonaError::InvalidAssertion | PersonaError::InvalidCsrfToken => {
                StatusCode::BAD_REQUEST
            }
            PersonaError::MissingField(_)
            | PersonaError::Verifier(_)
            | PersonaError::Template { .. }
            | PersonaError::Header(_)
            | PersonaError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PersonaError::InvalidAssertion | PersonaError::InvalidCsrfToken => {
                ErrorKind::BadRequest
            }
            PersonaError::MissingField(_)
            | PersonaError::Verifier(_)
            | PersonaError::Template { .. }
            | PersonaError::Header(_)
            | PersonaError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Server-side details stay in the logs; clients only see the reason phrase.
    pub fn to_app_error(&self) -> AppError {
        let kind = self.kind();
        if kind.is_server_error() {
            AppError::new(kind, kind.as_str())
        } else {
            AppError::new(kind, self.to_string())
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            PersonaError::MissingField(field) => {
                tracing::error!(field = *field, "Required form field missing");
            }
            PersonaError::Verifier(e) => {
                tracing::error!(error = %e, kind = e.kind_name(), "Unexpected verifier failure");
            }
            PersonaError::Template { path, source } => {
                tracing::error!(path = %path.display(), error = %source, "Forbidden template unavailable");
            }
            PersonaError::Header(e) => {
                tracing::error!(error = %e, "Security provider produced an invalid header");
            }
            PersonaError::Internal(msg) => {
                tracing::error!(message = %msg, "Persona internal error");
            }
            PersonaError::InvalidCsrfToken => {
                tracing::warn!("Request with invalid CSRF token");
            }
            // Already logged at info where the assertion was rejected
            PersonaError::InvalidAssertion => {}
        }
    }
}

impl IntoResponse for PersonaError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for PersonaError {
    fn from(err: AppError) -> Self {
        PersonaError::Internal(err.to_string())
    }
}

/// Configuration errors raised while building [`crate::PersonaConfig`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting is absent
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A setting could not be parsed
    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}
