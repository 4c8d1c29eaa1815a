//! Verifier Trait
//!
//! Interface to the service that checks assertions. Implementation is in
//! the infrastructure layer.

use thiserror::Error;

use crate::domain::assertion::{Assertion, IdentityClaim};

/// Verifier failure taxonomy
///
/// `Value` and `Trust` are rejections of the assertion itself. The other
/// kinds mean the verifier could not give an answer.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The assertion is malformed
    #[error("{0}")]
    Value(String),

    /// The assertion is well formed but not trusted (signature, audience, expiry)
    #[error("{0}")]
    Trust(String),

    /// The verifier service could not be reached
    #[error("verifier connection failed: {0}")]
    Connection(String),

    /// The verifier service answered with something unexpected
    #[error("verifier protocol error: {0}")]
    Protocol(String),
}

impl VerifyError {
    /// Short name of the failure kind, used in logs
    pub fn kind_name(&self) -> &'static str {
        match self {
            VerifyError::Value(_) => "ValueError",
            VerifyError::Trust(_) => "TrustError",
            VerifyError::Connection(_) => "ConnectionError",
            VerifyError::Protocol(_) => "ProtocolError",
        }
    }

    /// Whether the assertion was rejected, as opposed to the verifier failing
    pub fn is_rejection(&self) -> bool {
        matches!(self, VerifyError::Value(_) | VerifyError::Trust(_))
    }
}

/// Assertion verifier
#[trait_variant::make(Verifier: Send)]
pub trait LocalVerifier {
    /// Check `assertion` and return the identity it proves
    async fn verify(&self, assertion: &Assertion) -> Result<IdentityClaim, VerifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections() {
        assert!(VerifyError::Value("bad".into()).is_rejection());
        assert!(VerifyError::Trust("expired".into()).is_rejection());
        assert!(!VerifyError::Connection("refused".into()).is_rejection());
        assert!(!VerifyError::Protocol("html".into()).is_rejection());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(VerifyError::Trust("x".into()).kind_name(), "TrustError");
        assert_eq!(VerifyError::Value("x".into()).kind_name(), "ValueError");
    }
}
