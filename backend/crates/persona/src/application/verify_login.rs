//! Verify Login Use Case
//!
//! Turns the submitted assertion into an identity claim.

use std::sync::Arc;

use crate::application::context::FormData;
use crate::domain::assertion::{Assertion, IdentityClaim};
use crate::domain::verifier::Verifier;
use crate::error::{PersonaError, PersonaResult};

/// Form field holding the assertion
pub const ASSERTION_FIELD: &str = "assertion";

/// Verify login use case
pub struct VerifyLoginUseCase<V>
where
    V: Verifier,
{
    verifier: Arc<V>,
}

impl<V> VerifyLoginUseCase<V>
where
    V: Verifier,
{
    pub fn new(verifier: Arc<V>) -> Self {
        Self { verifier }
    }

    /// Verify the assertion in `form`
    ///
    /// Rejections become [`PersonaError::InvalidAssertion`] and are logged at
    /// info: expired or replayed assertions are ordinary client behaviour.
    /// Any other verifier failure is passed up untouched.
    pub async fn execute(&self, form: &FormData) -> PersonaResult<IdentityClaim> {
        let assertion = form
            .get(ASSERTION_FIELD)
            .map(Assertion::new)
            .ok_or(PersonaError::MissingField(ASSERTION_FIELD))?;

        match self.verifier.verify(&assertion).await {
            Ok(claim) => Ok(claim),
            Err(e) if e.is_rejection() => {
                tracing::info!(error = %e, kind = e.kind_name(), "Failed persona login");
                Err(PersonaError::InvalidAssertion)
            }
            Err(e) => Err(PersonaError::Verifier(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{FakeVerifier, capture_logs};
    use crate::domain::verifier::VerifyError;

    fn form(assertion: &str) -> FormData {
        [(ASSERTION_FIELD, assertion)].into_iter().collect()
    }

    #[tokio::test]
    async fn test_valid_assertion() {
        let use_case = VerifyLoginUseCase::new(Arc::new(FakeVerifier::default()));
        let claim = use_case.execute(&form("valid:alice@example.com")).await.unwrap();
        assert_eq!(claim.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_trust_failure_is_invalid_assertion() {
        let (logs, _guard) = capture_logs();
        let use_case = VerifyLoginUseCase::new(Arc::new(FakeVerifier::default()));

        let err = use_case.execute(&form("expired")).await.unwrap_err();
        assert!(matches!(err, PersonaError::InvalidAssertion));

        let events = logs.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, tracing::Level::INFO);
        assert!(events[0].fields.contains("TrustError"));
        assert!(events[0].fields.contains("assertion has expired"));
    }

    #[tokio::test]
    async fn test_value_failure_is_invalid_assertion() {
        let (logs, _guard) = capture_logs();
        let use_case = VerifyLoginUseCase::new(Arc::new(FakeVerifier::default()));

        let err = use_case.execute(&form("garbage")).await.unwrap_err();
        assert!(matches!(err, PersonaError::InvalidAssertion));
        assert!(logs.events().iter().all(|e| e.level == tracing::Level::INFO));
        assert!(logs.events()[0].fields.contains("ValueError"));
    }

    #[tokio::test]
    async fn test_connection_failure_propagates() {
        let (logs, _guard) = capture_logs();
        let use_case = VerifyLoginUseCase::new(Arc::new(FakeVerifier::default()));

        let err = use_case.execute(&form("down")).await.unwrap_err();
        assert!(matches!(err, PersonaError::Verifier(VerifyError::Connection(_))));
        assert!(logs.events().is_empty());
    }

    #[tokio::test]
    async fn test_missing_assertion() {
        let verifier = Arc::new(FakeVerifier::default());
        let use_case = VerifyLoginUseCase::new(verifier.clone());

        let err = use_case.execute(&FormData::default()).await.unwrap_err();
        assert!(matches!(err, PersonaError::MissingField("assertion")));
        assert!(err.status_code().is_server_error());
        assert_eq!(verifier.calls(), 0);
    }
}
