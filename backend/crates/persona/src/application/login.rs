//! Login Use Case
//!
//! Verifies a Persona assertion and remembers the verified email.

use std::sync::Arc;

use crate::application::config::PersonaConfig;
use crate::application::context::ViewRequest;
use crate::application::csrf::{attach_csrf_token, check_csrf_token};
use crate::application::verify_login::VerifyLoginUseCase;
use crate::domain::security::SecurityProvider;
use crate::domain::verifier::Verifier;
use crate::error::PersonaResult;

/// Login output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutput {
    /// Not a POST: render the login form
    Form,
    /// Assertion verified and identity remembered
    LoggedIn {
        /// Where the client should go next
        redirect: String,
        /// Verified email
        email: String,
    },
}

/// Login use case
pub struct LoginUseCase<V, P>
where
    V: Verifier,
    P: SecurityProvider,
{
    verifier: Arc<V>,
    provider: Arc<P>,
    config: Arc<PersonaConfig>,
}

impl<V, P> LoginUseCase<V, P>
where
    V: Verifier,
    P: SecurityProvider,
{
    pub fn new(verifier: Arc<V>, provider: Arc<P>, config: Arc<PersonaConfig>) -> Self {
        Self {
            verifier,
            provider,
            config,
        }
    }

    pub async fn execute(&self, request: &mut ViewRequest) -> PersonaResult<LoginOutput> {
        // Before anything that can fail, so error responses carry it too
        let csrf_token = attach_csrf_token(request);

        if !request.is_post() {
            return Ok(LoginOutput::Form);
        }

        if self.config.require_csrf {
            check_csrf_token(request, &csrf_token)?;
        }

        let claim = VerifyLoginUseCase::new(self.verifier.clone())
            .execute(&request.form)
            .await?;

        let headers = self.provider.remember(&request.headers, &claim.email)?;
        request.merge_response_headers(&headers);

        tracing::info!(
            email = %claim.email,
            issuer = claim.issuer.as_deref().unwrap_or("-"),
            "User logged in with persona"
        );

        Ok(LoginOutput::LoggedIn {
            redirect: request.form.came_from().to_string(),
            email: claim.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::context::FormData;
    use crate::application::csrf::{CSRF_FIELD, CSRF_HEADER};
    use crate::application::testing::{FakeProvider, FakeVerifier};
    use crate::domain::session::{Session, SessionHandle};
    use crate::error::PersonaError;
    use axum::http::{HeaderMap, Method, header};

    fn use_case(config: PersonaConfig) -> (LoginUseCase<FakeVerifier, FakeProvider>, Arc<FakeVerifier>) {
        let verifier = Arc::new(FakeVerifier::default());
        let use_case = LoginUseCase::new(
            verifier.clone(),
            Arc::new(FakeProvider),
            Arc::new(config),
        );
        (use_case, verifier)
    }

    fn request(method: Method, form: &[(&str, &str)]) -> ViewRequest {
        ViewRequest::new(
            method,
            HeaderMap::new(),
            form.iter().copied().collect::<FormData>(),
            SessionHandle::new(Session::new()),
        )
    }

    #[tokio::test]
    async fn test_post_valid_assertion() {
        let (use_case, _) = use_case(PersonaConfig::default());
        let mut request = request(
            Method::POST,
            &[("assertion", "valid:alice@example.com"), ("came_from", "/inbox")],
        );

        let output = use_case.execute(&mut request).await.unwrap();
        assert_eq!(
            output,
            LoginOutput::LoggedIn {
                redirect: "/inbox".to_string(),
                email: "alice@example.com".to_string(),
            }
        );
        assert!(request.response_headers.contains_key(&CSRF_HEADER));
        assert_eq!(
            request.response_headers[header::SET_COOKIE],
            "auth=alice@example.com"
        );
    }

    #[tokio::test]
    async fn test_post_without_came_from_redirects_to_root() {
        let (use_case, _) = use_case(PersonaConfig::default());
        let mut request = request(Method::POST, &[("assertion", "valid:bob@example.com")]);

        match use_case.execute(&mut request).await.unwrap() {
            LoginOutput::LoggedIn { redirect, .. } => assert_eq!(redirect, "/"),
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_renders_form_with_csrf() {
        let (use_case, verifier) = use_case(PersonaConfig::default());
        let mut request = request(Method::GET, &[]);

        let output = use_case.execute(&mut request).await.unwrap();
        assert_eq!(output, LoginOutput::Form);
        assert!(request.response_headers.contains_key(&CSRF_HEADER));
        assert!(!request.response_headers.contains_key(header::SET_COOKIE));
        assert_eq!(verifier.calls(), 0);
    }

    #[tokio::test]
    async fn test_rejected_assertion_keeps_csrf_header() {
        let (use_case, _) = use_case(PersonaConfig::default());
        let mut request = request(Method::POST, &[("assertion", "expired")]);

        let err = use_case.execute(&mut request).await.unwrap_err();
        assert!(matches!(err, PersonaError::InvalidAssertion));
        assert!(request.response_headers.contains_key(&CSRF_HEADER));
        assert!(!request.response_headers.contains_key(header::SET_COOKIE));
    }

    #[tokio::test]
    async fn test_required_csrf_blocks_before_verification() {
        let (use_case, verifier) = use_case(PersonaConfig {
            require_csrf: true,
            ..PersonaConfig::default()
        });
        let mut request = request(Method::POST, &[("assertion", "valid:alice@example.com")]);

        let err = use_case.execute(&mut request).await.unwrap_err();
        assert!(matches!(err, PersonaError::InvalidCsrfToken));
        assert_eq!(verifier.calls(), 0);
    }

    #[tokio::test]
    async fn test_required_csrf_accepts_echoed_token() {
        let (use_case, _) = use_case(PersonaConfig {
            require_csrf: true,
            ..PersonaConfig::default()
        });
        let session = SessionHandle::new(Session::new());
        let token = session.csrf_token();
        let form: FormData = [
            ("assertion", "valid:alice@example.com"),
            (CSRF_FIELD, token.as_str()),
        ]
        .into_iter()
        .collect();
        let mut request = ViewRequest::new(Method::POST, HeaderMap::new(), form, session);

        let output = use_case.execute(&mut request).await.unwrap();
        assert!(matches!(output, LoginOutput::LoggedIn { .. }));
    }
}
