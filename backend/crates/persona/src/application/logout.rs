//! Logout Use Case
//!
//! Forgets the authenticated identity.

use std::sync::Arc;

use crate::application::config::PersonaConfig;
use crate::application::context::ViewRequest;
use crate::application::csrf::{attach_csrf_token, check_csrf_token};
use crate::domain::security::SecurityProvider;
use crate::error::PersonaResult;

/// Logout output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutOutput {
    pub redirect: String,
}

/// Logout use case
pub struct LogoutUseCase<P>
where
    P: SecurityProvider,
{
    provider: Arc<P>,
    config: Arc<PersonaConfig>,
}

impl<P> LogoutUseCase<P>
where
    P: SecurityProvider,
{
    pub fn new(provider: Arc<P>, config: Arc<PersonaConfig>) -> Self {
        Self { provider, config }
    }

    /// Forget the identity, whatever the request method
    pub fn execute(&self, request: &mut ViewRequest) -> PersonaResult<LogoutOutput> {
        let csrf_token = attach_csrf_token(request);

        // Safe methods are exempt so plain links keep working
        if self.config.require_csrf && request.is_post() {
            check_csrf_token(request, &csrf_token)?;
        }

        let headers = self.provider.forget(&request.headers)?;
        request.merge_response_headers(&headers);

        tracing::info!("User logged out");

        Ok(LogoutOutput {
            redirect: request.form.came_from().to_string(),
        })
    }
}
