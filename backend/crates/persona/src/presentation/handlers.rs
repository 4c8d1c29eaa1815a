//! HTTP Handlers

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Extension, FromRef, FromRequest, Multipart, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use std::sync::Arc;

use crate::application::csrf::attach_csrf_token;
use crate::application::{
    FormData, FormEncoding, ForbiddenPageUseCase, LoginOutput, LoginUseCase, LogoutUseCase,
    PersonaAssets, PersonaConfig, ViewRequest,
};
use crate::domain::security::SecurityProvider;
use crate::domain::session::SessionHandle;
use crate::domain::verifier::Verifier;
use crate::error::PersonaResult;
use crate::presentation::dto::{LoginResponse, LogoutResponse};

/// Shared state for persona handlers
pub struct PersonaAppState<V, P>
where
    V: Verifier + Send + Sync + 'static,
    P: SecurityProvider + 'static,
{
    pub verifier: Arc<V>,
    pub provider: Arc<P>,
    pub config: Arc<PersonaConfig>,
}

impl<V, P> PersonaAppState<V, P>
where
    V: Verifier + Send + Sync + 'static,
    P: SecurityProvider + 'static,
{
    pub fn new(verifier: V, provider: P, config: PersonaConfig) -> Self {
        Self {
            verifier: Arc::new(verifier),
            provider: Arc::new(provider),
            config: Arc::new(config),
        }
    }
}

// Derive would require V: Clone and P: Clone
impl<V, P> Clone for PersonaAppState<V, P>
where
    V: Verifier + Send + Sync + 'static,
    P: SecurityProvider + 'static,
{
    fn clone(&self) -> Self {
        Self {
            verifier: self.verifier.clone(),
            provider: self.provider.clone(),
            config: self.config.clone(),
        }
    }
}

impl<V, P> FromRef<PersonaAppState<V, P>> for Arc<PersonaConfig>
where
    V: Verifier + Send + Sync + 'static,
    P: SecurityProvider + 'static,
{
    fn from_ref(state: &PersonaAppState<V, P>) -> Self {
        state.config.clone()
    }
}

/// Headers collected by the view go on the response whether it succeeded or not
fn respond<T: IntoResponse>(headers: HeaderMap, result: PersonaResult<T>) -> Response {
    (headers, result).into_response()
}

/// Decode the form fields of `req`, urlencoded or multipart
///
/// File parts are skipped. A repeated field keeps its last value.
async fn read_form(encoding: FormEncoding, req: Request) -> Result<FormData, Response> {
    match encoding {
        FormEncoding::UrlEncoded => {
            let body = Bytes::from_request(req, &())
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(FormData::parse(&body))
        }
        FormEncoding::Multipart => {
            let mut multipart = Multipart::from_request(req, &())
                .await
                .map_err(IntoResponse::into_response)?;

            let mut fields = Vec::new();
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(IntoResponse::into_response)?
            {
                if field.file_name().is_some() {
                    continue;
                }
                let Some(name) = field.name().map(str::to_owned) else {
                    continue;
                };
                let value = field.text().await.map_err(IntoResponse::into_response)?;
                fields.push((name, value));
            }
            Ok(fields.into_iter().collect())
        }
        FormEncoding::None | FormEncoding::Other => Ok(FormData::default()),
    }
}

/// Build the view request, or the response for a body that could not be read
///
/// A rejected body still gets the CSRF token header.
async fn view_request(session: SessionHandle, req: Request) -> Result<ViewRequest, Response> {
    let method = req.method().clone();
    let headers = req.headers().clone();
    let encoding = FormEncoding::of(&method, &headers);

    match read_form(encoding, req).await {
        Ok(form) => Ok(ViewRequest::new(method, headers, form, session)),
        Err(rejection) => {
            let mut request = ViewRequest::new(method, headers, FormData::default(), session);
            attach_csrf_token(&mut request);
            Err((request.response_headers, rejection).into_response())
        }
    }
}

// ============================================================================
// Login
// ============================================================================

/// GET|POST /login
pub async fn login<V, P>(
    State(state): State<PersonaAppState<V, P>>,
    Extension(session): Extension<SessionHandle>,
    req: Request,
) -> Response
where
    V: Verifier + Send + Sync + 'static,
    P: SecurityProvider + 'static,
{
    let mut request = match view_request(session, req).await {
        Ok(request) => request,
        Err(response) => return response,
    };

    let use_case = LoginUseCase::new(
        state.verifier.clone(),
        state.provider.clone(),
        state.config.clone(),
    );

    let result = use_case.execute(&mut request).await.map(|output| match output {
        LoginOutput::Form => Json(LoginResponse::form()),
        LoginOutput::LoggedIn { redirect, .. } => Json(LoginResponse::logged_in(redirect)),
    });

    respond(request.response_headers, result)
}

// ============================================================================
// Logout
// ============================================================================

/// ANY /logout
pub async fn logout<V, P>(
    State(state): State<PersonaAppState<V, P>>,
    Extension(session): Extension<SessionHandle>,
    req: Request,
) -> Response
where
    V: Verifier + Send + Sync + 'static,
    P: SecurityProvider + 'static,
{
    let mut request = match view_request(session, req).await {
        Ok(request) => request,
        Err(response) => return response,
    };

    let use_case = LogoutUseCase::new(state.provider.clone(), state.config.clone());

    let result = use_case
        .execute(&mut request)
        .map(|output| Json(LogoutResponse {
            redirect: output.redirect,
        }));

    respond(request.response_headers, result)
}

// ============================================================================
// Forbidden
// ============================================================================

/// 403 page with a Persona sign-in button
pub async fn forbidden(
    State(config): State<Arc<PersonaConfig>>,
    Extension(assets): Extension<PersonaAssets>,
) -> Response {
    forbidden_page(config, &assets).await
}

/// Render the forbidden page for `assets`
pub async fn forbidden_page(config: Arc<PersonaConfig>, assets: &PersonaAssets) -> Response {
    match ForbiddenPageUseCase::new(config).execute(assets).await {
        Ok(html) => (StatusCode::FORBIDDEN, Html(html)).into_response(),
        Err(e) => e.into_response(),
    }
}
