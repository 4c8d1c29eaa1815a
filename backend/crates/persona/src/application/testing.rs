//! In-memory collaborators for unit tests

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::http::{HeaderMap, HeaderValue, header};
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

use crate::domain::assertion::{Assertion, IdentityClaim};
use crate::domain::security::SecurityProvider;
use crate::domain::session::{CsrfToken, Session};
use crate::domain::verifier::{Verifier, VerifyError};
use crate::error::PersonaResult;

/// Verifier keyed on the assertion text
///
/// `valid:<email>` succeeds, `expired` is a trust failure, `garbage` a value
/// failure, `down` a connection failure.
#[derive(Default)]
pub struct FakeVerifier {
    calls: AtomicUsize,
}

impl FakeVerifier {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Verifier for FakeVerifier {
    async fn verify(&self, assertion: &Assertion) -> Result<IdentityClaim, VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match assertion.as_str() {
            raw if raw.starts_with("valid:") => Ok(IdentityClaim::new(&raw["valid:".len()..])),
            "expired" => Err(VerifyError::Trust("assertion has expired".to_string())),
            "down" => Err(VerifyError::Connection("connection refused".to_string())),
            _ => Err(VerifyError::Value("malformed assertion".to_string())),
        }
    }
}

/// Provider writing plain, unsigned cookies
#[derive(Default)]
pub struct FakeProvider;

impl SecurityProvider for FakeProvider {
    fn load_session(&self, request: &HeaderMap) -> Session {
        let token = platform::cookie::extract_cookie(request, "session")
            .and_then(|raw| CsrfToken::parse(&raw));
        match token {
            Some(token) => Session::restore(Some(token)),
            None => Session::new(),
        }
    }

    fn save_session(&self, session: &Session) -> PersonaResult<Option<HeaderValue>> {
        match session.peek_csrf_token() {
            Some(token) if session.is_changed() => {
                Ok(Some(HeaderValue::from_str(&format!("session={token}"))?))
            }
            _ => Ok(None),
        }
    }

    fn remember(&self, _request: &HeaderMap, userid: &str) -> PersonaResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.append(
            header::SET_COOKIE,
            HeaderValue::from_str(&format!("auth={userid}"))?,
        );
        Ok(headers)
    }

    fn forget(&self, _request: &HeaderMap) -> PersonaResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.append(header::SET_COOKIE, HeaderValue::from_static("auth=; Max-Age=0"));
        Ok(headers)
    }

    fn authenticated_userid(&self, request: &HeaderMap) -> Option<String> {
        platform::cookie::extract_cookie(request, "auth").filter(|userid| !userid.is_empty())
    }
}

/// One captured log event
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: tracing::Level,
    pub fields: String,
}

/// Events recorded on the current thread
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<LogEvent>>>);

impl CapturedLogs {
    pub fn events(&self) -> Vec<LogEvent> {
        self.0.lock().unwrap().clone()
    }
}

impl<S: tracing::Subscriber> Layer<S> for CapturedLogs {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldCollector(String::new());
        event.record(&mut visitor);
        self.0.lock().unwrap().push(LogEvent {
            level: *event.metadata().level(),
            fields: visitor.0,
        });
    }
}

struct FieldCollector(String);

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.push_str(&format!("{}={:?} ", field.name(), value));
    }
}

/// Capture log events on this thread until the guard drops
pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::registry().with(logs.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}
