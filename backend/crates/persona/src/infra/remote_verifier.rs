//! Remote Verifier
//!
//! Checks assertions by POSTing them to a BrowserID verification service.
//! The audience is read from the assertion and checked against the
//! configured origins before the network is touched.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::application::config::PersonaConfig;
use crate::domain::assertion::{Assertion, IdentityClaim};
use crate::domain::verifier::{Verifier, VerifyError};

const USER_AGENT: &str = concat!("persona/", env!("CARGO_PKG_VERSION"));

/// Verifier backed by a remote verification service
#[derive(Debug, Clone)]
pub struct RemoteVerifier {
    client: Client,
    url: String,
    audiences: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct VerifierStatus {
    status: String,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssertionPayload {
    #[serde(default)]
    aud: Option<String>,
}

impl RemoteVerifier {
    pub fn new(
        url: impl Into<String>,
        audiences: Vec<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            audiences,
        })
    }

    pub fn from_config(config: &PersonaConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config.verifier_url.clone(),
            config.audiences.clone(),
            config.verifier_timeout,
        )
    }

    fn check_audience(&self, audience: &str) -> Result<(), VerifyError> {
        if self
            .audiences
            .iter()
            .any(|pattern| audience_matches(pattern, audience))
        {
            Ok(())
        } else {
            Err(VerifyError::Trust(format!(
                "audience mismatch: {audience} is not an accepted audience"
            )))
        }
    }

    async fn post(&self, assertion: &Assertion, audience: &str) -> Result<Value, VerifyError> {
        let response = self
            .client
            .post(&self.url)
            .form(&[("assertion", assertion.as_str()), ("audience", audience)])
            .send()
            .await
            .map_err(|e| VerifyError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerifyError::Connection(format!(
                "verifier answered with status {status}"
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| VerifyError::Protocol(format!("response is not JSON: {e}")))
    }
}

impl Verifier for RemoteVerifier {
    async fn verify(&self, assertion: &Assertion) -> Result<IdentityClaim, VerifyError> {
        if assertion.is_empty() {
            return Err(VerifyError::Value("empty assertion".to_string()));
        }

        let audience = extract_audience(assertion.as_str())?;
        self.check_audience(&audience)?;

        let body = self.post(assertion, &audience).await?;

        let outcome: VerifierStatus = serde_json::from_value(body.clone())
            .map_err(|e| VerifyError::Protocol(format!("missing status: {e}")))?;
        if outcome.status != "okay" {
            let reason = outcome
                .reason
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(VerifyError::Trust(reason));
        }

        let claim: IdentityClaim = serde_json::from_value(body)
            .map_err(|e| VerifyError::Protocol(format!("malformed identity: {e}")))?;

        if let Some(verified_for) = claim.audience.as_deref() {
            if verified_for != audience {
                return Err(VerifyError::Trust(format!(
                    "verifier answered for audience {verified_for}, expected {audience}"
                )));
            }
        }

        tracing::debug!(email = %claim.email, audience = %audience, "Assertion verified");
        Ok(claim)
    }
}

/// Audience named inside a backed assertion
///
/// A backed assertion is `certificate~...~assertion`; the last segment is a
/// JWT whose payload carries `aud`.
pub fn extract_audience(raw: &str) -> Result<String, VerifyError> {
    let malformed = || VerifyError::Value("malformed assertion".to_string());

    let jwt = raw.rsplit('~').next().ok_or_else(malformed)?;
    let mut segments = jwt.split('.');
    let (Some(_header), Some(payload)) = (segments.next(), segments.next()) else {
        return Err(malformed());
    };

    let decoded =
        platform::crypto::from_base64url(payload.trim_end_matches('=')).map_err(|_| malformed())?;
    let payload: AssertionPayload = serde_json::from_slice(&decoded).map_err(|_| malformed())?;

    payload
        .aud
        .filter(|aud| !aud.is_empty())
        .ok_or_else(|| VerifyError::Value("assertion names no audience".to_string()))
}

/// Match an audience against a pattern where `*` stands for any run of characters
pub fn audience_matches(pattern: &str, audience: &str) -> bool {
    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or_default();
    let Some(mut rest) = audience.strip_prefix(first) else {
        return false;
    };

    let parts: Vec<&str> = parts.collect();
    let Some((last, middle)) = parts.split_last() else {
        return rest.is_empty();
    };

    for part in middle {
        match rest.find(part) {
            Some(index) => rest = &rest[index + part.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}
