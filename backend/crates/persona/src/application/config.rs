//! Application Configuration
//!
//! Configuration for the Persona application layer.

use std::path::PathBuf;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose;
use platform::cookie::CookieConfig;

use crate::error::ConfigError;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Mozilla's hosted verifier
pub const DEFAULT_VERIFIER_URL: &str = "https://verifier.login.persona.org/verify";

/// Persona application configuration
#[derive(Debug, Clone)]
pub struct PersonaConfig {
    /// Origins assertions may be issued for (`https://example.com:443`), `*` for any
    pub audiences: Vec<String>,
    /// Remote verification endpoint
    pub verifier_url: String,
    /// Timeout for one verification call
    pub verifier_timeout: Duration,
    /// Key for signing the session and identity cookies (32 bytes)
    pub secret: [u8; 32],
    /// Route of the login view
    pub login_path: String,
    /// Route of the logout view
    pub logout_path: String,
    /// Site name shown in the Persona dialog
    pub site_name: Option<String>,
    /// Require POSTs to login/logout to echo the CSRF token
    pub require_csrf: bool,
    /// Forbidden page template on disk (the bundled one when `None`)
    pub forbidden_template: Option<PathBuf>,
    /// Session cookie name
    pub session_cookie_name: String,
    /// Identity cookie name
    pub auth_cookie_name: String,
    /// Identity cookie lifetime; browser-session cookie when `None`
    pub auth_max_age: Option<Duration>,
    /// Whether to require Secure cookies
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            audiences: Vec::new(),
            verifier_url: DEFAULT_VERIFIER_URL.to_string(),
            verifier_timeout: Duration::from_secs(10),
            secret: [0u8; 32],
            login_path: "/login".to_string(),
            logout_path: "/logout".to_string(),
            site_name: None,
            require_csrf: false,
            forbidden_template: None,
            session_cookie_name: "persona_session".to_string(),
            auth_cookie_name: "persona_auth".to_string(),
            auth_max_age: None,
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
        }
    }
}

impl PersonaConfig {
    /// Create config with a random signing secret
    pub fn with_random_secret() -> Self {
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&platform::crypto::random_bytes(32));
        Self {
            secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookies, random secret)
    pub fn development(audience: impl Into<String>) -> Self {
        Self {
            audiences: vec![audience.into()],
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Load from `PERSONA_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source
    ///
    /// `PERSONA_AUDIENCES` is required. Without `PERSONA_SECRET` a random
    /// secret is generated, which logs everyone out on restart.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let audiences: Vec<String> = lookup("PERSONA_AUDIENCES")
            .ok_or(ConfigError::Missing("PERSONA_AUDIENCES"))?
            .split(',')
            .map(str::trim)
            .filter(|audience| !audience.is_empty())
            .map(String::from)
            .collect();
        if audiences.is_empty() {
            return Err(ConfigError::Missing("PERSONA_AUDIENCES"));
        }

        let mut config = match lookup("PERSONA_SECRET") {
            Some(encoded) => Self {
                secret: decode_secret(&encoded)?,
                ..Self::default()
            },
            None => {
                tracing::warn!("PERSONA_SECRET not set, using a random signing secret");
                Self::with_random_secret()
            }
        };
        config.audiences = audiences;

        if let Some(url) = lookup("PERSONA_VERIFIER_URL") {
            config.verifier_url = url;
        }
        if let Some(secs) = lookup("PERSONA_VERIFIER_TIMEOUT_SECS") {
            config.verifier_timeout =
                Duration::from_secs(parse_secs("PERSONA_VERIFIER_TIMEOUT_SECS", &secs)?);
        }
        if let Some(path) = lookup("PERSONA_LOGIN_PATH") {
            config.login_path = route_path("PERSONA_LOGIN_PATH", path)?;
        }
        if let Some(path) = lookup("PERSONA_LOGOUT_PATH") {
            config.logout_path = route_path("PERSONA_LOGOUT_PATH", path)?;
        }
        config.site_name = lookup("PERSONA_SITE_NAME");
        if let Some(flag) = lookup("PERSONA_REQUIRE_CSRF") {
            config.require_csrf = parse_flag("PERSONA_REQUIRE_CSRF", &flag)?;
        }
        config.forbidden_template = lookup("PERSONA_FORBIDDEN_TEMPLATE").map(PathBuf::from);
        if let Some(secs) = lookup("PERSONA_AUTH_MAX_AGE_SECS") {
            config.auth_max_age = Some(Duration::from_secs(parse_secs(
                "PERSONA_AUTH_MAX_AGE_SECS",
                &secs,
            )?));
        }
        if let Some(flag) = lookup("PERSONA_COOKIE_SECURE") {
            config.cookie_secure = parse_flag("PERSONA_COOKIE_SECURE", &flag)?;
        }

        Ok(config)
    }

    /// Cookie attributes of the session cookie
    pub fn session_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: None,
        }
    }

    /// Cookie attributes of the identity cookie
    pub fn auth_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.auth_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: self.auth_max_age.map(|ttl| ttl.as_secs() as i64),
        }
    }
}

fn decode_secret(encoded: &str) -> Result<[u8; 32], ConfigError> {
    let bytes = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| ConfigError::Invalid {
            name: "PERSONA_SECRET",
            reason: e.to_string(),
        })?;
    bytes.try_into().map_err(|bytes: Vec<u8>| ConfigError::Invalid {
        name: "PERSONA_SECRET",
        reason: format!("expected 32 bytes, got {}", bytes.len()),
    })
}

fn parse_secs(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn route_path(name: &'static str, path: String) -> Result<String, ConfigError> {
    if path.starts_with('/') {
        Ok(path)
    } else {
        Err(ConfigError::Invalid {
            name,
            reason: format!("route {path:?} must start with '/'"),
        })
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            name,
            reason: format!("expected a boolean, got {other:?}"),
        }),
    }
}
