//! Cookie Management Infrastructure
//!
//! Set-Cookie building and Cookie header parsing shared by the session store
//! and the identity ticket.

use axum::http::header::InvalidHeaderValue;
use axum::http::{HeaderMap, HeaderValue, header};

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Cookie configuration
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub path: String,
    pub max_age_secs: Option<i64>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "session".to_string(),
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            path: "/".to_string(),
            max_age_secs: None,
        }
    }
}

impl CookieConfig {
    /// Cookie config with the given name and default attributes
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Build Set-Cookie header value
    pub fn build_set_cookie(&self, value: &str) -> String {
        let mut cookie = format!("{}={}", self.name, value);

        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", self.same_site.as_str()));
        cookie.push_str(&format!("; Path={}", self.path));

        if let Some(max_age) = self.max_age_secs {
            cookie.push_str(&format!("; Max-Age={}", max_age));
        }

        cookie
    }

    /// Build Set-Cookie header for deletion (expired)
    pub fn build_delete_cookie(&self) -> String {
        let mut cookie = format!(
            "{}=; Path={}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            self.name, self.path
        );
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", self.same_site.as_str()));
        cookie
    }

    /// Set-Cookie header value carrying `value`
    pub fn set_cookie_header(&self, value: &str) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&self.build_set_cookie(value))
    }

    /// Set-Cookie header value expiring the cookie
    pub fn delete_cookie_header(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&self.build_delete_cookie())
    }
}

/// Extract a cookie value from headers
///
/// Every `Cookie` header is searched; the first pair named `name` wins.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;

            if key == name {
                Some(value.to_string())
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_config_build() {
        let config = CookieConfig {
            name: "test".to_string(),
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            path: "/api".to_string(),
            max_age_secs: Some(3600),
        };

        let cookie = config.build_set_cookie("value123");
        assert!(cookie.starts_with("test=value123"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/api"));
        assert!(cookie.contains("Max-Age=3600"));
    }

    #[test]
    fn test_insecure_cookie_omits_secure() {
        let config = CookieConfig {
            secure: false,
            same_site: SameSite::Strict,
            ..CookieConfig::named("persona_session")
        };

        let cookie = config.build_set_cookie("abc");
        assert!(!cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(!cookie.contains("Max-Age"));
    }

    #[test]
    fn test_delete_cookie() {
        let config = CookieConfig::named("persona_auth");
        let cookie = config.build_delete_cookie();
        assert!(cookie.starts_with("persona_auth=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
        assert!(cookie.contains("Path=/"));
    }

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; session=abc123; other=xyz"),
        );

        assert_eq!(
            extract_cookie(&headers, "session"),
            Some("abc123".to_string())
        );
        assert_eq!(extract_cookie(&headers, "foo"), Some("bar".to_string()));
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_extract_cookie_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("foo=bar"));
        headers.append(header::COOKIE, HeaderValue::from_static("persona_auth=t.s"));

        assert_eq!(
            extract_cookie(&headers, "persona_auth"),
            Some("t.s".to_string())
        );
    }
}
