//! Persona Request Assets
//!
//! The script and button markup pages embed to offer Persona sign-in.

use serde::Serialize;

use crate::application::config::PersonaConfig;
use crate::domain::session::CsrfToken;

/// Persona shim served by Mozilla
pub const INCLUDE_JS_URL: &str = "https://login.persona.org/include.js";

/// Default sign-in button; the script binds to `#signin`
pub const DEFAULT_BUTTON: &str = r#"<img src="https://login.persona.org/i/persona_sign_in_blue.png" id="signin" alt="sign-in button" />"#;

const WATCH_SCRIPT: &str = r#"<script type="text/javascript">
(function () {
  var csrfToken = __CSRF_TOKEN__;
  function post(url, data) {
    var xhr = new XMLHttpRequest();
    xhr.open("POST", url, true);
    xhr.setRequestHeader("Content-Type", "application/x-www-form-urlencoded");
    xhr.setRequestHeader("X-Csrf-Token", csrfToken);
    xhr.onload = function () {
      if (xhr.status === 200) {
        window.location = JSON.parse(xhr.responseText).redirect;
      } else {
        navigator.id.logout();
        alert("Login failure: " + xhr.status);
      }
    };
    data.csrf_token = csrfToken;
    data.came_from = window.location.href;
    xhr.send(Object.keys(data).map(function (key) {
      return encodeURIComponent(key) + "=" + encodeURIComponent(data[key]);
    }).join("&"));
  }
  navigator.id.watch({
    loggedInUser: __LOGGED_IN_USER__,
    onlogin: function (assertion) { post(__LOGIN_URL__, {assertion: assertion}); },
    onlogout: function () { post(__LOGOUT_URL__, {}); }
  });
  var signin = document.getElementById("signin");
  if (signin) {
    signin.onclick = function () { navigator.id.request(__REQUEST_ARGS__); return false; };
  }
  var signout = document.getElementById("signout");
  if (signout) {
    signout.onclick = function () { navigator.id.logout(); return false; };
  }
})();
</script>"#;

/// Values pages need to embed Persona
///
/// Built per request by the persona middleware and stored in the request
/// extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaAssets {
    /// `<script>` tags loading and wiring the Persona shim
    pub js: String,
    /// Sign-in button markup
    pub button: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestArgs<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    site_name: Option<&'a str>,
}

impl PersonaAssets {
    pub fn new(js: impl Into<String>, button: impl Into<String>) -> Self {
        Self {
            js: js.into(),
            button: button.into(),
        }
    }

    /// Assets for a visitor logged in as `logged_in_user`, if any
    pub fn build(config: &PersonaConfig, logged_in_user: Option<&str>, csrf_token: &CsrfToken) -> Self {
        let request_args = RequestArgs {
            site_name: config.site_name.as_deref(),
        };

        let watch = WATCH_SCRIPT
            .replace("__CSRF_TOKEN__", &js_literal(&csrf_token.as_str()))
            .replace("__LOGGED_IN_USER__", &js_literal(&logged_in_user))
            .replace("__LOGIN_URL__", &js_literal(&config.login_path))
            .replace("__LOGOUT_URL__", &js_literal(&config.logout_path))
            .replace("__REQUEST_ARGS__", &js_literal(&request_args));

        let js = format!(
            "<script src=\"{}\" type=\"text/javascript\"></script>\n{}",
            INCLUDE_JS_URL, watch
        );

        Self::new(js, DEFAULT_BUTTON)
    }
}

/// JSON is valid JavaScript; `</` is escaped so values cannot close the script tag
fn js_literal<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> CsrfToken {
        CsrfToken::parse("tok_123").unwrap()
    }

    #[test]
    fn test_anonymous_visitor() {
        let assets = PersonaAssets::build(&PersonaConfig::default(), None, &token());
        assert!(assets.js.contains(INCLUDE_JS_URL));
        assert!(assets.js.contains("loggedInUser: null"));
        assert!(assets.js.contains(r#"var csrfToken = "tok_123";"#));
        assert!(assets.js.contains(r#"post("/login""#));
        assert!(assets.js.contains(r#"post("/logout""#));
        assert!(assets.js.contains("navigator.id.request({})"));
        assert_eq!(assets.button, DEFAULT_BUTTON);
    }

    #[test]
    fn test_logged_in_visitor_and_site_name() {
        let config = PersonaConfig {
            site_name: Some("Example".to_string()),
            ..PersonaConfig::default()
        };
        let assets = PersonaAssets::build(&config, Some("alice@example.com"), &token());
        assert!(assets.js.contains(r#"loggedInUser: "alice@example.com""#));
        assert!(assets.js.contains(r#"navigator.id.request({"siteName":"Example"})"#));
    }

    #[test]
    fn test_values_cannot_break_out_of_script() {
        let config = PersonaConfig {
            site_name: Some("</script><script>alert(1)</script>".to_string()),
            ..PersonaConfig::default()
        };
        let assets = PersonaAssets::build(&config, None, &token());
        assert_eq!(assets.js.matches("</script>").count(), 2);
    }
}
