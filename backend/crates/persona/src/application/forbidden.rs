//! Forbidden Page Use Case
//!
//! Renders the 403 page offering a Persona sign-in button.

use std::borrow::Cow;
use std::sync::Arc;

use crate::application::assets::PersonaAssets;
use crate::application::config::PersonaConfig;
use crate::error::{PersonaError, PersonaResult};

/// Template shipped with the crate
pub const BUNDLED_TEMPLATE: &str = include_str!("../../templates/forbidden.html");

const JS_PLACEHOLDER: &str = "{{ js }}";
const BUTTON_PLACEHOLDER: &str = "{{ button }}";

/// Forbidden page use case
pub struct ForbiddenPageUseCase {
    config: Arc<PersonaConfig>,
}

impl ForbiddenPageUseCase {
    pub fn new(config: Arc<PersonaConfig>) -> Self {
        Self { config }
    }

    /// Render the page for a request carrying `assets`
    pub async fn execute(&self, assets: &PersonaAssets) -> PersonaResult<String> {
        let template = self.load_template().await?;
        Ok(render(&template, assets))
    }

    async fn load_template(&self) -> PersonaResult<Cow<'static, str>> {
        match &self.config.forbidden_template {
            None => Ok(Cow::Borrowed(BUNDLED_TEMPLATE)),
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .map(Cow::Owned)
                .map_err(|source| PersonaError::Template {
                    path: path.clone(),
                    source,
                }),
        }
    }
}

/// Substitute the script and button placeholders
pub fn render(template: &str, assets: &PersonaAssets) -> String {
    template
        .replace(JS_PLACEHOLDER, &assets.js)
        .replace(BUTTON_PLACEHOLDER, &assets.button)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn assets() -> PersonaAssets {
        PersonaAssets::new("<script>persona()</script>", "<button id=\"signin\"></button>")
    }

    #[test]
    fn test_render_substitutes_both_placeholders() {
        let html = render("<head>{{ js }}</head><body>{{ button }}</body>", &assets());
        assert_eq!(
            html,
            "<head><script>persona()</script></head><body><button id=\"signin\"></button></body>"
        );
    }

    #[test]
    fn test_bundled_template_has_placeholders() {
        assert!(BUNDLED_TEMPLATE.contains(JS_PLACEHOLDER));
        assert!(BUNDLED_TEMPLATE.contains(BUTTON_PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_bundled_template() {
        let use_case = ForbiddenPageUseCase::new(Arc::new(PersonaConfig::default()));
        let html = use_case.execute(&assets()).await.unwrap();
        assert_eq!(html, render(BUNDLED_TEMPLATE, &assets()));
        assert!(!html.contains("{{"));
    }

    #[tokio::test]
    async fn test_template_override() {
        let path = std::env::temp_dir().join(format!(
            "persona-forbidden-{}.html",
            platform::crypto::random_token(6)
        ));
        tokio::fs::write(&path, "custom {{ button }}").await.unwrap();

        let use_case = ForbiddenPageUseCase::new(Arc::new(PersonaConfig {
            forbidden_template: Some(path.clone()),
            ..PersonaConfig::default()
        }));
        let html = use_case.execute(&assets()).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(html, "custom <button id=\"signin\"></button>");
    }

    #[tokio::test]
    async fn test_missing_template_is_fatal() {
        let use_case = ForbiddenPageUseCase::new(Arc::new(PersonaConfig {
            forbidden_template: Some(PathBuf::from("/nonexistent/persona/forbidden.html")),
            ..PersonaConfig::default()
        }));
        let err = use_case.execute(&assets()).await.unwrap_err();
        assert!(matches!(err, PersonaError::Template { .. }));
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
