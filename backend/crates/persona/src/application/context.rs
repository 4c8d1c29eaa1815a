//! Request Context
//!
//! What a view sees of the current request, and the headers it wants added
//! to the response.

use std::collections::HashMap;

use axum::http::{HeaderMap, Method, header};

use crate::domain::session::SessionHandle;

/// Redirect target when the client sends no `came_from`
pub const DEFAULT_REDIRECT: &str = "/";

/// How a request body carries form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEncoding {
    /// No body is read (GET and HEAD)
    None,
    /// `application/x-www-form-urlencoded`, also assumed without a content type
    UrlEncoded,
    /// `multipart/form-data`
    Multipart,
    /// Any other body; it carries no form fields
    Other,
}

impl FormEncoding {
    /// Encoding of a request's body, going by method and content type
    pub fn of(method: &Method, headers: &HeaderMap) -> Self {
        if method == Method::GET || method == Method::HEAD {
            return FormEncoding::None;
        }

        let Some(value) = headers.get(header::CONTENT_TYPE) else {
            return FormEncoding::UrlEncoded;
        };
        let Ok(content_type) = value.to_str() else {
            return FormEncoding::Other;
        };

        // Media types are case-insensitive; parameters follow the first ';'
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
            FormEncoding::UrlEncoded
        } else if essence.eq_ignore_ascii_case("multipart/form-data") {
            FormEncoding::Multipart
        } else {
            FormEncoding::Other
        }
    }
}

/// Decoded form fields of a request body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData(HashMap<String, String>);

impl FormData {
    /// Parse a urlencoded body; a repeated key keeps its last value
    pub fn parse(body: &[u8]) -> Self {
        Self(
            url::form_urlencoded::parse(body)
                .into_owned()
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Post-login/logout redirect target
    ///
    /// Taken verbatim from the client: this is an open redirect.
    pub fn came_from(&self) -> &str {
        self.get("came_from").unwrap_or(DEFAULT_REDIRECT)
    }
}

impl<K, V> FromIterator<(K, V)> for FormData
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// One request as seen by the persona views
#[derive(Debug)]
pub struct ViewRequest {
    pub method: Method,
    pub headers: HeaderMap,
    pub form: FormData,
    pub session: SessionHandle,
    /// Headers the view adds to whatever response is finally sent
    pub response_headers: HeaderMap,
}

impl ViewRequest {
    pub fn new(method: Method, headers: HeaderMap, form: FormData, session: SessionHandle) -> Self {
        Self {
            method,
            headers,
            form,
            session,
            response_headers: HeaderMap::new(),
        }
    }

    pub fn is_post(&self) -> bool {
        self.method == Method::POST
    }

    /// Append `headers` to the response, keeping values already set
    pub fn merge_response_headers(&mut self, headers: &HeaderMap) {
        for (name, value) in headers {
            self.response_headers.append(name.clone(), value.clone());
        }
    }
}
