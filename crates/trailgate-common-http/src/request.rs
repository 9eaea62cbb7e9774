//! HTTP request types and builders.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};

/// Common HTTP headers.
pub mod headers {
    pub const CONTENT_TYPE_JSON: &str = "application/json";
}

/// A request builder with common patterns.
///
/// Holds the endpoint base and the headers shared by every call to it.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    headers: HeaderMap,
    base_url: Option<String>,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new() -> Self {
        Self {
            headers: HeaderMap::new(),
            base_url: None,
        }
    }

    /// Set the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Add bearer token authorization.
    pub fn bearer_auth(mut self, token: impl AsRef<str>) -> Self {
        if let Ok(mut value) = HeaderValue::try_from(format!("Bearer {}", token.as_ref())) {
            value.set_sensitive(true);
            self.headers.insert(AUTHORIZATION, value);
        }
        self
    }

    /// Send and accept JSON.
    pub fn json_content(mut self) -> Self {
        let json = HeaderValue::from_static(headers::CONTENT_TYPE_JSON);
        self.headers.insert(CONTENT_TYPE, json.clone());
        self.headers.insert(ACCEPT, json);
        self
    }

    /// Get the built headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Build the URL.
    pub fn url(&self, path: &str) -> String {
        match &self.base_url {
            Some(base) => format!("{}{}", base.trim_end_matches('/'), path),
            None => path.to_string(),
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
