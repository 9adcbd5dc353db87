//! HTTP request builder.

use crate::FetchError;
use serde::Serialize;
use std::collections::HashMap;

/// HTTP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Convert to HTTP method string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A builder for constructing HTTP requests.
///
/// Transports receive the finished builder and read its fields directly.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub method: Method,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: Serialize>(mut self, value: &T) -> Result<Self, FetchError> {
        let json = serde_json::to_vec(value)?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self.body = Some(json);
        Ok(self)
    }

    /// Set the Accept header.
    pub fn accept(self, content_type: impl Into<String>) -> Self {
        self.header("Accept", content_type)
    }

    /// Get a header value (case-insensitive).
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Path component of the URL, without scheme, host or query.
    pub fn path(&self) -> &str {
        let without_scheme = match self.url.find("://") {
            Some(idx) => &self.url[idx + 3..],
            None => self.url.as_str(),
        };
        let path = match without_scheme.find('/') {
            Some(idx) if self.url.contains("://") => &without_scheme[idx..],
            Some(_) => without_scheme,
            None => "/",
        };
        path.split('?').next().unwrap_or(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_sets_content_type() {
        let req = RequestBuilder::new(Method::Post, "http://api/cart")
            .json(&serde_json::json!({"id": 1}))
            .unwrap();

        assert_eq!(req.header_value("content-type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some(br#"{"id":1}"#.as_slice()));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = RequestBuilder::new(Method::Get, "/cart").header("session-id", "abc");
        assert_eq!(req.header_value("Session-Id"), Some("abc"));
        assert_eq!(req.header_value("missing"), None);
    }

    #[test]
    fn test_path_extraction() {
        let req = RequestBuilder::new(Method::Delete, "https://api.example.com/cart/7?x=1");
        assert_eq!(req.path(), "/cart/7");

        let req = RequestBuilder::new(Method::Get, "http://localhost:3000");
        assert_eq!(req.path(), "/");

        let req = RequestBuilder::new(Method::Get, "/cart");
        assert_eq!(req.path(), "/cart");
    }

    #[test]
    fn test_method_as_str() {
        assert_eq!(Method::Put.as_str(), "PUT");
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }
}
