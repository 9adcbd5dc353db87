//! HTTP client utilities for Omakase.
//!
//! Provides a small builder API for JSON requests over a pluggable
//! [`Transport`]. Production code uses [`ReqwestTransport`]; tests plug in an
//! in-process fake.
//!
//! # Example
//!
//! ```rust,ignore
//! use omakase_http::{FetchClient, ReqwestTransport, TimeoutConfig};
//!
//! let transport = ReqwestTransport::new(TimeoutConfig::default())?;
//! let client = FetchClient::new(transport).with_base_url("https://api.example.com");
//!
//! let cart: serde_json::Value = client
//!     .get("/cart")
//!     .header("session-id", token.as_str())
//!     .send()
//!     .await?
//!     .error_for_status()?
//!     .json()?;
//! ```

mod error;
mod request;
mod response;
mod timeout;
mod transport;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

pub use error::FetchError;
pub use request::{Method, RequestBuilder};
pub use response::Response;
pub use timeout::TimeoutConfig;
pub use transport::{ReqwestTransport, Transport};

/// HTTP client for making outbound requests.
///
/// Cloning is cheap; clones share the transport.
#[derive(Clone)]
pub struct FetchClient {
    transport: Arc<dyn Transport>,
    base_url: Option<String>,
    default_headers: HashMap<String, String>,
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

impl FetchClient {
    /// Create a new HTTP client over a transport.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::from_arc(Arc::new(transport))
    }

    /// Create a client over an already shared transport.
    pub fn from_arc(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            base_url: None,
            default_headers: HashMap::new(),
        }
    }

    /// Create a client with a base URL that will be prepended to all requests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Create a GET request.
    pub fn get(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Get, url)
    }

    /// Create a POST request.
    pub fn post(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Post, url)
    }

    /// Create a PUT request.
    pub fn put(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Put, url)
    }

    /// Create a DELETE request.
    pub fn delete(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Delete, url)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> ClientRequestBuilder {
        let url = url.into();
        let full_url = match &self.base_url {
            Some(base) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                format!(
                    "{}/{}",
                    base.trim_end_matches('/'),
                    url.trim_start_matches('/')
                )
            }
            _ => url,
        };

        let mut builder = RequestBuilder::new(method, full_url);
        for (key, value) in &self.default_headers {
            builder = builder.header(key.clone(), value.clone());
        }

        ClientRequestBuilder {
            builder,
            transport: Arc::clone(&self.transport),
        }
    }
}

/// A request builder bound to a client.
pub struct ClientRequestBuilder {
    builder: RequestBuilder,
    transport: Arc<dyn Transport>,
}

impl ClientRequestBuilder {
    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Result<Self, FetchError> {
        self.builder = self.builder.json(value)?;
        Ok(self)
    }

    /// Inspect the request as built so far.
    pub fn request(&self) -> &RequestBuilder {
        &self.builder
    }

    /// Send the request and return the response.
    pub async fn send(self) -> Result<Response, FetchError> {
        let method = self.builder.method;
        let url = self.builder.url.clone();

        let result = self.transport.send(self.builder).await;
        match &result {
            Ok(resp) => debug!(%method, %url, status = resp.status, "request completed"),
            Err(e) => debug!(%method, %url, error = %e, "request failed"),
        }
        result
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FetchClient, FetchError, Method, Response, Transport};
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Transport that records the last request and answers 200 with its path.
    #[derive(Default)]
    struct EchoTransport {
        last: Mutex<Option<RequestBuilder>>,
    }

    #[async_trait]
    impl Transport for EchoTransport {
        async fn send(&self, request: RequestBuilder) -> Result<Response, FetchError> {
            let body = request.path().as_bytes().to_vec();
            *self.last.lock().unwrap() = Some(request);
            Ok(Response::new(200, HashMap::new(), body))
        }
    }

    #[test]
    fn test_base_url_joining() {
        let client = FetchClient::new(EchoTransport::default()).with_base_url("http://api/");

        assert_eq!(client.get("/cart").request().url, "http://api/cart");
        assert_eq!(client.get("cart/1").request().url, "http://api/cart/1");
        assert_eq!(
            client.get("https://other/cart").request().url,
            "https://other/cart"
        );
    }

    #[test]
    fn test_default_headers_applied() {
        let client = FetchClient::new(EchoTransport::default())
            .with_default_header("Accept", "application/json");

        let builder = client.delete("/cart/3").header("session-id", "s1");
        assert_eq!(builder.request().header_value("accept"), Some("application/json"));
        assert_eq!(builder.request().header_value("session-id"), Some("s1"));
        assert_eq!(builder.request().method, Method::Delete);
    }

    #[tokio::test]
    async fn test_send_goes_through_transport() {
        let transport = Arc::new(EchoTransport::default());
        let client = FetchClient::from_arc(transport.clone()).with_base_url("http://api");

        let resp = client
            .put("/cart/9")
            .json(&serde_json::json!({"quantidadeCarrinho": 2}))
            .unwrap()
            .send()
            .await
            .unwrap();

        assert_eq!(resp.text().unwrap(), "/cart/9");
        let last = transport.last.lock().unwrap().clone().unwrap();
        assert_eq!(last.method, Method::Put);
        assert!(last.body.is_some());
    }
}
