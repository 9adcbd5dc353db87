//! HTTP response handling.

use crate::FetchError;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// Longest error body echoed into a [`FetchError::HttpError`] message.
const MAX_ERROR_BODY: usize = 256;

/// An HTTP response, fully buffered.
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code.
    pub status: u16,
    /// The response headers.
    pub headers: HashMap<String, String>,
    /// The response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Create a new response.
    pub fn new(status: u16, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a `200 OK` response with a JSON body.
    pub fn json_ok<T: serde::Serialize>(value: &T) -> Result<Self, FetchError> {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Ok(Self::new(200, headers, serde_json::to_vec(value)?))
    }

    /// Check if the response was successful (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get the response body as text.
    pub fn text(&self) -> Result<String, FetchError> {
        String::from_utf8(self.body.clone())
            .map_err(|e| FetchError::ParseError(format!("Invalid UTF-8: {}", e)))
    }

    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_slice(&self.body).map_err(|e| FetchError::ParseError(e.to_string()))
    }

    /// Get a header value (case-insensitive).
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Convert to a Result, returning an error for non-2xx status codes.
    pub fn error_for_status(self) -> Result<Self, FetchError> {
        if self.is_success() {
            return Ok(self);
        }

        let mut message = String::from_utf8_lossy(&self.body).trim().to_string();
        if message.is_empty() {
            message = "no response body".to_string();
        } else if message.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !message.is_char_boundary(cut) {
                cut -= 1;
            }
            message.truncate(cut);
            message.push_str("...");
        }

        Err(FetchError::HttpError {
            status: self.status,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(status: u16, body: &[u8]) -> Response {
        Response::new(status, HashMap::new(), body.to_vec())
    }

    // === Status Tests ===

    #[test]
    fn test_response_is_success() {
        assert!(make_response(200, b"").is_success());
        assert!(make_response(204, b"").is_success());
        assert!(!make_response(199, b"").is_success());
        assert!(!make_response(404, b"").is_success());
    }

    #[test]
    fn test_error_for_status_keeps_body() {
        let err = make_response(500, b"Erro ao recuperar carrinho")
            .error_for_status()
            .unwrap_err();

        match err {
            FetchError::HttpError { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Erro ao recuperar carrinho");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_for_status_truncates_long_body() {
        let body = "x".repeat(1000);
        let err = make_response(502, body.as_bytes())
            .error_for_status()
            .unwrap_err();

        if let FetchError::HttpError { message, .. } = err {
            assert_eq!(message.len(), MAX_ERROR_BODY + 3);
        } else {
            panic!("expected HttpError");
        }
    }

    #[test]
    fn test_error_for_status_empty_body() {
        let err = make_response(404, b"").error_for_status().unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("no response body"));
    }

    // === Body Tests ===

    #[test]
    fn test_response_json() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Totals {
            #[serde(rename = "valorTotal")]
            subtotal: f64,
        }

        let resp = make_response(200, br#"{"valorTotal": 42.5}"#);
        let totals: Totals = resp.json().unwrap();
        assert_eq!(totals, Totals { subtotal: 42.5 });
    }

    #[test]
    fn test_response_json_invalid() {
        let resp = make_response(200, b"not json");
        let result: Result<serde_json::Value, _> = resp.json();
        assert!(matches!(result, Err(FetchError::ParseError(_))));
    }

    #[test]
    fn test_json_ok_round_trip() {
        let resp = Response::json_ok(&serde_json::json!({"id": 3})).unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.header("content-type"), Some("application/json"));
        assert_eq!(resp.text().unwrap(), r#"{"id":3}"#);
    }
}
