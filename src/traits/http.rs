//! HTTP client trait abstraction.
//!
//! The chat stream decoder never talks to the network directly. It consumes
//! whatever byte stream an [`HttpClient`] hands back from
//! [`HttpClient::post_stream`], which lets tests drive it with scripted
//! chunk sequences and failures.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;
use thiserror::Error;

/// HTTP headers represented as a key-value map.
pub type Headers = HashMap<String, String>;

/// A live response body: byte chunks in arrival order, ending with `None`
/// or failing with an [`HttpError`]. Chunk boundaries carry no meaning.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// Fully buffered HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Response body
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    pub fn with_headers(status: u16, headers: Headers, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Build a JSON response from a serializable value.
    pub fn json_body<T: serde::Serialize>(status: u16, value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Ok(Self::with_headers(status, headers, body))
    }

    /// Check if the response indicates success (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text; invalid UTF-8 is replaced rather than rejected since the
    /// text is only ever used as an error detail or for JSON decoding.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse the response body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// HTTP client errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HttpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Request timeout: {0}")]
    Timeout(String),
    /// Non-2xx status; `message` is the response body text
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },
    /// The server accepted a stream request but sent no body to read
    #[error("No response body for stream")]
    MissingBody,
    #[error("Request cancelled")]
    Cancelled,
    #[error("IO error: {0}")]
    Io(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("HTTP error: {0}")]
    Other(String),
}

impl HttpError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            HttpError::ConnectionFailed(_) | HttpError::Timeout(_) | HttpError::Io(_) => true,
            HttpError::ServerError { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            _ => false,
        }
    }
}

/// Transport used by [`crate::client::BrainClient`].
///
/// `get`, `post` and `delete` return the response whatever its status;
/// callers decide what a non-2xx status means. `post_stream` is stricter
/// because a stream is only worth reading on success.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError>;

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError>;

    async fn delete(&self, url: &str, headers: &Headers) -> Result<Response, HttpError>;

    /// POST and hand back the response body as it arrives.
    ///
    /// # Errors
    /// - [`HttpError::ServerError`] for a non-2xx status, carrying the body text
    /// - [`HttpError::MissingBody`] when the response has no body to stream
    /// - any connection-level error from sending the request
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_new() {
        let response = Response::new(200, Bytes::from("Hello"));
        assert_eq!(response.status, 200);
        assert!(response.headers.is_empty());
        assert_eq!(response.body, Bytes::from("Hello"));
    }

    #[test]
    fn test_response_is_success() {
        assert!(Response::new(200, Bytes::new()).is_success());
        assert!(Response::new(204, Bytes::new()).is_success());
        assert!(Response::new(299, Bytes::new()).is_success());
        assert!(!Response::new(300, Bytes::new()).is_success());
        assert!(!Response::new(404, Bytes::new()).is_success());
        assert!(!Response::new(500, Bytes::new()).is_success());
    }

    #[test]
    fn test_response_text_lossy() {
        let response = Response::new(500, vec![b'o', b'k', 0xff]);
        assert_eq!(response.text(), "ok\u{FFFD}");
    }

    #[test]
    fn test_response_json_body_roundtrip() {
        let response =
            Response::json_body(200, &serde_json::json!({"status": "ok"})).unwrap();
        assert_eq!(
            response.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["status"], "ok");
    }

    #[test]
    fn test_http_error_display() {
        assert_eq!(
            HttpError::ServerError {
                status: 500,
                message: "Internal Error".to_string()
            }
            .to_string(),
            "Server error (500): Internal Error"
        );
        assert_eq!(HttpError::MissingBody.to_string(), "No response body for stream");
        assert_eq!(HttpError::Cancelled.to_string(), "Request cancelled");
        assert_eq!(
            HttpError::Io("reset by peer".to_string()).to_string(),
            "IO error: reset by peer"
        );
    }

    #[test]
    fn test_http_error_retryable() {
        assert!(HttpError::Timeout("30s".into()).is_retryable());
        assert!(HttpError::Io("eof".into()).is_retryable());
        assert!(HttpError::ServerError {
            status: 503,
            message: String::new()
        }
        .is_retryable());
        assert!(!HttpError::ServerError {
            status: 422,
            message: String::new()
        }
        .is_retryable());
        assert!(!HttpError::MissingBody.is_retryable());
        assert!(!HttpError::Cancelled.is_retryable());
    }
}
