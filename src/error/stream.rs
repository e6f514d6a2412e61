//! Chat stream errors.
//!
//! A malformed `meta` payload is not an error: it is delivered raw. What
//! remains is a failed request, a failed read, or a cancelled session.

use thiserror::Error;

use super::category::ErrorCategory;
use crate::traits::HttpError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    /// The backend answered the initial request with a non-2xx status.
    /// `message` is the response body text.
    #[error("Request failed ({status}): {message}")]
    Request { status: u16, message: String },

    /// The response carried no readable body.
    #[error("Response has no body")]
    MissingBody,

    /// The request could not be sent.
    #[error("Could not reach backend: {0}")]
    Connect(HttpError),

    /// Reading the body failed part way through.
    #[error("Stream read failed: {0}")]
    Transport(HttpError),

    #[error("Stream cancelled")]
    Cancelled,
}

impl StreamError {
    /// Classify a failure of the initial request.
    pub fn from_request(err: HttpError) -> Self {
        match err {
            HttpError::ServerError { status, message } => StreamError::Request { status, message },
            HttpError::MissingBody => StreamError::MissingBody,
            HttpError::Cancelled => StreamError::Cancelled,
            other => StreamError::Connect(other),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            StreamError::Request { status, .. } => ErrorCategory::from_status(*status),
            StreamError::MissingBody => ErrorCategory::Server,
            StreamError::Connect(_) | StreamError::Transport(_) => ErrorCategory::Network,
            StreamError::Cancelled => ErrorCategory::User,
        }
    }

    /// True for request-phase failures, before any event was read.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            StreamError::Request { .. } | StreamError::MissingBody | StreamError::Connect(_)
        )
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::Connect(err) | StreamError::Transport(err) => err.is_retryable(),
            other => other.category().is_retryable(),
        }
    }

    /// Short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::Request { .. } => "E_STREAM_REQUEST",
            StreamError::MissingBody => "E_STREAM_NO_BODY",
            StreamError::Connect(_) => "E_STREAM_CONNECT",
            StreamError::Transport(_) => "E_STREAM_TRANSPORT",
            StreamError::Cancelled => "E_STREAM_CANCELLED",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            StreamError::Request { message, .. } if !message.trim().is_empty() => {
                format!("The server rejected the question: {}", message.trim())
            }
            StreamError::Request { status, .. } => {
                format!("The server rejected the question (HTTP {}).", status)
            }
            StreamError::MissingBody => "The server sent an empty answer.".to_string(),
            StreamError::Connect(_) => {
                "Could not reach the server. Is the backend running?".to_string()
            }
            StreamError::Transport(_) => {
                "The connection dropped while the answer was streaming.".to_string()
            }
            StreamError::Cancelled => "Stopped.".to_string(),
        }
    }
}
