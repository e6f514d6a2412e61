//! Unified error type for the client.

use thiserror::Error;

use super::category::ErrorCategory;
use super::stream::StreamError;
use crate::traits::HttpError;

/// Anything a [`BrainClient`](crate::client::BrainClient) call can fail with.
#[derive(Debug, Error)]
pub enum BrainError {
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Non-2xx status on a buffered endpoint; `message` is the body text.
    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl BrainError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BrainError::Http(HttpError::ServerError { status, .. }) => {
                ErrorCategory::from_status(*status)
            }
            BrainError::Http(HttpError::Cancelled) => ErrorCategory::User,
            BrainError::Http(HttpError::InvalidUrl(_)) => ErrorCategory::Configuration,
            BrainError::Http(_) => ErrorCategory::Network,
            BrainError::Server { status, .. } => ErrorCategory::from_status(*status),
            BrainError::Json(_) => ErrorCategory::Client,
            BrainError::Stream(err) => err.category(),
            BrainError::Config(_) => ErrorCategory::Configuration,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            BrainError::Http(err) => err.is_retryable(),
            BrainError::Stream(err) => err.is_retryable(),
            other => other.category().is_retryable(),
        }
    }

    /// HTTP status behind the error, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            BrainError::Http(HttpError::ServerError { status, .. })
            | BrainError::Server { status, .. }
            | BrainError::Stream(StreamError::Request { status, .. }) => Some(*status),
            _ => None,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            BrainError::Stream(err) => err.user_message(),
            BrainError::Server { message, .. } if !message.trim().is_empty() => {
                message.trim().to_string()
            }
            other => format!("{} ({})", other, other.category()),
        }
    }

    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}
