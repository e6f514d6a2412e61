//! Error category classification.
//!
//! Categories drive retry decisions and the wording shown to the user.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection refused, DNS, timeout, dropped stream.
    /// Generally transient and retryable.
    Network,

    /// Backend answered with a 5xx status.
    Server,

    /// Backend rejected the request (4xx) or sent something unreadable.
    Client,

    /// The caller stopped the operation.
    User,

    /// Missing or malformed settings.
    Configuration,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Short label for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::User => "user",
            ErrorCategory::Configuration => "configuration",
        }
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check that the backend is running and reachable, then retry.",
            ErrorCategory::Server => "The backend failed; retry in a moment.",
            ErrorCategory::Client => "Check the request and try again.",
            ErrorCategory::User => "Nothing to do; the operation was stopped.",
            ErrorCategory::Configuration => "Check BRAIN_API_BASE and BRAIN_TIMEOUT_SECS.",
        }
    }

    /// Category of an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        if status >= 500 {
            ErrorCategory::Server
        } else {
            ErrorCategory::Client
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
