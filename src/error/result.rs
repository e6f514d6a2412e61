//! Result alias for client operations.

use super::brain_error::BrainError;

/// Result of any [`BrainClient`](crate::client::BrainClient) operation.
pub type BrainResult<T> = Result<T, BrainError>;
