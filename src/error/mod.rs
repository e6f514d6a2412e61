//! Error handling.
//!
//! - [`StreamError`]: why a chat stream ended early
//! - [`BrainError`]: any client failure, wrapping transport, status and
//!   decoding errors
//! - [`ErrorCategory`]: coarse classification for retry and messaging
//!
//! | Category | Examples | Retryable |
//! |----------|----------|-----------|
//! | Network | refused connection, dropped stream | Yes |
//! | Server | HTTP 5xx | Yes |
//! | Client | HTTP 4xx, bad JSON | No |
//! | User | cancelled | No |
//! | Configuration | bad base URL or timeout | No |

mod brain_error;
mod category;
mod result;
mod stream;

pub use brain_error::BrainError;
pub use category::ErrorCategory;
pub use result::BrainResult;
pub use stream::StreamError;
