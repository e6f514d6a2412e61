//! Trait abstractions for dependency injection and testability.
//!
//! - [`HttpClient`] - HTTP operations, including the streaming POST that
//!   feeds the chat stream decoder

pub mod http;

pub use http::{ByteStream, Headers, HttpClient, HttpError, Response};
