//! Test doubles for the trait abstractions.
//!
//! - [`MockHttpClient`] - HTTP client with scripted responses and streams

pub mod http;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
