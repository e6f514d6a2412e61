//! Mock transport configurations.

pub use brain_client::adapters::{MockHttpClient, MockResponse};
pub use brain_client::traits::{HttpError, Response};

use std::sync::Arc;

use brain_client::client::BrainClient;
use brain_client::config::ClientConfig;
use bytes::Bytes;

pub const BASE_URL: &str = "http://brain.test";
pub const STREAM_URL: &str = "http://brain.test/v1/chat/stream";

/// A client over a fresh mock transport. The mock is returned for scripting
/// responses and inspecting recorded requests.
pub fn mock_client() -> (MockHttpClient, BrainClient) {
    let mock = MockHttpClient::new();
    let client = BrainClient::with_http_client(
        ClientConfig::new().with_base_url(BASE_URL),
        Arc::new(mock.clone()),
    );
    (mock, client)
}

/// Stream raw byte pieces, then end.
pub fn byte_stream(pieces: Vec<Vec<u8>>) -> MockResponse {
    MockResponse::Stream(pieces.into_iter().map(Bytes::from).collect())
}

/// Stream `pieces`, then fail mid-body.
pub fn failing_stream(pieces: &[&str]) -> MockResponse {
    MockResponse::StreamThenError(
        pieces.iter().map(|p| Bytes::from(p.to_string())).collect(),
        HttpError::Io("connection reset by peer".to_string()),
    )
}

/// Stream `pieces`, then stall.
pub fn stalled_stream(pieces: &[&str]) -> MockResponse {
    MockResponse::StreamThenPending(pieces.iter().map(|p| Bytes::from(p.to_string())).collect())
}
