//! Shared fixtures for the integration tests.
//!
//! ```ignore
//! mod common;
//! use common::{mock_client, STREAM_URL, SCENARIO};
//!
//! let (mock, client) = mock_client();
//! mock.set_response(STREAM_URL, MockResponse::chunks([SCENARIO]));
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use brain_client::models::{Citation, Meta, MetaPayload};
use brain_client::sse::ChatEvent;

/// The body of a typical answer: meta, two tokens, done.
pub const SCENARIO: &str = "event: meta\ndata: {\"conversation_id\":7,\"citations\":[]}\n\n\
data: Hello\n\n\
data: world\n\n\
event: done\ndata: {}\n\n";

/// Split `text` at the given byte offsets. Offsets past the end or not
/// increasing are ignored.
pub fn split_at(text: &str, cuts: &[usize]) -> Vec<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;
    for &cut in cuts {
        let cut = cut.min(bytes.len());
        if cut > start {
            pieces.push(bytes[start..cut].to_vec());
            start = cut;
        }
    }
    pieces.push(bytes[start..].to_vec());
    pieces
}

pub fn structured_meta(conversation_id: i64, citations: Vec<Citation>) -> ChatEvent {
    ChatEvent::Meta(MetaPayload::Structured(Meta {
        conversation_id: Some(conversation_id),
        citations: Some(citations),
    }))
}

pub fn token(text: &str) -> ChatEvent {
    ChatEvent::Token(text.to_string())
}

/// Number of `Done` notifications in a recording.
pub fn done_count(events: &[ChatEvent]) -> usize {
    events.iter().filter(|event| event.is_done()).count()
}
