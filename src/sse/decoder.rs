//! Byte chunks in, parsed events out.

use super::events::ParsedEvent;
use super::parser::parse_block;
use super::splitter::{BlockSplitter, Utf8ChunkDecoder};

/// Incremental SSE decoder for one response body.
///
/// Combines UTF-8 decoding, block framing and block parsing. The events
/// produced do not depend on where the body was cut into chunks.
#[derive(Debug, Default)]
pub struct EventDecoder {
    utf8: Utf8ChunkDecoder,
    splitter: BlockSplitter,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and iterate over the events it completes.
    ///
    /// Events not pulled from the iterator stay buffered and are returned
    /// by the next call.
    pub fn decode_chunk(&mut self, chunk: &[u8]) -> impl Iterator<Item = ParsedEvent> + '_ {
        let text = self.utf8.decode(chunk);
        self.splitter.feed(&text).map(|block| parse_block(&block))
    }

    /// End of body: parse whatever is left. Call once, after the last chunk.
    pub fn finish(&mut self) -> impl Iterator<Item = ParsedEvent> + '_ {
        let tail = self.utf8.finish();
        if !tail.is_empty() {
            // Buffered only; the flush below yields it.
            let _ = self.splitter.feed(&tail);
        }
        self.splitter.flush().map(|block| parse_block(&block))
    }

    /// Decode a complete body in one go.
    pub fn decode_all(body: &[u8]) -> Vec<ParsedEvent> {
        let mut decoder = Self::new();
        let mut events: Vec<ParsedEvent> = decoder.decode_chunk(body).collect();
        events.extend(decoder.finish());
        events
    }

    /// True when nothing is held back waiting for more input.
    pub fn is_idle(&self) -> bool {
        self.splitter.is_empty() && !self.utf8.has_pending()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "event: meta\ndata: {\"conversation_id\":1}\n\ndata: Hello\n\ndata: world\n\nevent: done\ndata: {}\n\n";

    fn decode_in_pieces(body: &[u8], size: usize) -> Vec<ParsedEvent> {
        let mut decoder = EventDecoder::new();
        let mut events = Vec::new();
        for chunk in body.chunks(size) {
            events.extend(decoder.decode_chunk(chunk));
        }
        events.extend(decoder.finish());
        events
    }

    #[test]
    fn test_decode_whole_body() {
        let events = EventDecoder::decode_all(BODY.as_bytes());
        assert_eq!(
            events,
            vec![
                ParsedEvent::new("meta", "{\"conversation_id\":1}"),
                ParsedEvent::message("Hello"),
                ParsedEvent::message("world"),
                ParsedEvent::new("done", "{}"),
            ]
        );
    }

    #[test]
    fn test_chunk_size_does_not_matter() {
        let expected = EventDecoder::decode_all(BODY.as_bytes());
        for size in 1..=BODY.len() {
            assert_eq!(decode_in_pieces(BODY.as_bytes(), size), expected, "size {}", size);
        }
    }

    #[test]
    fn test_multibyte_across_chunks() {
        let body = "data: naïve ☕ résumé\n\n".as_bytes();
        for size in 1..=4 {
            assert_eq!(
                decode_in_pieces(body, size),
                vec![ParsedEvent::message("naïve ☕ résumé")]
            );
        }
    }

    #[test]
    fn test_finish_emits_unterminated_block() {
        let mut decoder = EventDecoder::new();
        assert_eq!(decoder.decode_chunk(b"data: tail").count(), 0);
        assert!(!decoder.is_idle());
        let events: Vec<ParsedEvent> = decoder.finish().collect();
        assert_eq!(events, vec![ParsedEvent::message("tail")]);
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_finish_with_truncated_utf8() {
        let mut decoder = EventDecoder::new();
        let mut bytes = b"data: x".to_vec();
        bytes.extend_from_slice(&"é".as_bytes()[..1]);
        assert_eq!(decoder.decode_chunk(&bytes).count(), 0);
        let events: Vec<ParsedEvent> = decoder.finish().collect();
        assert_eq!(events, vec![ParsedEvent::message("x\u{FFFD}")]);
    }

    #[test]
    fn test_reset() {
        let mut decoder = EventDecoder::new();
        let _ = decoder.decode_chunk(b"data: half").count();
        decoder.reset();
        assert!(decoder.is_idle());
        assert_eq!(decoder.finish().count(), 0);
    }
}
