//! Incremental framing.
//!
//! Network reads arrive at arbitrary byte positions: in the middle of a UTF-8
//! sequence, between the `\r` and `\n` of a line ending, or half way through
//! a blank-line separator. [`Utf8ChunkDecoder`] and [`BlockSplitter`] hold
//! back whatever is incomplete so that feeding a stream in pieces yields
//! exactly the blocks that feeding it whole would.

use std::borrow::Cow;

const REPLACEMENT: char = '\u{FFFD}';
const SEPARATOR: &str = "\n\n";

/// Streaming UTF-8 decoder for byte chunks.
///
/// An incomplete multi-byte sequence at the end of a chunk is kept until
/// the next chunk completes it. Invalid sequences decode to U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk, returning all text that is complete so far.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut rest: &[u8] = &bytes;

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, tail) = rest.split_at(err.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));

                    match err.error_len() {
                        Some(invalid_len) => {
                            out.push(REPLACEMENT);
                            rest = &tail[invalid_len..];
                        }
                        None => {
                            self.pending = tail.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// End of input. A sequence still incomplete at this point is invalid.
    pub fn finish(&mut self) -> String {
        if std::mem::take(&mut self.pending).is_empty() {
            String::new()
        } else {
            REPLACEMENT.to_string()
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Accumulates decoded text and cuts it into blocks at blank lines.
///
/// Line endings are normalized (`\r\n` to `\n`) before separator detection.
/// A `\r` ending a fed piece is held back until the next piece shows whether
/// a `\n` follows it. Blocks that are blank after trimming are skipped.
#[derive(Debug, Default)]
pub struct BlockSplitter {
    buffer: String,
    pending_cr: bool,
}

impl BlockSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text and iterate over every block it completes.
    ///
    /// The text is buffered before this returns; blocks are cut lazily as
    /// the iterator advances. Blocks the caller does not pull stay buffered
    /// and come out of the next `feed` or `flush`, in order.
    pub fn feed(&mut self, text: &str) -> Blocks<'_> {
        self.append(text);
        Blocks {
            splitter: self,
            finishing: false,
        }
    }

    /// Byte-oriented convenience over [`BlockSplitter::feed`] for input
    /// known to be whole UTF-8 sequences per chunk; prefer an
    /// [`EventDecoder`](super::EventDecoder) for raw network reads.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Blocks<'_> {
        let text = String::from_utf8_lossy(bytes);
        self.feed(&text)
    }

    /// End of stream: yields any unread complete blocks, then the trailing
    /// partial block if it is not blank. With all earlier blocks consumed
    /// this yields at most one block.
    pub fn flush(&mut self) -> Blocks<'_> {
        if std::mem::take(&mut self.pending_cr) {
            self.buffer.push('\r');
        }
        Blocks {
            splitter: self,
            finishing: true,
        }
    }

    /// Drop all buffered text.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.pending_cr = false;
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && !self.pending_cr
    }

    /// Bytes of text held back waiting for a separator.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len() + usize::from(self.pending_cr)
    }

    fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        let mut incoming: Cow<'_, str> = if std::mem::take(&mut self.pending_cr) {
            Cow::Owned(format!("\r{}", text))
        } else {
            Cow::Borrowed(text)
        };

        if incoming.ends_with('\r') {
            let owned = incoming.to_mut();
            owned.pop();
            self.pending_cr = true;
        }

        if incoming.contains("\r\n") {
            self.buffer.push_str(&incoming.replace("\r\n", "\n"));
        } else {
            self.buffer.push_str(&incoming);
        }
    }

    fn next_complete(&mut self) -> Option<String> {
        loop {
            let end = self.buffer.find(SEPARATOR)?;
            let block: String = self.buffer.drain(..end + SEPARATOR.len()).collect();
            let block = &block[..end];
            if !block.trim().is_empty() {
                return Some(block.to_string());
            }
        }
    }

    fn take_remainder(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        if rest.trim().is_empty() {
            None
        } else {
            Some(rest)
        }
    }
}

/// Lazy iterator over the blocks a [`BlockSplitter`] can currently cut.
#[derive(Debug)]
pub struct Blocks<'a> {
    splitter: &'a mut BlockSplitter,
    finishing: bool,
}

impl Iterator for Blocks<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if let Some(block) = self.splitter.next_complete() {
            return Some(block);
        }
        if self.finishing {
            self.finishing = false;
            return self.splitter.take_remainder();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_all(pieces: &[&str]) -> Vec<String> {
        let mut splitter = BlockSplitter::new();
        let mut blocks = Vec::new();
        for piece in pieces {
            blocks.extend(splitter.feed(piece));
        }
        blocks.extend(splitter.flush());
        blocks
    }

    #[test]
    fn test_single_block() {
        let mut splitter = BlockSplitter::new();
        let blocks: Vec<String> = splitter.feed("data: Hello\n\n").collect();
        assert_eq!(blocks, vec!["data: Hello"]);
        assert!(splitter.is_empty());
    }

    #[test]
    fn test_many_blocks_in_one_feed() {
        let blocks = split_all(&["data: a\n\ndata: b\n\nevent: done\ndata:\n\n"]);
        assert_eq!(blocks, vec!["data: a", "data: b", "event: done\ndata:"]);
    }

    #[test]
    fn test_partial_block_retained() {
        let mut splitter = BlockSplitter::new();
        assert_eq!(splitter.feed("data: Hel").count(), 0);
        assert_eq!(splitter.buffered_len(), "data: Hel".len());

        let blocks: Vec<String> = splitter.feed("lo\n").collect();
        assert!(blocks.is_empty());

        let blocks: Vec<String> = splitter.feed("\ndata: next").collect();
        assert_eq!(blocks, vec!["data: Hello"]);
        assert_eq!(splitter.buffered_len(), "data: next".len());
    }

    #[test]
    fn test_separator_split_across_feeds() {
        let blocks = split_all(&["data: a\n", "\n", "data: b\n", "\n"]);
        assert_eq!(blocks, vec!["data: a", "data: b"]);
    }

    #[test]
    fn test_flush_trailing_block() {
        let mut splitter = BlockSplitter::new();
        assert_eq!(splitter.feed("data: partial").count(), 0);
        let flushed: Vec<String> = splitter.flush().collect();
        assert_eq!(flushed, vec!["data: partial"]);
        assert!(splitter.is_empty());
    }

    #[test]
    fn test_flush_blank_remainder_yields_nothing() {
        let mut splitter = BlockSplitter::new();
        let _ = splitter.feed("data: a\n\n  \n").count();
        assert_eq!(splitter.flush().count(), 0);
    }

    #[test]
    fn test_flush_emits_unread_blocks_first() {
        let mut splitter = BlockSplitter::new();
        // Feed without pulling any block.
        drop(splitter.feed("data: a\n\ndata: b"));
        let flushed: Vec<String> = splitter.flush().collect();
        assert_eq!(flushed, vec!["data: a", "data: b"]);
    }

    #[test]
    fn test_blank_blocks_skipped() {
        let blocks = split_all(&["\n\n\n\ndata: a\n\n\n\n"]);
        assert_eq!(blocks, vec!["data: a"]);
    }

    #[test]
    fn test_crlf_separator() {
        let blocks = split_all(&["event: meta\r\ndata: {}\r\n\r\ndata: x\r\n\r\n"]);
        assert_eq!(blocks, vec!["event: meta\ndata: {}", "data: x"]);
    }

    #[test]
    fn test_crlf_split_between_cr_and_lf() {
        let whole = split_all(&["data: a\r\n\r\ndata: b\r\n\r\n"]);
        let pieces = split_all(&["data: a\r", "\n\r", "\ndata: b\r", "\n\r", "\n"]);
        assert_eq!(whole, pieces);
        assert_eq!(pieces, vec!["data: a", "data: b"]);
    }

    #[test]
    fn test_trailing_cr_held_until_flush() {
        let mut splitter = BlockSplitter::new();
        assert_eq!(splitter.feed("data: x\r").count(), 0);
        assert_eq!(splitter.buffered_len(), "data: x\r".len());
        let flushed: Vec<String> = splitter.flush().collect();
        assert_eq!(flushed, vec!["data: x\r"]);
    }

    #[test]
    fn test_clear_discards_buffer() {
        let mut splitter = BlockSplitter::new();
        let _ = splitter.feed("data: half\r").count();
        splitter.clear();
        assert!(splitter.is_empty());
        assert_eq!(splitter.flush().count(), 0);
    }

    #[test]
    fn test_utf8_split_multibyte() {
        let text = "data: café ☕\n\n";
        let bytes = text.as_bytes();
        let mut decoder = Utf8ChunkDecoder::new();
        let mut out = String::new();
        for byte in bytes {
            out.push_str(&decoder.decode(std::slice::from_ref(byte)));
        }
        out.push_str(&decoder.finish());
        assert_eq!(out, text);
    }

    #[test]
    fn test_utf8_holds_incomplete_tail() {
        let mut decoder = Utf8ChunkDecoder::new();
        let snowman = "☃".as_bytes();
        assert_eq!(decoder.decode(&snowman[..2]), "");
        assert!(decoder.has_pending());
        assert_eq!(decoder.decode(&snowman[2..]), "☃");
        assert!(!decoder.has_pending());
    }

    #[test]
    fn test_utf8_invalid_bytes_replaced() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(b"a\xffb"), "a\u{FFFD}b");
    }

    #[test]
    fn test_utf8_incomplete_at_finish() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(&"é".as_bytes()[..1]), "");
        assert_eq!(decoder.finish(), "\u{FFFD}");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_feed_bytes() {
        let mut splitter = BlockSplitter::new();
        let blocks: Vec<String> = splitter.feed_bytes(b"data: a\n\n").collect();
        assert_eq!(blocks, vec!["data: a"]);
    }
}
