//! Chat stream decoding
//!
//! The backend answers `POST /v1/chat/stream` with a text body framed as
//! server-sent events:
//! - `event: <name>` names the block's event (`meta`, `done`, or absent)
//! - `data: <value>` contributes one payload line
//! - an empty line ends the block
//! - lines starting with `:` and unknown directives are ignored
//!
//! # Module structure
//! - `splitter` - UTF-8 chunk decoding and blank-line framing
//! - `parser` - block to [`ParsedEvent`] (pure)
//! - `events` - line, event and notification types
//! - `dispatch` - [`ParsedEvent`] to [`ChatEvent`] and [`StreamHandler`] callbacks
//! - `decoder` - [`EventDecoder`], the three stages above per response body

mod decoder;
mod dispatch;
mod events;
mod parser;
mod splitter;

pub use decoder::EventDecoder;
pub use dispatch::{classify, dispatch, FnHandlers, StreamHandler};
pub use events::{ChatEvent, ParsedEvent, SseLine, DEFAULT_EVENT_NAME, DONE_EVENT, META_EVENT};
pub use parser::{parse_block, parse_sse_line};
pub use splitter::{BlockSplitter, Blocks, Utf8ChunkDecoder};
