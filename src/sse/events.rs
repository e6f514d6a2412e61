//! SSE line, block and event types

use crate::models::MetaPayload;

/// Event name used when a block has no `event:` line
pub const DEFAULT_EVENT_NAME: &str = "message";
/// Event carrying conversation id and citations
pub const META_EVENT: &str = "meta";
/// Terminal marker event
pub const DONE_EVENT: &str = "done";

/// One classified line of a block
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// `event: <name>`, value trimmed
    Event(String),
    /// `data: <value>`, one leading space after the colon removed
    Data(String),
    /// Empty line
    Empty,
    /// Line starting with `:`
    Comment(String),
    /// Any other directive (`id:`, `retry:`, garbage), ignored by the parser
    Other(String),
}

/// A block decoded into its event name and joined data payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEvent {
    pub name: String,
    /// Data lines joined with `\n`; empty when the block had none
    pub data: String,
}

impl ParsedEvent {
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// An unnamed event carrying `data`
    pub fn message(data: impl Into<String>) -> Self {
        Self::new(DEFAULT_EVENT_NAME, data)
    }
}

/// The three notifications a chat stream produces.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Meta(MetaPayload),
    /// One incremental answer fragment, exactly as sent
    Token(String),
    Done,
}

impl ChatEvent {
    /// Returns the event kind name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ChatEvent::Meta(_) => META_EVENT,
            ChatEvent::Token(_) => "token",
            ChatEvent::Done => DONE_EVENT,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, ChatEvent::Done)
    }
}
