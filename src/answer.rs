//! Answer assembly
//!
//! Tokens arrive without a reliable boundary space. The assembler joins
//! them with a single space unless the token already starts with
//! whitespace, and trims only for display.

use crate::models::{Citation, MetaPayload};
use crate::sse::StreamHandler;

/// Running answer text for one stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerAssembler {
    raw: String,
}

impl AnswerAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_token(&mut self, token: &str) {
        if !self.raw.is_empty() && !token.starts_with(char::is_whitespace) {
            self.raw.push(' ');
        }
        self.raw.push_str(token);
    }

    /// The accumulated text, untrimmed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The text to show.
    pub fn display(&self) -> &str {
        self.raw.trim()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn clear(&mut self) {
        self.raw.clear();
    }
}

impl<S: AsRef<str>> FromIterator<S> for AnswerAssembler {
    fn from_iter<I: IntoIterator<Item = S>>(tokens: I) -> Self {
        let mut answer = Self::new();
        tokens
            .into_iter()
            .for_each(|token| answer.push_token(token.as_ref()));
        answer
    }
}

impl StreamHandler for AnswerAssembler {
    fn on_token(&mut self, token: &str) {
        self.push_token(token);
    }
}

/// Client-side state of one question and its streamed answer.
///
/// Tracks the conversation to continue and the latest citation set. A new
/// citation set replaces the previous one. `busy` is cleared by completion.
#[derive(Debug, Clone, Default)]
pub struct ChatTranscript {
    answer: AnswerAssembler,
    conversation_id: Option<i64>,
    citations: Vec<Citation>,
    raw_meta: Option<String>,
    busy: bool,
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue an existing conversation.
    pub fn in_conversation(conversation_id: i64) -> Self {
        Self {
            conversation_id: Some(conversation_id),
            ..Self::default()
        }
    }

    /// Reset the answer for a new question, keeping the conversation.
    pub fn begin(&mut self) {
        self.answer.clear();
        self.raw_meta = None;
        self.busy = true;
    }

    pub fn answer(&self) -> &str {
        self.answer.display()
    }

    pub fn assembler(&self) -> &AnswerAssembler {
        &self.answer
    }

    pub fn conversation_id(&self) -> Option<i64> {
        self.conversation_id
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    /// Meta data that could not be decoded, if the last meta event was raw.
    pub fn raw_meta(&self) -> Option<&str> {
        self.raw_meta.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }
}

impl StreamHandler for ChatTranscript {
    fn on_meta(&mut self, meta: MetaPayload) {
        match meta {
            MetaPayload::Structured(meta) => {
                if let Some(id) = meta.conversation_id {
                    self.conversation_id = Some(id);
                }
                if let Some(citations) = meta.citations {
                    self.citations = citations;
                }
                self.raw_meta = None;
            }
            MetaPayload::Raw(raw) => self.raw_meta = Some(raw),
        }
    }

    fn on_token(&mut self, token: &str) {
        self.answer.push_token(token);
    }

    fn on_done(&mut self) {
        self.busy = false;
    }
}
