use serde::{Deserialize, Serialize};

/// Request body for both the streaming and non-streaming chat endpoints.
///
/// `conversation_id` is always serialized; `None` goes over the wire as
/// `null`, which the backend reads as "start a new conversation".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    /// The question to ask
    pub query: String,
    /// Conversation to continue, or `None` for a new one
    pub conversation_id: Option<i64>,
}

impl ChatRequest {
    /// Create a request that starts a new conversation
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            conversation_id: None,
        }
    }

    /// Create a request continuing an existing conversation
    pub fn in_conversation(query: impl Into<String>, conversation_id: i64) -> Self {
        Self {
            query: query.into(),
            conversation_id: Some(conversation_id),
        }
    }

    /// Set or clear the conversation id
    pub fn with_conversation(mut self, conversation_id: Option<i64>) -> Self {
        self.conversation_id = conversation_id;
        self
    }
}

/// Request body for `POST /v1/ingest/text`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestTextRequest {
    pub title: String,
    pub text: String,
}

impl IngestTextRequest {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}

/// Request body for `POST /v1/ingest/url`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestUrlRequest {
    pub title: String,
    pub url: String,
}

impl IngestUrlRequest {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}
