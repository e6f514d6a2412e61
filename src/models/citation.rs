//! Citation and meta payloads.
//!
//! A `meta` event carries the conversation id and the set of source chunks
//! the answer is grounded on. Each meta event replaces the previous citation
//! set; citations are never merged across events.

use serde::{Deserialize, Deserializer, Serialize};

/// A source chunk supporting part of an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Chunk identifier. The backend emits integers, older producers emit
    /// strings; both are accepted and kept as a string.
    #[serde(deserialize_with = "deserialize_chunk_id")]
    pub chunk_id: String,
    pub document_id: i64,
    pub chunk_index: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Title of the owning document (the stream producer calls this `title`)
    #[serde(default, alias = "title", skip_serializing_if = "Option::is_none")]
    pub doc_title: Option<String>,
}

impl Citation {
    /// Title to show for this citation, falling back to the document id
    pub fn label(&self) -> String {
        match &self.doc_title {
            Some(title) if !title.trim().is_empty() => title.clone(),
            _ => format!("document {}", self.document_id),
        }
    }
}

fn deserialize_chunk_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ChunkId {
        Text(String),
        Int(i64),
    }

    Ok(match ChunkId::deserialize(deserializer)? {
        ChunkId::Text(s) => s,
        ChunkId::Int(n) => n.to_string(),
    })
}

/// Structured payload of a `meta` event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<Citation>>,
}

/// What a `meta` handler receives: the decoded [`Meta`], or the raw data
/// string when it could not be decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaPayload {
    Structured(Meta),
    Raw(String),
}

impl MetaPayload {
    /// Decode a meta event's data. Never fails: anything that is not a
    /// JSON object of the [`Meta`] shape is kept as [`MetaPayload::Raw`].
    pub fn decode(data: &str) -> Self {
        match serde_json::from_str::<Meta>(data) {
            Ok(meta) => MetaPayload::Structured(meta),
            Err(e) => {
                tracing::warn!("meta payload is not valid JSON, forwarding raw string: {}", e);
                MetaPayload::Raw(data.to_string())
            }
        }
    }

    pub fn as_meta(&self) -> Option<&Meta> {
        match self {
            MetaPayload::Structured(meta) => Some(meta),
            MetaPayload::Raw(_) => None,
        }
    }

    pub fn conversation_id(&self) -> Option<i64> {
        self.as_meta().and_then(|m| m.conversation_id)
    }

    pub fn citations(&self) -> Option<&[Citation]> {
        self.as_meta().and_then(|m| m.citations.as_deref())
    }
}
