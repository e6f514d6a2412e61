use serde::{Deserialize, Serialize};

use super::citation::Citation;

/// A document known to the backend, as returned by the ingest and
/// document listing endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRow {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    pub source_type: String,
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub source_uri: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<i64>,
}

impl DocumentRow {
    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }
}

/// One stored chunk of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkOut {
    pub id: i64,
    #[serde(default)]
    pub document_id: Option<i64>,
    pub chunk_index: i64,
    pub text: String,
}

/// Progress of an ingestion job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestJob {
    #[serde(default)]
    pub document_id: Option<i64>,
    pub status: String,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl IngestJob {
    /// Whether the job has stopped making progress, successfully or not
    pub fn is_finished(&self) -> bool {
        matches!(self.status.as_str(), "ready" | "done" | "error" | "failed")
    }
}

/// Response of `DELETE /v1/documents/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub document_id: i64,
}

/// Response of the non-streaming `POST /v1/chat` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub conversation_id: i64,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// Response of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
