//! Wire types for the second-brain API.

mod citation;
mod document;
mod request;

pub use citation::{Citation, Meta, MetaPayload};
pub use document::{
    ChatResponse, ChunkOut, DeleteResponse, DocumentRow, HealthResponse, IngestJob,
};
pub use request::{ChatRequest, IngestTextRequest, IngestUrlRequest};
