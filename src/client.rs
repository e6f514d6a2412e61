//! Second-brain API client.
//!
//! Buffered endpoints return typed models; a non-2xx status becomes
//! [`BrainError::Server`] carrying the response body text. The streaming
//! chat endpoint is decoded by a [`StreamSession`].

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::error::{BrainError, BrainResult, StreamError};
use crate::models::{
    ChatRequest, ChatResponse, ChunkOut, DeleteResponse, DocumentRow, HealthResponse,
    IngestJob, IngestTextRequest, IngestUrlRequest,
};
use crate::session::{chat_events, ChatEventStream, SessionSummary, StreamSession};
use crate::sse::StreamHandler;
use crate::traits::{Headers, HttpClient, HttpError, Response};

/// Client for the second-brain backend.
///
/// Cheap to clone; clones share the underlying HTTP client.
#[derive(Clone)]
pub struct BrainClient {
    config: ClientConfig,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for BrainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrainClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BrainClient {
    /// Client over `reqwest` with the configured request timeout.
    pub fn new(config: ClientConfig) -> Self {
        let http = ReqwestHttpClient::new().with_timeout(config.request_timeout);
        Self::with_http_client(config, Arc::new(http))
    }

    /// Client over any transport, e.g. a mock in tests.
    pub fn with_http_client(config: ClientConfig, http: Arc<dyn HttpClient>) -> Self {
        Self { config, http }
    }

    pub fn from_env() -> BrainResult<Self> {
        Ok(Self::new(ClientConfig::from_env()?))
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn json_headers() -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers
    }

    fn decode<T: DeserializeOwned>(response: Response) -> BrainResult<T> {
        if !response.is_success() {
            return Err(BrainError::Server {
                status: response.status,
                message: response.text(),
            });
        }
        Ok(response.json()?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> BrainResult<T> {
        let url = self.config.url(path);
        debug!(%url, "GET");
        let response = self.http.get(&url, &Headers::new()).await?;
        Self::decode(response)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> BrainResult<T> {
        let url = self.config.url(path);
        let body = serde_json::to_string(body)?;
        debug!(%url, "POST");
        let response = self.http.post(&url, &body, &Self::json_headers()).await?;
        Self::decode(response)
    }

    /// `GET /health`
    pub async fn health(&self) -> BrainResult<HealthResponse> {
        self.get_json("/health").await
    }

    /// Stream an answer to `handler`.
    ///
    /// `handler.on_done` runs exactly once whatever happens, including when
    /// the request itself fails, and before this returns.
    pub async fn chat_stream<H>(
        &self,
        request: &ChatRequest,
        handler: &mut H,
        cancel: Option<&CancellationToken>,
    ) -> Result<SessionSummary, StreamError>
    where
        H: StreamHandler + ?Sized,
    {
        let url = self.config.url("/v1/chat/stream");
        info!(conversation_id = ?request.conversation_id, "Starting chat stream");

        let body = serde_json::to_string(request);
        let headers = Self::json_headers();
        let open = async {
            let body = body.map_err(|e| HttpError::Other(e.to_string()))?;
            self.http.post_stream(&url, &body, &headers).await
        };

        StreamSession::new(handler).drive(open, cancel).await
    }

    /// Stream an answer as [`ChatEvent`](crate::sse::ChatEvent)s.
    ///
    /// A failed request is returned here, before any event; once the stream
    /// is handed out it ends with exactly one `Done`.
    pub async fn chat_events(
        &self,
        request: &ChatRequest,
        cancel: Option<CancellationToken>,
    ) -> Result<ChatEventStream, StreamError> {
        let url = self.config.url("/v1/chat/stream");
        let body = serde_json::to_string(request)
            .map_err(|e| StreamError::Connect(HttpError::Other(e.to_string())))?;

        let headers = Self::json_headers();
        let open = self.http.post_stream(&url, &body, &headers);
        let opened = match cancel.as_ref() {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(StreamError::Cancelled),
                result = open => result.map_err(StreamError::from_request),
            },
            None => open.await.map_err(StreamError::from_request),
        };

        Ok(chat_events(opened?, cancel))
    }

    /// `POST /v1/chat`, the non-streaming answer.
    pub async fn chat(&self, request: &ChatRequest) -> BrainResult<ChatResponse> {
        self.post_json("/v1/chat", request).await
    }

    /// `POST /v1/ingest/text`
    pub async fn ingest_text(&self, request: &IngestTextRequest) -> BrainResult<DocumentRow> {
        self.post_json("/v1/ingest/text", request).await
    }

    /// `POST /v1/ingest/url`
    pub async fn ingest_url(&self, request: &IngestUrlRequest) -> BrainResult<DocumentRow> {
        self.post_json("/v1/ingest/url", request).await
    }

    /// `GET /v1/ingest/jobs/{document_id}`
    pub async fn job_status(&self, document_id: i64) -> BrainResult<IngestJob> {
        self.get_json(&format!("/v1/ingest/jobs/{}", document_id)).await
    }

    /// `GET /v1/documents`
    pub async fn list_documents(&self) -> BrainResult<Vec<DocumentRow>> {
        self.get_json("/v1/documents").await
    }

    /// `GET /v1/documents/{document_id}/chunks`
    pub async fn document_chunks(&self, document_id: i64) -> BrainResult<Vec<ChunkOut>> {
        self.get_json(&format!("/v1/documents/{}/chunks", document_id)).await
    }

    /// `DELETE /v1/documents/{document_id}`
    pub async fn delete_document(&self, document_id: i64) -> BrainResult<DeleteResponse> {
        let url = self.config.url(&format!("/v1/documents/{}", document_id));
        debug!(%url, "DELETE");
        let response = self.http.delete(&url, &Headers::new()).await?;
        Self::decode(response)
    }
}
