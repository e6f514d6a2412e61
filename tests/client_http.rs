//! HTTP-level tests of `BrainClient` over reqwest against a local wiremock
//! server.

use std::time::Duration;

use brain_client::client::BrainClient;
use brain_client::config::ClientConfig;
use brain_client::error::{BrainError, ErrorCategory, StreamError};
use brain_client::models::{ChatRequest, IngestTextRequest, IngestUrlRequest, MetaPayload};
use brain_client::sse::ChatEvent;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SSE_BODY: &str = "event: meta\r\ndata: {\"conversation_id\":3,\"citations\":[]}\r\n\r\n\
data: Grounded\r\n\r\n\
data: answer\r\n\r\n\
event: done\r\ndata: {}\r\n\r\n";

fn client_for(server: &MockServer) -> BrainClient {
    BrainClient::new(
        ClientConfig::new()
            .with_base_url(server.uri())
            .with_request_timeout(Duration::from_secs(5)),
    )
}

fn sse(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/event-stream")
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})))
        .mount(&server)
        .await;

    let health = client_for(&server).health().await.unwrap();
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_chat_stream_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/stream"))
        .and(header("accept", "text/event-stream"))
        .and(body_json(serde_json::json!({"query": "notes?", "conversation_id": 3})))
        .respond_with(sse(SSE_BODY))
        .expect(1)
        .mount(&server)
        .await;

    let mut events: Vec<ChatEvent> = Vec::new();
    let summary = client_for(&server)
        .chat_stream(&ChatRequest::in_conversation("notes?", 3), &mut events, None)
        .await
        .unwrap();

    assert_eq!(summary.tokens, 2);
    assert!(summary.saw_done_event);
    assert_eq!(events.len(), 4);
    assert_eq!(
        events[0],
        ChatEvent::Meta(MetaPayload::decode(r#"{"conversation_id":3,"citations":[]}"#))
    );
    assert_eq!(events[1], ChatEvent::Token("Grounded".to_string()));
    assert_eq!(events[3], ChatEvent::Done);
}

#[tokio::test]
async fn test_chat_stream_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/stream"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model warming up"))
        .mount(&server)
        .await;

    let mut events: Vec<ChatEvent> = Vec::new();
    let err = client_for(&server)
        .chat_stream(&ChatRequest::new("q"), &mut events, None)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        StreamError::Request {
            status: 503,
            message: "model warming up".to_string()
        }
    );
    assert_eq!(err.category(), ErrorCategory::Server);
    assert_eq!(events, vec![ChatEvent::Done]);
}

#[tokio::test]
async fn test_chat_stream_without_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/stream"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let mut events: Vec<ChatEvent> = Vec::new();
    let err = client_for(&server)
        .chat_stream(&ChatRequest::new("q"), &mut events, None)
        .await
        .unwrap_err();

    assert_eq!(err, StreamError::MissingBody);
    assert_eq!(events, vec![ChatEvent::Done]);
}

#[tokio::test]
async fn test_chat_stream_cancelled_while_waiting() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/stream"))
        .respond_with(sse(SSE_BODY).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let mut events: Vec<ChatEvent> = Vec::new();
    let err = client_for(&server)
        .chat_stream(&ChatRequest::new("q"), &mut events, Some(&cancel))
        .await
        .unwrap_err();

    assert_eq!(err, StreamError::Cancelled);
    assert_eq!(events, vec![ChatEvent::Done]);
}

#[tokio::test]
async fn test_connection_refused() {
    let client = BrainClient::new(ClientConfig::new().with_base_url("http://127.0.0.1:1"));

    let mut events: Vec<ChatEvent> = Vec::new();
    let err = client
        .chat_stream(&ChatRequest::new("q"), &mut events, None)
        .await
        .unwrap_err();

    assert!(err.is_request_error());
    assert_eq!(err.category(), ErrorCategory::Network);
    assert_eq!(events, vec![ChatEvent::Done]);
}

#[tokio::test]
async fn test_chat_events_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/stream"))
        .respond_with(sse(SSE_BODY))
        .mount(&server)
        .await;

    let events: Vec<ChatEvent> = client_for(&server)
        .chat_events(&ChatRequest::new("q"), None)
        .await
        .unwrap()
        .map(|item| item.unwrap())
        .collect()
        .await;

    let tokens: Vec<&ChatEvent> = events.iter().filter(|e| e.kind() == "token").collect();
    assert_eq!(tokens.len(), 2);
    assert_eq!(events.last(), Some(&ChatEvent::Done));
    assert_eq!(events.iter().filter(|e| e.is_done()).count(), 1);
}

#[tokio::test]
async fn test_non_streaming_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "answer": "From your notes: ...",
            "conversation_id": 5,
            "citations": [{
                "chunk_id": 41,
                "document_id": 2,
                "chunk_index": 0,
                "text": "meeting notes",
                "score": null,
                "title": "Standup"
            }]
        })))
        .mount(&server)
        .await;

    let response = client_for(&server).chat(&ChatRequest::new("q")).await.unwrap();
    assert_eq!(response.conversation_id, 5);
    assert_eq!(response.citations[0].chunk_id, "41");
    assert_eq!(response.citations[0].score, None);
    assert_eq!(response.citations[0].doc_title.as_deref(), Some("Standup"));
}

#[tokio::test]
async fn test_ingest_text_and_job() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/ingest/text"))
        .and(body_json(serde_json::json!({"title": "Todo", "text": "buy milk"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 8,
            "title": "Todo",
            "source_type": "text",
            "status": "queued"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/ingest/jobs/8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "document_id": 8,
            "status": "running",
            "stage": "embedding",
            "error": null
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let doc = client
        .ingest_text(&IngestTextRequest::new("Todo", "buy milk"))
        .await
        .unwrap();
    assert_eq!(doc.id, 8);
    assert!(!doc.is_ready());

    let job = client.job_status(doc.id).await.unwrap();
    assert_eq!(job.document_id, Some(8));
    assert_eq!(job.stage.as_deref(), Some("embedding"));
    assert!(!job.is_finished());
}

#[tokio::test]
async fn test_ingest_url_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/ingest/url"))
        .respond_with(ResponseTemplate::new(400).set_body_string("unsupported scheme"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .ingest_url(&IngestUrlRequest::new("x", "ftp://example.com"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.category(), ErrorCategory::Client);
    assert!(!err.is_retryable());
    assert!(matches!(err, BrainError::Server { ref message, .. } if message == "unsupported scheme"));
}

#[tokio::test]
async fn test_documents_chunks_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 1, "title": "Standup", "source_type": "text", "status": "ready"},
            {"id": 2, "title": null, "source_type": "url", "status": "error", "error": "timeout",
             "source_uri": "https://example.com"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/documents/1/chunks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 10, "document_id": 1, "chunk_index": 0, "text": "first"},
            {"id": 11, "document_id": 1, "chunk_index": 1, "text": "second"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/documents/2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"deleted": true, "document_id": 2})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let docs = client.list_documents().await.unwrap();
    assert_eq!(docs.len(), 2);
    assert!(docs[0].is_ready());
    assert_eq!(docs[1].error.as_deref(), Some("timeout"));

    let chunks = client.document_chunks(1).await.unwrap();
    assert_eq!(chunks[1].text, "second");

    let deleted = client.delete_document(2).await.unwrap();
    assert!(deleted.deleted);
}
