//! Chat stream sessions.
//!
//! A [`StreamSession`] owns everything one streamed answer needs: the
//! decoder buffer, the handler and the completion guard. It is consumed by
//! [`StreamSession::drive`] or [`StreamSession::run`], so a session cannot
//! be reused for a second request.
//!
//! Whatever ends the session (end of body, transport error, failed request,
//! cancellation) the handler's `on_done` runs exactly once, before the
//! outcome is returned to the caller.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::StreamError;
use crate::models::MetaPayload;
use crate::sse::{classify, ChatEvent, EventDecoder, ParsedEvent, StreamHandler};
use crate::traits::{ByteStream, HttpError};

/// Pull-based view of a chat stream.
pub type ChatEventStream = Pin<Box<dyn Stream<Item = Result<ChatEvent, StreamError>> + Send>>;

/// Forwards notifications to a handler and delivers `on_done` at most once.
///
/// Dropping a guard that never completed delivers `on_done` then, unless
/// the thread is already unwinding from a panic.
pub struct CompletionGuard<'h, H: StreamHandler + ?Sized> {
    handler: &'h mut H,
    completed: bool,
}

impl<'h, H: StreamHandler + ?Sized> CompletionGuard<'h, H> {
    pub fn new(handler: &'h mut H) -> Self {
        Self {
            handler,
            completed: false,
        }
    }

    /// Deliver `on_done` unless already delivered. Returns true if this call
    /// delivered it.
    pub fn complete(&mut self) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        self.handler.on_done();
        true
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

impl<H: StreamHandler + ?Sized> StreamHandler for CompletionGuard<'_, H> {
    fn on_meta(&mut self, meta: MetaPayload) {
        self.handler.on_meta(meta);
    }

    fn on_token(&mut self, token: &str) {
        self.handler.on_token(token);
    }

    fn on_done(&mut self) {
        if !self.complete() {
            debug!("Ignoring repeated completion");
        }
    }
}

impl<H: StreamHandler + ?Sized> Drop for CompletionGuard<'_, H> {
    fn drop(&mut self) {
        if !self.completed && !std::thread::panicking() {
            self.complete();
        }
    }
}

/// Lifecycle of a session. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Requesting,
    Streaming,
    Completed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Requesting => "requesting",
            SessionState::Streaming => "streaming",
            SessionState::Completed => "completed",
        }
    }
}

/// What a finished session delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub tokens: usize,
    pub meta_events: usize,
    /// The server sent an explicit `done` event
    pub saw_done_event: bool,
    /// Body bytes read
    pub bytes: usize,
}

enum Read {
    Chunk(Option<Result<Bytes, HttpError>>),
    Cancelled,
}

async fn next_chunk(body: &mut ByteStream, cancel: Option<&CancellationToken>) -> Read {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Read::Cancelled,
            item = body.next() => Read::Chunk(item),
        },
        None => Read::Chunk(body.next().await),
    }
}

/// One streamed answer, from request to completion.
pub struct StreamSession<'h, H: StreamHandler + ?Sized> {
    guard: CompletionGuard<'h, H>,
    decoder: EventDecoder,
    state: SessionState,
    summary: SessionSummary,
}

impl<'h, H: StreamHandler + ?Sized> StreamSession<'h, H> {
    pub fn new(handler: &'h mut H) -> Self {
        Self {
            guard: CompletionGuard::new(handler),
            decoder: EventDecoder::new(),
            state: SessionState::Idle,
            summary: SessionSummary::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Await `request` for the response body, then stream it.
    ///
    /// A failed request completes the session straight away and returns
    /// the classified error.
    pub async fn drive<F>(
        mut self,
        request: F,
        cancel: Option<&CancellationToken>,
    ) -> Result<SessionSummary, StreamError>
    where
        F: Future<Output = Result<ByteStream, HttpError>>,
    {
        self.transition(SessionState::Requesting);

        let opened = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(StreamError::Cancelled),
                result = request => result.map_err(StreamError::from_request),
            },
            None => request.await.map_err(StreamError::from_request),
        };

        match opened {
            Ok(body) => self.run(body, cancel).await,
            Err(err) => self.finish(Err(err)),
        }
    }

    /// Stream an already opened body to the handler.
    pub async fn run(
        mut self,
        mut body: ByteStream,
        cancel: Option<&CancellationToken>,
    ) -> Result<SessionSummary, StreamError> {
        self.transition(SessionState::Streaming);
        let outcome = self.read_loop(&mut body, cancel).await;
        self.finish(outcome)
    }

    async fn read_loop(
        &mut self,
        body: &mut ByteStream,
        cancel: Option<&CancellationToken>,
    ) -> Result<(), StreamError> {
        loop {
            match next_chunk(body, cancel).await {
                Read::Chunk(Some(Ok(chunk))) => self.feed(&chunk),
                Read::Chunk(Some(Err(err))) => {
                    self.decoder.reset();
                    return Err(StreamError::Transport(err));
                }
                Read::Chunk(None) => {
                    self.flush();
                    return Ok(());
                }
                Read::Cancelled => {
                    self.decoder.reset();
                    return Err(StreamError::Cancelled);
                }
            }
        }
    }

    fn feed(&mut self, chunk: &[u8]) {
        let Self {
            guard,
            decoder,
            summary,
            ..
        } = self;
        summary.bytes += chunk.len();
        for event in decoder.decode_chunk(chunk) {
            Self::deliver(guard, summary, event);
        }
    }

    fn flush(&mut self) {
        let Self {
            guard,
            decoder,
            summary,
            ..
        } = self;
        for event in decoder.finish() {
            Self::deliver(guard, summary, event);
        }
    }

    fn deliver(guard: &mut CompletionGuard<'h, H>, summary: &mut SessionSummary, event: ParsedEvent) {
        let Some(notification) = classify(event) else {
            return;
        };

        match &notification {
            ChatEvent::Meta(MetaPayload::Structured(meta)) => {
                summary.meta_events += 1;
                debug!(conversation_id = ?meta.conversation_id, "Received meta");
            }
            ChatEvent::Meta(MetaPayload::Raw(_)) => summary.meta_events += 1,
            ChatEvent::Token(_) => summary.tokens += 1,
            ChatEvent::Done => {
                summary.saw_done_event = true;
                debug!("Received done event");
            }
        }

        notification.deliver(guard);
    }

    fn finish(mut self, outcome: Result<(), StreamError>) -> Result<SessionSummary, StreamError> {
        self.transition(SessionState::Completed);
        self.guard.complete();

        let summary = self.summary;
        match outcome {
            Ok(()) => {
                info!(
                    tokens = summary.tokens,
                    meta_events = summary.meta_events,
                    saw_done_event = summary.saw_done_event,
                    bytes = summary.bytes,
                    "Chat stream completed"
                );
                Ok(summary)
            }
            Err(err) => {
                warn!(code = err.error_code(), tokens = summary.tokens, "Chat stream ended: {}", err);
                Err(err)
            }
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = self.state.as_str(), to = next.as_str(), "Session state");
        self.state = next;
    }
}

struct PullState {
    body: ByteStream,
    decoder: EventDecoder,
    cancel: Option<CancellationToken>,
    queue: VecDeque<Result<ChatEvent, StreamError>>,
    saw_done_event: bool,
    finished: bool,
}

impl PullState {
    /// A server `done` is only recorded; the single `Done` goes out from
    /// [`close`](Self::close), after any error item.
    fn enqueue(&mut self, event: ParsedEvent) {
        match classify(event) {
            Some(ChatEvent::Done) => {
                if !self.saw_done_event {
                    debug!("Received done event");
                }
                self.saw_done_event = true;
            }
            Some(notification) => self.queue.push_back(Ok(notification)),
            None => {}
        }
    }

    fn close(&mut self, error: Option<StreamError>) {
        self.finished = true;
        if let Some(err) = error {
            warn!(
                code = err.error_code(),
                saw_done_event = self.saw_done_event,
                "Chat stream ended: {}",
                err
            );
            self.decoder.reset();
            self.queue.push_back(Err(err));
        }
        self.queue.push_back(Ok(ChatEvent::Done));
    }
}

/// Decode `body` as a stream of notifications.
///
/// Exactly one [`ChatEvent::Done`] is yielded and it is always the last
/// item, after any error. A server `done` event does not end the stream
/// early; the body is read to its end, so later tokens and a transport
/// error are still yielded before `Done`.
pub fn chat_events(body: ByteStream, cancel: Option<CancellationToken>) -> ChatEventStream {
    let state = PullState {
        body,
        decoder: EventDecoder::new(),
        cancel,
        queue: VecDeque::new(),
        saw_done_event: false,
        finished: false,
    };

    let events = stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.queue.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match next_chunk(&mut state.body, state.cancel.as_ref()).await {
                Read::Chunk(Some(Ok(chunk))) => {
                    let events: Vec<ParsedEvent> = state.decoder.decode_chunk(&chunk).collect();
                    events.into_iter().for_each(|event| state.enqueue(event));
                }
                Read::Chunk(Some(Err(err))) => state.close(Some(StreamError::Transport(err))),
                Read::Chunk(None) => {
                    let events: Vec<ParsedEvent> = state.decoder.finish().collect();
                    events.into_iter().for_each(|event| state.enqueue(event));
                    state.close(None);
                }
                Read::Cancelled => state.close(Some(StreamError::Cancelled)),
            }
        }
    });

    Box::pin(events)
}
