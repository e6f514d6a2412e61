//! Event classification and handler dispatch.

use tracing::debug;

use super::events::{ChatEvent, ParsedEvent, DONE_EVENT, META_EVENT};
use crate::models::MetaPayload;

/// Receiver of the three chat stream notifications.
///
/// All methods default to no-ops so a handler only implements what it
/// cares about. Completion is delivered at most once per session when the
/// handler is driven through a [`StreamSession`](crate::session::StreamSession).
pub trait StreamHandler {
    fn on_meta(&mut self, _meta: MetaPayload) {}

    fn on_token(&mut self, _token: &str) {}

    fn on_done(&mut self) {}
}

impl<H: StreamHandler + ?Sized> StreamHandler for &mut H {
    fn on_meta(&mut self, meta: MetaPayload) {
        (**self).on_meta(meta)
    }

    fn on_token(&mut self, token: &str) {
        (**self).on_token(token)
    }

    fn on_done(&mut self) {
        (**self).on_done()
    }
}

impl<H: StreamHandler + ?Sized> StreamHandler for Box<H> {
    fn on_meta(&mut self, meta: MetaPayload) {
        (**self).on_meta(meta)
    }

    fn on_token(&mut self, token: &str) {
        (**self).on_token(token)
    }

    fn on_done(&mut self) {
        (**self).on_done()
    }
}

/// Records every notification in order.
impl StreamHandler for Vec<ChatEvent> {
    fn on_meta(&mut self, meta: MetaPayload) {
        self.push(ChatEvent::Meta(meta));
    }

    fn on_token(&mut self, token: &str) {
        self.push(ChatEvent::Token(token.to_string()));
    }

    fn on_done(&mut self) {
        self.push(ChatEvent::Done);
    }
}

type MetaFn = Box<dyn FnMut(MetaPayload) + Send>;
type TokenFn = Box<dyn FnMut(&str) + Send>;
type DoneFn = Box<dyn FnMut() + Send>;

/// Closure-based handler set. Unset callbacks ignore their notification.
#[derive(Default)]
pub struct FnHandlers {
    meta: Option<MetaFn>,
    token: Option<TokenFn>,
    done: Option<DoneFn>,
}

impl FnHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_meta(mut self, f: impl FnMut(MetaPayload) + Send + 'static) -> Self {
        self.meta = Some(Box::new(f));
        self
    }

    pub fn with_token(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.token = Some(Box::new(f));
        self
    }

    pub fn with_done(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.done = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for FnHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandlers")
            .field("meta", &self.meta.is_some())
            .field("token", &self.token.is_some())
            .field("done", &self.done.is_some())
            .finish()
    }
}

impl StreamHandler for FnHandlers {
    fn on_meta(&mut self, meta: MetaPayload) {
        if let Some(f) = self.meta.as_mut() {
            f(meta);
        }
    }

    fn on_token(&mut self, token: &str) {
        if let Some(f) = self.token.as_mut() {
            f(token);
        }
    }

    fn on_done(&mut self) {
        if let Some(f) = self.done.as_mut() {
            f();
        }
    }
}

/// Map a parsed event to its notification.
///
/// `meta` never fails: undecodable data is carried raw. Unrecognized names,
/// `message` included, are tokens; those with empty data yield `None`.
pub fn classify(event: ParsedEvent) -> Option<ChatEvent> {
    match event.name.as_str() {
        META_EVENT => Some(ChatEvent::Meta(MetaPayload::decode(&event.data))),
        DONE_EVENT => Some(ChatEvent::Done),
        _ if event.data.is_empty() => None,
        _ => Some(ChatEvent::Token(event.data)),
    }
}

impl ChatEvent {
    /// Invoke the matching handler method.
    pub fn deliver<H: StreamHandler + ?Sized>(self, handler: &mut H) {
        match self {
            ChatEvent::Meta(meta) => handler.on_meta(meta),
            ChatEvent::Token(token) => handler.on_token(&token),
            ChatEvent::Done => handler.on_done(),
        }
    }
}

/// Classify `event` and hand it to `handler`. Returns the kind delivered,
/// if any.
pub fn dispatch<H: StreamHandler + ?Sized>(
    event: ParsedEvent,
    handler: &mut H,
) -> Option<&'static str> {
    let notification = classify(event)?;
    let kind = notification.kind();
    debug!(kind, "Dispatching stream event");
    notification.deliver(handler);
    Some(kind)
}
