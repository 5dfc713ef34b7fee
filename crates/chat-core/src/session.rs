//! Conversation session: owns one conversation's transcript and drives at
//! most one response stream at a time.
//!
//! Lifecycle of a submit:
//! 1. Append the user message (optimistic, before the server sees it)
//! 2. Obtain a conversation id if the session is unbound
//! 3. Open the stream and fold every delta into the partial buffer
//! 4. On `[DONE]` or end of input, append one assistant message and
//!    invalidate the directory
//!
//! Any failure on the way appends one fixed system message instead.
//! Borrows of the shared state are never held across an `.await`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use futures::StreamExt;
use chat_types::{
    ChatError,
    config::ClientConfig,
    conversation::Conversation,
    event::{SessionEvent, StreamEvent},
    message::{ChatStreamRequest, Message},
};
use crate::decoder::decode_stream;
use crate::directory::DirectoryListener;
use crate::events::{self, EventFeed, EventSink};
use crate::transport::TransportClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingConversationId,
    Streaming,
    Finalizing,
    ErrorTerminal,
}

impl SessionState {
    pub fn is_busy(&self) -> bool {
        !matches!(self, SessionState::Idle)
    }
}

/// What became of one `submit` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty input, or the session already had a turn in flight
    Rejected,
    /// An assistant message was appended
    Finalized,
    /// A system error message was appended
    Failed,
}

/// Immutable copy of a session's observable state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub conversation_id: Option<String>,
    /// Finalized transcript
    pub messages: Vec<Message>,
    /// Assistant text accumulated so far; `Some` only while streaming
    pub partial: Option<String>,
}

impl SessionSnapshot {
    /// Finalized messages followed by the in-progress assistant message,
    /// if any text has arrived yet.
    pub fn live_messages(&self) -> Vec<Message> {
        let mut messages = self.messages.clone();
        if let Some(partial) = self.partial.as_ref().filter(|p| !p.is_empty()) {
            messages.push(Message::assistant(partial.clone()));
        }
        messages
    }
}

/// Cooperative cancellation, checked between chunk reads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }

    fn reset(&self) {
        self.0.set(false);
    }
}

struct SessionInner {
    state: SessionState,
    conversation_id: Option<String>,
    messages: Vec<Message>,
    partial: Option<String>,
}

/// Clone-cheap handle; clones share the same transcript.
#[derive(Clone)]
pub struct ConversationSession {
    inner: Rc<RefCell<SessionInner>>,
    config: Rc<ClientConfig>,
    transport: TransportClient,
    events: EventSink,
    listeners: Rc<RefCell<Vec<Rc<dyn DirectoryListener>>>>,
    cancel: CancelToken,
}

impl ConversationSession {
    /// A fresh, unbound session: the first submit creates the conversation.
    /// The returned feed carries this session's events and no one else's.
    pub fn new(config: ClientConfig, transport: TransportClient) -> (Self, EventFeed) {
        let (sink, feed) = events::channel();
        let session = Self {
            inner: Rc::new(RefCell::new(SessionInner {
                state: SessionState::Idle,
                conversation_id: None,
                messages: Vec::new(),
                partial: None,
            })),
            config: Rc::new(config),
            transport,
            events: sink,
            listeners: Rc::new(RefCell::new(Vec::new())),
            cancel: CancelToken::default(),
        };
        (session, feed)
    }

    /// Register a listener notified each time a turn completes.
    pub fn subscribe(&self, listener: Rc<dyn DirectoryListener>) {
        self.listeners.borrow_mut().push(listener);
    }

    pub fn state(&self) -> SessionState {
        self.inner.borrow().state
    }

    pub fn conversation_id(&self) -> Option<String> {
        self.inner.borrow().conversation_id.clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.inner.borrow().messages.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.borrow();
        SessionSnapshot {
            state: inner.state,
            conversation_id: inner.conversation_id.clone(),
            messages: inner.messages.clone(),
            partial: inner.partial.clone(),
        }
    }

    pub fn live_messages(&self) -> Vec<Message> {
        self.snapshot().live_messages()
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Stop reading the active stream at the next chunk boundary. What has
    /// arrived so far is finalized as the assistant message.
    pub fn cancel(&self) {
        if self.state() == SessionState::Streaming {
            log::info!("Cancelling active stream");
            self.cancel.cancel();
        }
    }

    /// Seed an idle session with a conversation fetched from the backend.
    /// Returns false (and changes nothing) while a turn is in flight.
    pub fn load(&self, conversation: Conversation) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.state != SessionState::Idle {
            log::debug!("Load ignored: session is {:?}", inner.state);
            return false;
        }
        log::info!(
            "Loaded conversation {} ({} messages)",
            conversation.id,
            conversation.messages.len()
        );
        inner.conversation_id = Some(conversation.id);
        inner.messages = conversation.messages;
        inner.partial = None;
        true
    }

    /// Run one full turn. A no-op while another turn is in flight.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SubmitOutcome::Rejected;
        }

        let bound_id = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != SessionState::Idle {
                log::debug!("Submit ignored: session is {:?}", inner.state);
                return SubmitOutcome::Rejected;
            }
            inner.messages.push(Message::user(text));
            inner.partial = None;
            inner.state = if inner.conversation_id.is_some() {
                SessionState::Streaming
            } else {
                SessionState::AwaitingConversationId
            };
            inner.conversation_id.clone()
        };
        self.cancel.reset();
        self.events.emit(SessionEvent::TurnStarted {
            user_text: text.to_string(),
        });

        let conversation_id = match bound_id {
            Some(id) => id,
            None => match self.transport.create_conversation().await {
                Some(id) => {
                    {
                        let mut inner = self.inner.borrow_mut();
                        inner.conversation_id = Some(id.clone());
                        inner.state = SessionState::Streaming;
                    }
                    self.events.emit(SessionEvent::ConversationAssigned {
                        conversation_id: id.clone(),
                    });
                    id
                }
                None => {
                    return self.fail(ChatError::Network(
                        "failed to create conversation".to_string(),
                    ));
                }
            },
        };

        self.inner.borrow_mut().partial = Some(String::new());
        let request = ChatStreamRequest::new(&conversation_id, text);
        let bytes = match self.transport.open_stream(&request).await {
            Ok(bytes) => bytes,
            Err(e) => return self.fail(ChatError::Session(e.to_string())),
        };

        let mut events = decode_stream(bytes);
        loop {
            if self.cancel.is_cancelled() {
                log::info!("Stream for {}: {}", conversation_id, ChatError::Cancelled);
                break;
            }
            match events.next().await {
                Some(Ok(StreamEvent::ContentDelta(delta))) => {
                    let text = {
                        let mut inner = self.inner.borrow_mut();
                        let partial = inner.partial.get_or_insert_with(String::new);
                        partial.push_str(&delta);
                        partial.clone()
                    };
                    self.events.emit(SessionEvent::PartialUpdated { text });
                }
                Some(Ok(StreamEvent::Error(message))) => {
                    log::warn!("{}", ChatError::Upstream(message.clone()));
                    self.events.emit(SessionEvent::UpstreamError { message });
                }
                Some(Ok(StreamEvent::Done)) | None => break,
                Some(Err(e)) => return self.fail(ChatError::Session(e.to_string())),
            }
        }

        self.finalize()
    }

    fn finalize(&self) -> SubmitOutcome {
        let message = {
            let mut inner = self.inner.borrow_mut();
            inner.state = SessionState::Finalizing;
            let content = inner.partial.take().unwrap_or_default();
            let message = Message::assistant(content);
            inner.messages.push(message.clone());
            message
        };
        self.events.emit(SessionEvent::MessageFinalized { message });

        let listeners = self.listeners.borrow().clone();
        for listener in &listeners {
            listener.directory_invalidated();
        }

        self.inner.borrow_mut().state = SessionState::Idle;
        self.events.emit(SessionEvent::TurnEnded);
        SubmitOutcome::Finalized
    }

    fn fail(&self, err: ChatError) -> SubmitOutcome {
        log::error!("Error sending message: {}", err);
        let message = Message::system(self.config.error_message.clone());
        {
            let mut inner = self.inner.borrow_mut();
            inner.state = SessionState::ErrorTerminal;
            inner.partial = None;
            inner.messages.push(message.clone());
        }
        self.events.emit(SessionEvent::MessageFinalized { message });

        self.inner.borrow_mut().state = SessionState::Idle;
        self.events.emit(SessionEvent::TurnEnded);
        SubmitOutcome::Failed
    }
}
