//! UI-level state that drives rendering.
//! A read-only projection of the active session and the directory: the
//! transcript is copied from the session snapshot every frame, and session
//! events only move the status line.

use chat_core::session::SessionSnapshot;
use chat_types::conversation::DirectorySummary;
use chat_types::event::SessionEvent;
use chat_types::message::{Message, Role};

const READY: &str = "Ready";

/// State visible to UI panels
pub struct UiState {
    /// Live transcript: finalized messages plus the reply being streamed
    pub messages: Vec<ChatEntry>,
    /// The last entry is still receiving text
    pub streaming: bool,
    /// Input field content
    pub input_text: String,
    /// Status line text
    pub status_text: String,
    /// A turn is in flight
    pub busy: bool,
    /// Id of the conversation shown in the chat panel
    pub conversation_id: Option<String>,
    /// Sidebar rows, most recent first
    pub directory: Vec<DirectorySummary>,
    pub directory_loaded: bool,
}

/// A chat entry for display
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEntry {
    pub role: Role,
    pub content: String,
}

impl From<Message> for ChatEntry {
    fn from(message: Message) -> Self {
        Self {
            role: message.role,
            content: message.content,
        }
    }
}

impl UiState {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            streaming: false,
            input_text: String::new(),
            status_text: READY.to_string(),
            busy: false,
            conversation_id: None,
            directory: Vec::new(),
            directory_loaded: false,
        }
    }

    /// Copy the session's live view. Called once per frame after events.
    pub fn sync_session(&mut self, snapshot: &SessionSnapshot) {
        self.messages = snapshot
            .live_messages()
            .into_iter()
            .map(ChatEntry::from)
            .collect();
        self.streaming = snapshot.partial.as_deref().is_some_and(|p| !p.is_empty());
        self.busy = snapshot.state.is_busy();
        self.conversation_id = snapshot.conversation_id.clone();
        if !self.busy {
            self.status_text = READY.to_string();
        }
    }

    /// Update the status line from the active session's events.
    pub fn process_events(&mut self, events: Vec<SessionEvent>) {
        for event in events {
            match event {
                SessionEvent::TurnStarted { .. } => {
                    self.status_text = "Thinking...".to_string();
                }
                SessionEvent::PartialUpdated { .. } => {
                    self.status_text = "Streaming...".to_string();
                }
                SessionEvent::UpstreamError { message } => {
                    self.status_text = format!("Upstream error: {}", message);
                }
                SessionEvent::TurnEnded => {
                    self.status_text = READY.to_string();
                }
                SessionEvent::ConversationAssigned { .. }
                | SessionEvent::MessageFinalized { .. } => {}
            }
        }
    }

    pub fn set_directory(&mut self, entries: Vec<DirectorySummary>, loaded: bool) {
        self.directory = entries;
        self.directory_loaded = loaded;
    }

    /// Nothing received yet for the turn in flight.
    pub fn is_thinking(&self) -> bool {
        self.busy && !self.streaming
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}
