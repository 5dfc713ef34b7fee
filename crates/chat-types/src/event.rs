use serde::{Deserialize, Serialize};
use crate::message::Message;

/// One decoded unit of a chat response stream. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamEvent {
    /// Incremental assistant output carried by one `data:` frame
    ContentDelta(String),
    /// An `error` field reported by the backend; the stream keeps going
    Error(String),
    /// The `[DONE]` sentinel
    Done,
}

/// Events published by a conversation session.
/// The UI and the navigation layer subscribe to these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A submit was accepted and the user message appended
    TurnStarted { user_text: String },

    /// The session was bound to a freshly created conversation
    ConversationAssigned { conversation_id: String },

    /// The in-progress assistant text after one more delta
    PartialUpdated { text: String },

    /// The backend reported an error inside a frame
    UpstreamError { message: String },

    /// A message was appended to the transcript (assistant or system)
    MessageFinalized { message: Message },

    /// The session is back to idle
    TurnEnded,
}
