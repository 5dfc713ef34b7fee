//! Port traits: the hexagonal architecture boundary.
//!
//! These traits are defined here in `chat-core` (pure Rust).
//! The browser implementation lives in `chat-platform`.
//! The core never imports platform code; it only depends on these traits.

use std::pin::Pin;
use async_trait::async_trait;
use futures::Stream;
use chat_types::{
    Result,
    conversation::Conversation,
    message::ChatStreamRequest,
};

/// Raw response body of the chat endpoint, chunk by chunk.
/// Chunk boundaries are arbitrary: they may split frames and characters.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>>>>;

// ─── Conversation backend port ───────────────────────────────

#[async_trait(?Send)]
pub trait ConversationPort {
    /// `GET /conversation/all`
    async fn list_conversations(&self) -> Result<Vec<Conversation>>;

    /// `POST /chat/new_conversation`: returns the server-assigned id
    async fn create_conversation(&self) -> Result<String>;

    /// `GET /conversation/{id}`: `Ok(None)` on 404
    async fn fetch_conversation(&self, id: &str) -> Result<Option<Conversation>>;

    /// `POST /chat/conversation`: resolves once response headers arrive
    async fn open_stream(&self, req: &ChatStreamRequest) -> Result<ByteStream>;

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}
