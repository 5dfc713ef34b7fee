//! Transport client: soft-fail policy over a [`ConversationPort`].
//!
//! Request/response failures never reach the UI as errors: listing degrades
//! to an empty list and creation to `None`. Every degradation is logged.
//! Single attempt, no retries.

use std::rc::Rc;
use chat_types::{
    Result,
    conversation::Conversation,
    message::ChatStreamRequest,
};
use crate::ports::{ByteStream, ConversationPort};

/// Clone-cheap handle shared by sessions and the directory.
#[derive(Clone)]
pub struct TransportClient {
    port: Rc<dyn ConversationPort>,
}

impl TransportClient {
    pub fn new(port: Rc<dyn ConversationPort>) -> Self {
        Self { port }
    }

    pub async fn list_conversations(&self) -> Vec<Conversation> {
        match self.port.list_conversations().await {
            Ok(list) => list,
            Err(e) => {
                log::error!("[{}] failed to list conversations: {}", self.port.backend_name(), e);
                Vec::new()
            }
        }
    }

    pub async fn create_conversation(&self) -> Option<String> {
        match self.port.create_conversation().await {
            Ok(id) => {
                log::info!("Created conversation {}", id);
                Some(id)
            }
            Err(e) => {
                log::error!("[{}] failed to create conversation: {}", self.port.backend_name(), e);
                None
            }
        }
    }

    /// 404 is `Ok(None)`; other failures are returned so the caller can
    /// tell "gone" from "unreachable".
    pub async fn fetch_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        let result = self.port.fetch_conversation(id).await;
        if let Err(ref e) = result {
            log::error!("[{}] failed to fetch conversation {}: {}", self.port.backend_name(), id, e);
        }
        result
    }

    pub async fn open_stream(&self, req: &ChatStreamRequest) -> Result<ByteStream> {
        self.port.open_stream(req).await
    }
}
