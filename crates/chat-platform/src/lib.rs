//! Browser adapters implementing the `chat-core` port traits.

pub mod http;

pub use http::HttpConversationClient;
