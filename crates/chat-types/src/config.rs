use serde::{Deserialize, Serialize};
use crate::error::ChatError;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_LABEL_MAX_CHARS: usize = 25;
pub const DEFAULT_PLACEHOLDER_LABEL: &str = "New conversation";
pub const DEFAULT_ERROR_MESSAGE: &str = "Error sending message. Please try again.";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash
    pub api_base: String,
    /// Sidebar labels longer than this many characters are truncated
    pub label_max_chars: usize,
    /// Label for conversations with neither alias nor messages
    pub placeholder_label: String,
    /// System message appended when a turn fails
    pub error_message: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            label_max_chars: DEFAULT_LABEL_MAX_CHARS,
            placeholder_label: DEFAULT_PLACEHOLDER_LABEL.to_string(),
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }
}

impl ClientConfig {
    /// Replace the backend base URL. Trailing slashes are dropped; only
    /// `http://` and `https://` URLs are accepted.
    pub fn with_api_base(mut self, api_base: &str) -> Result<Self, ChatError> {
        let trimmed = api_base.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ChatError::Config(format!(
                "api_base must be an http(s) URL, got {:?}",
                api_base
            )));
        }
        self.api_base = trimmed.to_string();
        Ok(self)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}
