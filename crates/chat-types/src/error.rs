use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// Non-2xx status or transport failure on a request/response call
    #[error("Network error: {0}")]
    Network(String),

    /// A frame that could not be decoded
    #[error("Stream error: {0}")]
    Stream(String),

    /// An `error` field reported by the backend inside a valid frame
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Opening or reading the response stream failed
    #[error("Session error: {0}")]
    Session(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JS interop error: {0}")]
    JsInterop(String),

    #[error("Cancelled")]
    Cancelled,
}

impl From<serde_json::Error> for ChatError {
    fn from(e: serde_json::Error) -> Self {
        ChatError::Serialization(e.to_string())
    }
}
