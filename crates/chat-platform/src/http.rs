//! HTTP adapter for the conversation backend.
//!
//! Uses browser `fetch()` via gloo-net. The chat endpoint's body is read
//! through the response's `ReadableStream`, one `Uint8Array` per chunk.

use async_trait::async_trait;
use futures::stream;
use gloo_net::http::{Request, Response};
use js_sys::{Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::ReadableStreamDefaultReader;

use chat_core::ports::{ByteStream, ConversationPort};
use chat_types::{
    ChatError, Result,
    config::ClientConfig,
    conversation::{Conversation, NewConversation},
    message::ChatStreamRequest,
};

pub const LIST_PATH: &str = "/conversation/all";
pub const CREATE_PATH: &str = "/chat/new_conversation";
pub const STREAM_PATH: &str = "/chat/conversation";

/// Backend reached over HTTP at `config.api_base`.
pub struct HttpConversationClient {
    config: ClientConfig,
}

impl HttpConversationClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn list_url(&self) -> String {
        self.config.endpoint(LIST_PATH)
    }

    pub fn create_url(&self) -> String {
        self.config.endpoint(CREATE_PATH)
    }

    pub fn conversation_url(&self, id: &str) -> String {
        self.config.endpoint(&format!("/conversation/{}", id))
    }

    pub fn stream_url(&self) -> String {
        self.config.endpoint(STREAM_PATH)
    }
}

fn network(e: impl std::fmt::Display) -> ChatError {
    ChatError::Network(e.to_string())
}

fn js_error(e: JsValue) -> ChatError {
    ChatError::JsInterop(format!("{:?}", e))
}

fn ensure_ok(response: &Response) -> Result<()> {
    if response.ok() {
        Ok(())
    } else {
        Err(ChatError::Network(format!("HTTP {}", response.status())))
    }
}

#[async_trait(?Send)]
impl ConversationPort for HttpConversationClient {
    async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        let response = Request::get(&self.list_url())
            .send()
            .await
            .map_err(network)?;
        ensure_ok(&response)?;

        response
            .json::<Vec<Conversation>>()
            .await
            .map_err(|e| ChatError::Serialization(e.to_string()))
    }

    async fn create_conversation(&self) -> Result<String> {
        let response = Request::post(&self.create_url())
            .send()
            .await
            .map_err(network)?;
        ensure_ok(&response)?;

        let created: NewConversation = response
            .json()
            .await
            .map_err(|e| ChatError::Serialization(e.to_string()))?;
        Ok(created.conversation_id)
    }

    async fn fetch_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        let response = Request::get(&self.conversation_url(id))
            .send()
            .await
            .map_err(network)?;
        if response.status() == 404 {
            return Ok(None);
        }
        ensure_ok(&response)?;

        response
            .json::<Conversation>()
            .await
            .map(Some)
            .map_err(|e| ChatError::Serialization(e.to_string()))
    }

    async fn open_stream(&self, req: &ChatStreamRequest) -> Result<ByteStream> {
        let response = Request::post(&self.stream_url())
            .header("Accept", "text/event-stream")
            .json(req)
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;
        ensure_ok(&response)?;

        let body = response
            .body()
            .ok_or_else(|| ChatError::Stream("response has no body".to_string()))?;
        let reader: ReadableStreamDefaultReader = body.get_reader().unchecked_into();
        log::debug!("Stream opened for {}", req.conversation_id);
        Ok(read_chunks(reader))
    }

    fn backend_name(&self) -> &str {
        "http"
    }
}

/// Adapt a stream reader to a [`ByteStream`]. Ends when the reader reports
/// `done`; a rejected read yields one error and ends the stream.
fn read_chunks(reader: ReadableStreamDefaultReader) -> ByteStream {
    Box::pin(stream::unfold(Some(reader), |reader| async move {
        let reader = reader?;
        match read_chunk(&reader).await {
            Ok(Some(chunk)) => Some((Ok(chunk), Some(reader))),
            Ok(None) => {
                let _ = reader.release_lock();
                None
            }
            Err(e) => Some((Err(e), None)),
        }
    }))
}

async fn read_chunk(reader: &ReadableStreamDefaultReader) -> Result<Option<Vec<u8>>> {
    let result = JsFuture::from(reader.read())
        .await
        .map_err(|e| ChatError::Network(format!("stream read failed: {:?}", e)))?;

    let done = Reflect::get(&result, &JsValue::from_str("done"))
        .map_err(js_error)?
        .as_bool()
        .unwrap_or(true);
    if done {
        return Ok(None);
    }

    let value = Reflect::get(&result, &JsValue::from_str("value")).map_err(js_error)?;
    let bytes = value
        .dyn_into::<Uint8Array>()
        .map_err(|v| ChatError::Stream(format!("unexpected chunk type: {:?}", v)))?;
    Ok(Some(bytes.to_vec()))
}
