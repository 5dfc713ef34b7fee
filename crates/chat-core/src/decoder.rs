//! Stream decoder: turns the chat endpoint's chunked body into
//! [`StreamEvent`]s.
//!
//! Wire format: frames separated by a blank line, each `data: <payload>`.
//! A payload is either the `[DONE]` sentinel or a JSON object carrying
//! `content` and/or `error`. Chunk boundaries are arbitrary, so both the
//! UTF-8 decoding and the frame splitting carry state across chunks.

use std::collections::VecDeque;
use std::pin::Pin;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use chat_types::{Result, event::StreamEvent};
use crate::ports::ByteStream;

const FRAME_DELIMITER: &[u8] = b"\n\n";
const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>>>>;

/// Classification of a single frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Not a `data: ` frame (comment, keep-alive, other SSE field)
    Ignored,
    /// The `[DONE]` sentinel
    Done,
    /// A well-formed payload and the events it carries (possibly none)
    Payload(Vec<StreamEvent>),
    /// A `data: ` frame whose payload is not a JSON object
    Malformed(String),
}

#[derive(Deserialize)]
struct FramePayload {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    error: Option<Value>,
}

/// Classify one frame (delimiter already removed).
pub fn parse_frame(frame: &str) -> Frame {
    let Some(payload) = frame.strip_prefix(DATA_PREFIX) else {
        return Frame::Ignored;
    };
    if payload == DONE_SENTINEL {
        return Frame::Done;
    }

    let value: Value = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(e) => return Frame::Malformed(e.to_string()),
    };
    if !value.is_object() {
        return Frame::Malformed(format!("expected a JSON object, got {}", value));
    }
    let parsed: FramePayload = match serde_json::from_value(value) {
        Ok(p) => p,
        Err(e) => return Frame::Malformed(e.to_string()),
    };

    let mut events = Vec::new();
    if let Some(content) = parsed.content.filter(|c| !c.is_empty()) {
        events.push(StreamEvent::ContentDelta(content));
    }
    match parsed.error {
        Some(Value::String(message)) if !message.is_empty() => {
            events.push(StreamEvent::Error(message));
        }
        Some(Value::String(_)) | None => {}
        Some(other) => events.push(StreamEvent::Error(other.to_string())),
    }
    Frame::Payload(events)
}

/// Incremental decoder. Feed chunks with [`push`](Self::push), then call
/// [`finish`](Self::finish) at end of input.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    /// Bytes of a character split across chunks
    pending: Vec<u8>,
    /// Decoded text not yet consumed as a complete frame
    text: String,
    /// Byte offset in `text` where the next delimiter search starts
    scan_from: usize,
    finished: bool,
    malformed: usize,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk and return every event completed by it.
    /// After `[DONE]` all further input is ignored.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let mut out = Vec::new();
        if self.finished || chunk.is_empty() {
            return out;
        }
        self.decode_utf8(chunk);
        self.drain_frames(&mut out);
        out
    }

    /// End of input. An undelimited trailing fragment is handled as a last frame.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut out = Vec::new();
        if self.finished {
            return out;
        }
        if !self.pending.is_empty() {
            self.text.push_str(&String::from_utf8_lossy(&self.pending));
            self.pending.clear();
        }
        self.drain_frames(&mut out);
        if !self.finished && !self.text.is_empty() {
            let rest = std::mem::take(&mut self.text);
            self.handle_frame(&rest, &mut out);
        }
        self.finished = true;
        out
    }

    /// True once `[DONE]` was seen or [`finish`](Self::finish) was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of `data: ` frames discarded because their payload did not parse.
    pub fn malformed_frames(&self) -> usize {
        self.malformed
    }

    fn decode_utf8(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
        let mut start = 0;
        while start < self.pending.len() {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(s) => {
                    self.text.push_str(s);
                    start = self.pending.len();
                }
                Err(e) => {
                    let valid = start + e.valid_up_to();
                    if let Ok(s) = std::str::from_utf8(&self.pending[start..valid]) {
                        self.text.push_str(s);
                    }
                    match e.error_len() {
                        Some(len) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            start = valid + len;
                        }
                        // Incomplete sequence at the end: wait for more bytes.
                        None => {
                            start = valid;
                            break;
                        }
                    }
                }
            }
        }
        self.pending.drain(..start);
    }

    fn drain_frames(&mut self, out: &mut Vec<StreamEvent>) {
        while !self.finished {
            let found = self.text.as_bytes()[self.scan_from..]
                .windows(FRAME_DELIMITER.len())
                .position(|w| w == FRAME_DELIMITER);
            let Some(offset) = found else {
                // The delimiter may straddle the next chunk.
                self.scan_from = self.text.len().saturating_sub(FRAME_DELIMITER.len() - 1);
                break;
            };
            let end = self.scan_from + offset;
            let frame: String = self.text.drain(..end + FRAME_DELIMITER.len()).collect();
            self.scan_from = 0;
            self.handle_frame(&frame[..end], out);
        }
    }

    fn handle_frame(&mut self, frame: &str, out: &mut Vec<StreamEvent>) {
        match parse_frame(frame) {
            Frame::Ignored => {}
            Frame::Done => {
                out.push(StreamEvent::Done);
                self.finished = true;
                self.text.clear();
                self.pending.clear();
                self.scan_from = 0;
            }
            Frame::Payload(events) => out.extend(events),
            Frame::Malformed(reason) => {
                self.malformed += 1;
                log::debug!("Discarding malformed frame ({}): {:?}", reason, frame);
            }
        }
    }
}

struct DecodeState {
    source: ByteStream,
    decoder: StreamDecoder,
    queue: VecDeque<StreamEvent>,
    exhausted: bool,
}

/// Lazily decode a byte stream. The result ends right after `Done`, at end
/// of input, or after yielding a single `Err` when the source fails.
/// Chunks after `Done` are never read.
pub fn decode_stream(source: ByteStream) -> EventStream {
    let state = DecodeState {
        source,
        decoder: StreamDecoder::new(),
        queue: VecDeque::new(),
        exhausted: false,
    };

    Box::pin(stream::unfold(state, |mut st| async move {
        loop {
            if let Some(event) = st.queue.pop_front() {
                return Some((Ok(event), st));
            }
            if st.exhausted {
                return None;
            }
            match st.source.next().await {
                Some(Ok(chunk)) => {
                    st.queue.extend(st.decoder.push(&chunk));
                    st.exhausted = st.decoder.is_finished();
                }
                Some(Err(e)) => {
                    st.exhausted = true;
                    return Some((Err(e), st));
                }
                None => {
                    st.queue.extend(st.decoder.finish());
                    st.exhausted = true;
                }
            }
        }
    }))
}
