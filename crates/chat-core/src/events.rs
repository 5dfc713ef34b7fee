//! Per-session event channel.
//!
//! Every session gets its own channel. The session keeps the
//! [`EventSink`]; the [`EventFeed`] goes to whoever renders that session.
//! Swapping the rendered session drops its feed, after which anything the
//! retired session still emits is discarded instead of reaching the UI.

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use chat_types::event::SessionEvent;

/// Create a connected sink/feed pair for one session.
pub fn channel() -> (EventSink, EventFeed) {
    let (tx, rx) = mpsc::unbounded();
    (EventSink { tx }, EventFeed { rx })
}

/// Sending half, held by the session and its clones.
#[derive(Clone)]
pub struct EventSink {
    tx: UnboundedSender<SessionEvent>,
}

impl EventSink {
    pub fn emit(&self, event: SessionEvent) {
        if let Err(e) = self.tx.unbounded_send(event) {
            log::debug!("Session feed closed; dropped {:?}", e.into_inner());
        }
    }
}

/// Receiving half. Drained once per frame.
pub struct EventFeed {
    rx: UnboundedReceiver<SessionEvent>,
}

impl EventFeed {
    /// Everything emitted since the last drain, oldest first.
    pub fn drain(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(Some(event)) = self.rx.try_next() {
            events.push(event);
        }
        events
    }
}
