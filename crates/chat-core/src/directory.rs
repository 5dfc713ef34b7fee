//! Conversation directory: the sorted sidebar view over all conversations.
//!
//! The view is recomputed from scratch on every refresh. Sessions notify the
//! directory through [`DirectoryListener`]; each notification is queued and
//! answered by exactly one refresh.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::rc::Rc;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::future::poll_fn;
use futures::StreamExt;
use chat_types::{
    config::ClientConfig,
    conversation::{Conversation, DirectorySummary},
};
use crate::transport::TransportClient;

const ELLIPSIS: &str = "...";

/// Observer for "a conversation's message set changed".
pub trait DirectoryListener {
    fn directory_invalidated(&self);
}

/// Handle given to sessions; each call queues one refresh.
#[derive(Clone)]
pub struct DirectorySubscription {
    tx: UnboundedSender<()>,
}

impl DirectoryListener for DirectorySubscription {
    fn directory_invalidated(&self) {
        if self.tx.unbounded_send(()).is_err() {
            log::debug!("Directory dropped; invalidation ignored");
        }
    }
}

pub struct ConversationDirectory {
    config: ClientConfig,
    transport: TransportClient,
    entries: RefCell<Vec<DirectorySummary>>,
    loaded: Cell<bool>,
    tx: UnboundedSender<()>,
    rx: RefCell<UnboundedReceiver<()>>,
}

impl ConversationDirectory {
    pub fn new(config: ClientConfig, transport: TransportClient) -> Self {
        let (tx, rx) = mpsc::unbounded();
        Self {
            config,
            transport,
            entries: RefCell::new(Vec::new()),
            loaded: Cell::new(false),
            tx,
            rx: RefCell::new(rx),
        }
    }

    /// A listener to inject into sessions.
    pub fn subscription(&self) -> Rc<DirectorySubscription> {
        Rc::new(DirectorySubscription {
            tx: self.tx.clone(),
        })
    }

    /// Current view, most recently updated first.
    pub fn entries(&self) -> Vec<DirectorySummary> {
        self.entries.borrow().clone()
    }

    /// False until the first refresh completed. Lets the UI tell
    /// "still loading" apart from "no conversations yet".
    pub fn has_loaded(&self) -> bool {
        self.loaded.get()
    }

    /// Reload the list from the backend and store it as the current view.
    /// A failed listing yields an empty view (the transport logs it).
    pub async fn refresh(&self) -> Vec<DirectorySummary> {
        let conversations = self.transport.list_conversations().await;
        let summaries = summarize(&conversations, &self.config);
        log::debug!("Directory refreshed: {} conversations", summaries.len());
        *self.entries.borrow_mut() = summaries.clone();
        self.loaded.set(true);
        summaries
    }

    /// Answer every invalidation queued so far, one refresh each.
    /// Returns how many refreshes ran.
    pub async fn refresh_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let queued = matches!(self.rx.borrow_mut().try_next(), Ok(Some(())));
            if !queued {
                break;
            }
            self.refresh().await;
            ran += 1;
        }
        ran
    }

    /// Refresh once per invalidation, forever, calling `on_refresh` after
    /// each one. The directory keeps a sender of its own, so this only
    /// returns if the channel is torn down. Meant to be spawned for the
    /// lifetime of the app.
    pub async fn watch<F: Fn()>(&self, on_refresh: F) {
        loop {
            let next = poll_fn(|cx| self.rx.borrow_mut().poll_next_unpin(cx)).await;
            if next.is_none() {
                break;
            }
            self.refresh().await;
            on_refresh();
        }
    }

    /// Create an empty conversation up front (the sidebar's "New chat").
    /// Returns the new id and refreshes the view; `None` if creation failed.
    pub async fn start_new_conversation(&self) -> Option<String> {
        let id = self.transport.create_conversation().await?;
        self.refresh().await;
        Some(id)
    }
}

/// Build the sorted view. Entries without a usable timestamp go last;
/// ties keep backend order.
pub fn summarize(conversations: &[Conversation], config: &ClientConfig) -> Vec<DirectorySummary> {
    let mut summaries: Vec<DirectorySummary> = conversations
        .iter()
        .map(|conv| DirectorySummary {
            id: conv.id.clone(),
            label: truncate_label(&display_label(conv, config), config.label_max_chars),
            updated_at: conv.updated_at,
        })
        .collect();

    summaries.sort_by(|a, b| match (a.updated_at, b.updated_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    summaries
}

/// Alias, else the first message's text, else the placeholder.
pub fn display_label(conv: &Conversation, config: &ClientConfig) -> String {
    conv.alias
        .as_deref()
        .filter(|alias| !alias.is_empty())
        .or_else(|| {
            conv.messages
                .first()
                .map(|m| m.content.as_str())
                .filter(|content| !content.is_empty())
        })
        .unwrap_or(&config.placeholder_label)
        .to_string()
}

/// Cut to `max_chars` characters and append `...` when anything was cut.
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    match label.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &label[..cut], ELLIPSIS),
        None => label.to_string(),
    }
}
