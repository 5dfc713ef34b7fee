//! Which session is on screen, and the one queued to replace it.
//!
//! Opening a conversation or starting a new chat finishes asynchronously.
//! The result is parked with [`PendingSwitch::offer`] and only takes over
//! once the active session is idle. Nothing is dropped while a turn is in
//! flight. The caller updates the address bar from the returned
//! [`SwitchTarget`], so the URL always follows what is actually shown.

use std::cell::RefCell;
use std::rc::Rc;
use chat_types::event::SessionEvent;
use crate::events::EventFeed;
use crate::session::ConversationSession;

/// A session together with the only feed that carries its events.
pub struct BoundSession {
    pub session: ConversationSession,
    feed: EventFeed,
}

impl BoundSession {
    pub fn new(session: ConversationSession, feed: EventFeed) -> Self {
        Self { session, feed }
    }
}

/// Where the address bar should point once a switch is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchTarget {
    /// `None` for an unbound session (the app root)
    pub conversation_id: Option<String>,
    /// Overwrite the current history entry instead of adding one
    pub replace_history: bool,
}

impl SwitchTarget {
    pub fn push(conversation_id: Option<String>) -> Self {
        Self { conversation_id, replace_history: false }
    }

    pub fn replace(conversation_id: Option<String>) -> Self {
        Self { conversation_id, replace_history: true }
    }
}

/// Clone-cheap handle for the tasks that prepare a replacement session.
#[derive(Clone, Default)]
pub struct PendingSwitch {
    slot: Rc<RefCell<Option<(BoundSession, SwitchTarget)>>>,
}

impl PendingSwitch {
    /// Queue `next` as the replacement. A later offer supersedes an
    /// earlier one that has not been applied yet.
    pub fn offer(&self, next: BoundSession, target: SwitchTarget) {
        if let Some((_, stale)) = self.slot.borrow_mut().replace((next, target)) {
            log::debug!("Superseded pending switch to {:?}", stale.conversation_id);
        }
    }

    fn take(&self) -> Option<(BoundSession, SwitchTarget)> {
        self.slot.borrow_mut().take()
    }
}

pub struct SessionSwitcher {
    active: BoundSession,
    pending: PendingSwitch,
}

impl SessionSwitcher {
    pub fn new(active: BoundSession) -> Self {
        Self {
            active,
            pending: PendingSwitch::default(),
        }
    }

    pub fn active(&self) -> &ConversationSession {
        &self.active.session
    }

    pub fn pending(&self) -> PendingSwitch {
        self.pending.clone()
    }

    /// Events of the active session since the last call.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.active.feed.drain()
    }

    /// Swap in the queued session if the active one is idle. While a turn
    /// is running the queued session stays where it is.
    ///
    /// Drain the outgoing session's events first: its feed is dropped here.
    pub fn apply_pending(&mut self) -> Option<SwitchTarget> {
        if self.active.session.state().is_busy() {
            return None;
        }
        let (next, target) = self.pending.take()?;
        log::info!(
            "Switching session {:?} -> {:?}",
            self.active.session.conversation_id(),
            target.conversation_id
        );
        self.active = next;
        Some(target)
    }
}
