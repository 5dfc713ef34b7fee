//! Main egui application: composes the panels and owns the active session.

use std::rc::Rc;

use egui::{self, CentralPanel, RichText, SidePanel, TopBottomPanel};

use chat_core::directory::ConversationDirectory;
use chat_core::session::ConversationSession;
use chat_core::switcher::{BoundSession, SessionSwitcher, SwitchTarget};
use chat_core::transport::TransportClient;
use chat_platform::HttpConversationClient;
use chat_types::config::ClientConfig;
use chat_types::conversation::Conversation;
use chat_types::event::SessionEvent;
use chat_ui::panels::chat;
use chat_ui::panels::sidebar::{self, SidebarAction};
use chat_ui::state::UiState;
use chat_ui::theme;

use crate::navigation;

/// The main application state
pub struct ChatApp {
    ui_state: UiState,
    config: ClientConfig,
    transport: TransportClient,
    directory: Rc<ConversationDirectory>,
    /// Active session plus the one async open/new-chat tasks queued for it
    switcher: SessionSwitcher,
    first_frame: bool,
}

impl ChatApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: ClientConfig) -> Self {
        log::info!("Conversation backend at {}", config.api_base);
        let transport =
            TransportClient::new(Rc::new(HttpConversationClient::new(config.clone())));
        let directory = Rc::new(ConversationDirectory::new(config.clone(), transport.clone()));
        let switcher = SessionSwitcher::new(bind_session(&config, &transport, &directory));

        let app = Self {
            ui_state: UiState::new(),
            config,
            transport,
            directory,
            switcher,
            first_frame: true,
        };

        app.start_directory(cc.egui_ctx.clone());
        if let Some(id) = navigation::current_conversation_id() {
            // The browser is already at /c/{id}: no new history entry.
            app.open_conversation(id, true, cc.egui_ctx.clone());
        }
        app
    }

    /// Initial listing plus the long-running invalidation watcher.
    fn start_directory(&self, ctx: egui::Context) {
        let directory = self.directory.clone();
        wasm_bindgen_futures::spawn_local(async move {
            directory.refresh().await;
            ctx.request_repaint();
            directory.watch(|| ctx.request_repaint()).await;
        });
    }

    fn fresh_session(&self) -> BoundSession {
        bind_session(&self.config, &self.transport, &self.directory)
    }

    /// Fetch `id` and queue it for display. A conversation the backend
    /// does not know falls back to a fresh session at `/`.
    fn open_conversation(&self, id: String, initial_load: bool, ctx: egui::Context) {
        let transport = self.transport.clone();
        let next = self.fresh_session();
        let pending = self.switcher.pending();

        wasm_bindgen_futures::spawn_local(async move {
            let conversation_id = match transport.fetch_conversation(&id).await {
                Ok(Some(conversation)) => {
                    next.session.load(conversation);
                    Some(id)
                }
                Ok(None) => {
                    log::warn!("Conversation {} not found; starting a new one", id);
                    None
                }
                // Already logged by the transport; keep the current view.
                Err(_) => return,
            };
            let target = if initial_load {
                SwitchTarget::replace(conversation_id)
            } else {
                SwitchTarget::push(conversation_id)
            };
            pending.offer(next, target);
            ctx.request_repaint();
        });
    }

    /// "New chat": create the conversation up front and switch to it.
    fn new_chat(&self, ctx: egui::Context) {
        let directory = self.directory.clone();
        let next = self.fresh_session();
        let pending = self.switcher.pending();

        wasm_bindgen_futures::spawn_local(async move {
            let Some(id) = directory.start_new_conversation().await else {
                return;
            };
            next.session.load(Conversation::new(id.clone()));
            pending.offer(next, SwitchTarget::push(Some(id)));
            ctx.request_repaint();
        });
    }

    /// Run one turn on the active session (async)
    fn dispatch_message(&self, text: String, ctx: &egui::Context) {
        let session = self.switcher.active().clone();
        let ctx = ctx.clone();

        wasm_bindgen_futures::spawn_local(async move {
            let outcome = session.submit(&text).await;
            log::debug!("Turn finished: {:?}", outcome);
            ctx.request_repaint();
        });
    }

    fn apply_events(&mut self, events: Vec<SessionEvent>) {
        for event in &events {
            if let SessionEvent::ConversationAssigned { conversation_id } = event {
                navigation::push_conversation_path(conversation_id);
            }
        }
        self.ui_state.process_events(events);
    }
}

fn bind_session(
    config: &ClientConfig,
    transport: &TransportClient,
    directory: &ConversationDirectory,
) -> BoundSession {
    let (session, feed) = ConversationSession::new(config.clone(), transport.clone());
    session.subscribe(directory.subscription());
    BoundSession::new(session, feed)
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.first_frame {
            theme::apply_theme(ctx);
            self.first_frame = false;
        }

        // Drain before switching: the outgoing session's feed goes with it.
        let events = self.switcher.drain_events();
        if !events.is_empty() {
            self.apply_events(events);
            ctx.request_repaint();
        }
        if let Some(target) = self.switcher.apply_pending() {
            navigation::follow(&target);
        }
        self.ui_state.sync_session(&self.switcher.active().snapshot());
        self.ui_state
            .set_directory(self.directory.entries(), self.directory.has_loaded());

        if self.ui_state.is_busy() {
            ctx.request_repaint();
        }

        // ── Top bar ──────────────────────────────────────────
        TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new("Chat")
                        .strong()
                        .color(theme::ACCENT)
                        .size(16.0),
                );
                ui.separator();
                ui.label(
                    RichText::new(format!("Backend: {}", self.config.api_base))
                        .color(theme::TEXT_SECONDARY)
                        .small(),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.ui_state.is_busy() && ui.button("Stop").clicked() {
                        self.switcher.active().cancel();
                    }
                });
            });
        });

        // ── Sidebar ──────────────────────────────────────────
        let mut action = None;
        SidePanel::left("sidebar")
            .exact_width(theme::SIDEBAR_WIDTH)
            .frame(egui::Frame::default().fill(theme::BG_SIDEBAR).inner_margin(8.0))
            .show(ctx, |ui| {
                action = sidebar::sidebar_panel(ui, &self.ui_state);
            });
        match action {
            Some(SidebarAction::NewChat) => self.new_chat(ctx.clone()),
            Some(SidebarAction::Open(id)) => self.open_conversation(id, false, ctx.clone()),
            None => {}
        }

        // ── Main content ─────────────────────────────────────
        CentralPanel::default().show(ctx, |ui| {
            if let Some(text) = chat::chat_panel(ui, &mut self.ui_state) {
                self.dispatch_message(text, ctx);
            }
        });
    }
}
