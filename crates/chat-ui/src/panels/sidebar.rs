//! Sidebar: conversation list and the "New chat" button.

use egui::{self, RichText, ScrollArea, Vec2};
use crate::state::UiState;
use crate::theme::*;

/// What the user asked for in the sidebar this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarAction {
    NewChat,
    Open(String),
}

pub fn sidebar_panel(ui: &mut egui::Ui, state: &UiState) -> Option<SidebarAction> {
    let mut action = None;

    ui.add_space(8.0);
    let new_chat = ui.add_enabled(
        !state.is_busy(),
        egui::Button::new(RichText::new("+ New chat").color(TEXT_PRIMARY))
            .fill(ACCENT)
            .corner_radius(PANEL_ROUNDING)
            .min_size(Vec2::new(ui.available_width(), 32.0)),
    );
    if new_chat.clicked() {
        action = Some(SidebarAction::NewChat);
    }

    ui.add_space(8.0);
    ui.label(RichText::new("Conversations").color(TEXT_SECONDARY).small());
    ui.separator();

    if !state.directory_loaded {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(RichText::new("Loading...").color(TEXT_SECONDARY));
        });
        return action;
    }
    if state.directory.is_empty() {
        ui.label(RichText::new("No conversations yet.").color(TEXT_SECONDARY));
        return action;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.add_enabled_ui(!state.is_busy(), |ui| {
                for entry in &state.directory {
                    let selected = state.conversation_id.as_deref() == Some(entry.id.as_str());
                    let row = ui.selectable_label(
                        selected,
                        RichText::new(&entry.label).color(TEXT_PRIMARY),
                    );
                    let row = match entry.updated_at {
                        Some(ts) => row.on_hover_text(ts.format("%Y-%m-%d %H:%M").to_string()),
                        None => row,
                    };
                    if row.clicked() && !selected {
                        action = Some(SidebarAction::Open(entry.id.clone()));
                    }
                }
            });
        });

    action
}
