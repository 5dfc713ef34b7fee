//! Chat panel: displays conversation messages and input field.

use egui::{self, Align, Layout, RichText, ScrollArea, Vec2};
use crate::state::{ChatEntry, UiState};
use crate::theme::*;
use chat_types::message::Role;

/// Render the chat panel. Returns Some(message) when user submits input.
/// The user message itself is shown once the session reports the turn.
pub fn chat_panel(ui: &mut egui::Ui, state: &mut UiState) -> Option<String> {
    let mut submitted = None;

    egui::Frame::default()
        .fill(BG_PRIMARY)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.vertical(|ui| {
                // Header
                ui.horizontal(|ui| {
                    ui.heading(RichText::new("Chat").color(TEXT_PRIMARY).strong());
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let status_color = if state.is_busy() { WARNING } else { SUCCESS };
                        ui.label(
                            RichText::new(&state.status_text)
                                .color(status_color)
                                .small(),
                        );
                    });
                });

                ui.separator();

                let available_height = ui.available_height() - 60.0;
                ScrollArea::vertical()
                    .max_height(available_height)
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        if state.messages.is_empty() && !state.is_busy() {
                            ui.add_space(24.0);
                            ui.vertical_centered(|ui| {
                                ui.label(
                                    RichText::new("Ask a question to start a conversation.")
                                        .color(TEXT_SECONDARY),
                                );
                            });
                        }

                        let last = state.messages.len().saturating_sub(1);
                        for (i, entry) in state.messages.iter().enumerate() {
                            render_message(ui, entry, state.streaming && i == last);
                            ui.add_space(4.0);
                        }

                        if state.is_thinking() {
                            ui.horizontal(|ui| {
                                ui.spinner();
                                ui.label(RichText::new("Thinking...").color(TEXT_SECONDARY));
                            });
                        }
                    });

                ui.add_space(8.0);

                // Input area
                ui.horizontal(|ui| {
                    let input = egui::TextEdit::singleline(&mut state.input_text)
                        .hint_text("Type a message...")
                        .desired_width(ui.available_width() - 70.0)
                        .font(egui::FontId::proportional(14.0));

                    let response = ui.add(input);

                    let send_enabled = !state.input_text.trim().is_empty() && !state.is_busy();
                    let send_btn = ui.add_enabled(
                        send_enabled,
                        egui::Button::new(RichText::new("Send").color(TEXT_PRIMARY))
                            .fill(if send_enabled { ACCENT } else { BG_SURFACE })
                            .corner_radius(PANEL_ROUNDING)
                            .min_size(Vec2::new(60.0, 0.0)),
                    );

                    // Submit on Enter or button click
                    let enter = response.lost_focus()
                        && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if (enter && send_enabled) || send_btn.clicked() {
                        submitted = Some(state.input_text.trim().to_string());
                        state.input_text.clear();
                        response.request_focus();
                    }
                });
            });
        });

    submitted
}

fn render_message(ui: &mut egui::Ui, entry: &ChatEntry, in_progress: bool) {
    let (label, label_color, bg) = role_style(entry.role);
    let layout = if entry.role == Role::User {
        Layout::top_down(Align::Max)
    } else {
        Layout::top_down(Align::Min)
    };

    ui.with_layout(layout, |ui| {
        egui::Frame::default()
            .fill(bg)
            .corner_radius(PANEL_ROUNDING)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new(label).color(label_color).strong().small());
                ui.label(RichText::new(&entry.content).color(TEXT_PRIMARY));
                if in_progress {
                    ui.label(RichText::new("▌").color(ACCENT).strong());
                }
            });
    });
}
