#[cfg(test)]
mod tests {
    use crate::state::*;
    use crate::theme;
    use chat_core::session::{SessionSnapshot, SessionState};
    use chat_types::conversation::DirectorySummary;
    use chat_types::event::SessionEvent;
    use chat_types::message::{Message, Role};

    fn snapshot(
        state: SessionState,
        conversation_id: Option<&str>,
        messages: Vec<Message>,
        partial: Option<&str>,
    ) -> SessionSnapshot {
        SessionSnapshot {
            state,
            conversation_id: conversation_id.map(str::to_string),
            messages,
            partial: partial.map(str::to_string),
        }
    }

    // ─── UiState Tests ───────────────────────────────────────

    #[test]
    fn test_ui_state_initial() {
        let state = UiState::new();
        assert!(state.messages.is_empty());
        assert!(!state.streaming);
        assert!(state.input_text.is_empty());
        assert_eq!(state.status_text, "Ready");
        assert!(state.conversation_id.is_none());
        assert!(!state.directory_loaded);
        assert!(!state.is_busy());
        assert!(!state.is_thinking());
    }

    #[test]
    fn test_sync_session_waiting_for_first_delta() {
        let mut state = UiState::new();
        state.process_events(vec![SessionEvent::TurnStarted {
            user_text: "hello".to_string(),
        }]);
        state.sync_session(&snapshot(
            SessionState::AwaitingConversationId,
            None,
            vec![Message::user("hello")],
            None,
        ));

        assert_eq!(
            state.messages,
            vec![ChatEntry { role: Role::User, content: "hello".to_string() }]
        );
        assert!(state.is_busy());
        assert!(state.is_thinking());
        assert!(!state.streaming);
        assert_eq!(state.status_text, "Thinking...");
    }

    #[test]
    fn test_sync_session_shows_partial_as_last_entry() {
        let mut state = UiState::new();
        state.process_events(vec![
            SessionEvent::TurnStarted { user_text: "q".to_string() },
            SessionEvent::PartialUpdated { text: "Hel".to_string() },
            SessionEvent::PartialUpdated { text: "Hello".to_string() },
        ]);
        state.sync_session(&snapshot(
            SessionState::Streaming,
            Some("c-1"),
            vec![Message::user("q")],
            Some("Hello"),
        ));

        assert_eq!(state.messages.len(), 2);
        assert_eq!(
            state.messages[1],
            ChatEntry { role: Role::Assistant, content: "Hello".to_string() }
        );
        assert!(state.streaming);
        assert!(!state.is_thinking());
        assert_eq!(state.status_text, "Streaming...");
    }

    #[test]
    fn test_sync_session_after_turn_ends() {
        let mut state = UiState::new();
        state.process_events(vec![
            SessionEvent::TurnStarted { user_text: "What is EBITDA?".to_string() },
            SessionEvent::PartialUpdated { text: "Earnings".to_string() },
            SessionEvent::MessageFinalized { message: Message::assistant("Earnings") },
            SessionEvent::TurnEnded,
        ]);
        state.sync_session(&snapshot(
            SessionState::Idle,
            Some("c-1"),
            vec![Message::user("What is EBITDA?"), Message::assistant("Earnings")],
            None,
        ));

        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].role, Role::Assistant);
        assert!(!state.streaming);
        assert!(!state.is_busy());
        assert_eq!(state.status_text, "Ready");
        assert_eq!(state.conversation_id.as_deref(), Some("c-1"));
    }

    #[test]
    fn test_sync_session_follows_snapshot_not_events() {
        let mut state = UiState::new();
        // Events alone never add transcript entries.
        state.process_events(vec![
            SessionEvent::TurnStarted { user_text: "stray".to_string() },
            SessionEvent::MessageFinalized { message: Message::assistant("stray") },
        ]);
        assert!(state.messages.is_empty());

        state.sync_session(&snapshot(
            SessionState::Idle,
            Some("c-9"),
            vec![Message::user("q"), Message::assistant("a"), Message::user("q2")],
            None,
        ));
        assert_eq!(state.messages.len(), 3);
        assert_eq!(state.messages[2].content, "q2");
        assert_eq!(state.conversation_id.as_deref(), Some("c-9"));
        assert_eq!(state.status_text, "Ready");
    }

    #[test]
    fn test_ui_state_upstream_error_keeps_streaming() {
        let mut state = UiState::new();
        state.process_events(vec![
            SessionEvent::TurnStarted { user_text: "q".to_string() },
            SessionEvent::PartialUpdated { text: "part".to_string() },
            SessionEvent::UpstreamError { message: "rate limited".to_string() },
        ]);
        state.sync_session(&snapshot(
            SessionState::Streaming,
            Some("c"),
            vec![Message::user("q")],
            Some("part"),
        ));
        assert_eq!(state.status_text, "Upstream error: rate limited");
        assert!(state.streaming);
        assert!(state.is_busy());
    }

    #[test]
    fn test_sync_session_failed_turn_shows_system_entry() {
        let mut state = UiState::new();
        state.sync_session(&snapshot(
            SessionState::Idle,
            None,
            vec![
                Message::user("q"),
                Message::system("Error sending message. Please try again."),
            ],
            None,
        ));
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].role, Role::System);
        assert!(!state.is_busy());
    }

    #[test]
    fn test_ui_state_set_directory() {
        let mut state = UiState::new();
        state.set_directory(Vec::new(), true);
        assert!(state.directory_loaded);
        assert!(state.directory.is_empty());

        state.set_directory(
            vec![DirectorySummary {
                id: "c".to_string(),
                label: "Budget".to_string(),
                updated_at: None,
            }],
            true,
        );
        assert_eq!(state.directory[0].label, "Budget");
    }

    #[test]
    fn test_ui_state_default() {
        let state = UiState::default();
        assert_eq!(state.status_text, "Ready");
    }

    // ─── Theme Tests ─────────────────────────────────────────

    #[test]
    fn test_role_style_labels() {
        assert_eq!(theme::role_style(Role::User).0, "You");
        assert_eq!(theme::role_style(Role::Assistant).0, "Assistant");
        assert_eq!(theme::role_style(Role::System).1, theme::ERROR);
    }
}
