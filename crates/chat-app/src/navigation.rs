//! URL handling: the active conversation lives at `/c/{id}`.

use wasm_bindgen::JsValue;
use chat_core::switcher::SwitchTarget;

const CONVERSATION_PREFIX: &str = "/c/";
const ROOT_PATH: &str = "/";

pub fn conversation_path(id: &str) -> String {
    format!("{}{}", CONVERSATION_PREFIX, id)
}

/// Extract `{id}` from `/c/{id}` (a trailing slash is tolerated).
pub fn conversation_id_from_path(path: &str) -> Option<String> {
    let id = path.strip_prefix(CONVERSATION_PREFIX)?;
    let id = id.strip_suffix('/').unwrap_or(id);
    if id.is_empty() || id.contains('/') {
        return None;
    }
    Some(id.to_string())
}

/// Path for a switch target; an unbound session lives at the root.
pub fn target_path(target: &SwitchTarget) -> String {
    match &target.conversation_id {
        Some(id) => conversation_path(id),
        None => ROOT_PATH.to_string(),
    }
}

/// Conversation id in the browser's current location, if any.
pub fn current_conversation_id() -> Option<String> {
    let path = gloo_utils::window().location().pathname().ok()?;
    conversation_id_from_path(&path)
}

/// Point the address bar at `path` without reloading, adding a history entry.
pub fn push_path(path: &str) {
    let pushed = gloo_utils::window()
        .history()
        .and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(path)));
    if let Err(e) = pushed {
        log::warn!("history.pushState({}) failed: {:?}", path, e);
    }
}

/// Like [`push_path`] but overwrites the current history entry.
pub fn replace_path(path: &str) {
    let replaced = gloo_utils::window()
        .history()
        .and_then(|history| history.replace_state_with_url(&JsValue::NULL, "", Some(path)));
    if let Err(e) = replaced {
        log::warn!("history.replaceState({}) failed: {:?}", path, e);
    }
}

pub fn push_conversation_path(id: &str) {
    push_path(&conversation_path(id));
}

/// Make the address bar match a session that was just switched in.
pub fn follow(target: &SwitchTarget) {
    let path = target_path(target);
    if target.replace_history {
        replace_path(&path);
    } else {
        push_path(&path);
    }
}
