//! Where operator-facing reports (panics) go. Unset means "log only".

use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct AdminChat {
    pub bot_token: String,
    pub chat_id: String,
    pub thread_id: Option<String>,
}

static ADMIN_CHAT: OnceLock<AdminChat> = OnceLock::new();

/// First call wins; later calls are ignored.
pub fn set_admin_chat(chat: AdminChat) {
    let _ = ADMIN_CHAT.set(chat);
}

pub fn admin_chat() -> Option<&'static AdminChat> {
    ADMIN_CHAT.get().filter(|chat| !chat.bot_token.is_empty() && !chat.chat_id.is_empty())
}
