use std::{fmt, time::Duration};

use crate::command::Callback;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUser {
    pub id: u64,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i32,
}

#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub message_id: i32,
    pub from: ChatUser,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct IncomingCallback {
    pub query_id: String,
    /// Message the button belongs to. Missing when Telegram no longer has it.
    pub origin: Option<MessageRef>,
    pub from: ChatUser,
    pub data: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Event {
    Message(IncomingMessage),
    Callback(IncomingCallback),
}

impl Event {
    pub fn user_id(&self) -> u64 {
        match self {
            Event::Message(m) => m.from.id,
            Event::Callback(c) => c.from.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub text: String,
    pub callback: Callback,
}

impl Button {
    pub fn new(text: impl Into<String>, callback: Callback) -> Self {
        Self {
            text: text.into(),
            callback,
        }
    }
}

/// Inline keyboard, row by row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn row(mut self, buttons: Vec<Button>) -> Self {
        self.rows.push(buttons);
        self
    }

    pub fn callbacks(&self) -> impl Iterator<Item = &Callback> {
        self.rows.iter().flatten().map(|b| &b.callback)
    }
}

/// Reply text is MarkdownV2.
#[derive(Clone)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
    pub keyboard: Option<Keyboard>,
    pub disable_preview: bool,
    /// Deleted by the executor after this long.
    pub self_destruct: Option<Duration>,
}

impl OutgoingMessage {
    pub fn new(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            keyboard: None,
            disable_preview: false,
            self_destruct: None,
        }
    }

    pub fn keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn no_preview(mut self) -> Self {
        self.disable_preview = true;
        self
    }

    pub fn self_destruct(mut self, after: Duration) -> Self {
        self.self_destruct = Some(after);
        self
    }
}

// self-destructing messages carry key material
impl fmt::Debug for OutgoingMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = if self.self_destruct.is_some() { "[REDACTED]" } else { self.text.as_str() };
        f.debug_struct("OutgoingMessage")
            .field("chat_id", &self.chat_id)
            .field("text", &text)
            .field("keyboard", &self.keyboard.is_some())
            .field("self_destruct", &self.self_destruct)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    Send(OutgoingMessage),
    Edit {
        target: MessageRef,
        text: String,
        keyboard: Option<Keyboard>,
    },
    Delete(MessageRef),
    AnswerCallback(String),
    Typing(i64),
}

impl From<OutgoingMessage> for Action {
    fn from(msg: OutgoingMessage) -> Self {
        Self::Send(msg)
    }
}
