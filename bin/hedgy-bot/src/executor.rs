use burberry::{async_trait, Executor};
use eyre::Result;
use teloxide::{
    payloads::{EditMessageTextSetters, SendMessageSetters},
    requests::Requester,
    types::{
        ChatAction, ChatId, InlineKeyboardButton, InlineKeyboardMarkup, LinkPreviewOptions, MessageId, ParseMode,
    },
    ApiError, Bot, RequestError,
};
use tracing::{debug, warn};

use crate::types::{Action, Keyboard, MessageRef, OutgoingMessage};

/// Turns bot actions into Telegram API calls. All text is sent as MarkdownV2.
pub struct TelegramExecutor {
    bot: Bot,
}

impl TelegramExecutor {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    async fn send(&self, msg: OutgoingMessage) -> Result<()> {
        let chat = ChatId(msg.chat_id);
        let mut request = self.bot.send_message(chat, msg.text).parse_mode(ParseMode::MarkdownV2);
        if let Some(keyboard) = &msg.keyboard {
            request = request.reply_markup(inline_markup(keyboard));
        }
        if msg.disable_preview {
            request = request.link_preview_options(no_preview());
        }
        let sent = request.await?;

        if let Some(after) = msg.self_destruct {
            let bot = self.bot.clone();
            let id = sent.id;
            tokio::spawn(async move {
                tokio::time::sleep(after).await;
                if let Err(e) = bot.delete_message(chat, id).await {
                    warn!(chat = chat.0, error = %e, "failed to delete expiring message");
                }
            });
        }
        Ok(())
    }

    async fn edit(&self, target: MessageRef, text: String, keyboard: Option<Keyboard>) -> Result<()> {
        let mut request = self
            .bot
            .edit_message_text(ChatId(target.chat_id), MessageId(target.message_id), text)
            .parse_mode(ParseMode::MarkdownV2);
        if let Some(keyboard) = &keyboard {
            request = request.reply_markup(inline_markup(keyboard));
        }

        match request.await {
            Ok(_) => Ok(()),
            Err(RequestError::Api(ApiError::MessageNotModified)) => {
                debug!(chat = target.chat_id, "edit left message unchanged");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn inline_markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|button| InlineKeyboardButton::callback(button.text.clone(), button.callback.encode()))
            .collect::<Vec<_>>()
    }))
}

fn no_preview() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

#[async_trait]
impl Executor<Action> for TelegramExecutor {
    fn name(&self) -> &str {
        "TelegramExecutor"
    }

    async fn execute(&self, action: Action) -> Result<()> {
        match action {
            Action::Send(msg) => self.send(msg).await,
            Action::Edit { target, text, keyboard } => self.edit(target, text, keyboard).await,
            Action::Delete(target) => {
                self.bot
                    .delete_message(ChatId(target.chat_id), MessageId(target.message_id))
                    .await?;
                Ok(())
            }
            Action::AnswerCallback(query_id) => {
                self.bot.answer_callback_query(query_id).await?;
                Ok(())
            }
            Action::Typing(chat_id) => {
                self.bot.send_chat_action(ChatId(chat_id), ChatAction::Typing).await?;
                Ok(())
            }
        }
    }
}
