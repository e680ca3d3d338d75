use std::time::Duration;

use burberry::{async_trait, Collector, CollectorStream};
use eyre::Result;
use teloxide::{
    payloads::GetUpdatesSetters,
    requests::Requester,
    types::{AllowedUpdate, Update, UpdateKind, User},
    Bot,
};
use tracing::{debug, warn};

use crate::types::{ChatUser, Event, IncomingCallback, IncomingMessage, MessageRef};

const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Long-polls getUpdates and yields messages and button presses.
pub struct TelegramUpdateCollector {
    bot: Bot,
    timeout: u32,
}

impl TelegramUpdateCollector {
    pub fn new(bot: Bot, timeout: u32) -> Self {
        Self { bot, timeout }
    }
}

#[async_trait]
impl Collector<Event> for TelegramUpdateCollector {
    fn name(&self) -> &str {
        "TelegramUpdateCollector"
    }

    async fn get_event_stream(&self) -> Result<CollectorStream<'_, Event>> {
        let stream = async_stream::stream! {
            let mut offset = 0i32;
            loop {
                let updates = self
                    .bot
                    .get_updates()
                    .offset(offset)
                    .timeout(self.timeout)
                    .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::CallbackQuery])
                    .await;

                let updates = match updates {
                    Ok(updates) => updates,
                    Err(e) => {
                        warn!(error = %e, "getUpdates failed");
                        tokio::time::sleep(RETRY_DELAY).await;
                        continue;
                    }
                };

                for update in updates {
                    offset = update.id.as_offset();
                    match to_event(update) {
                        Some(event) => yield event,
                        None => debug!("skipping unsupported update"),
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

fn chat_user(user: &User) -> ChatUser {
    ChatUser {
        id: user.id.0,
        username: user.username.clone(),
    }
}

/// Keeps text messages with a sender and every callback query.
pub fn to_event(update: Update) -> Option<Event> {
    match update.kind {
        UpdateKind::Message(msg) => {
            let from = msg.from.as_ref().map(chat_user)?;
            let text = msg.text()?.to_string();
            Some(Event::Message(IncomingMessage {
                chat_id: msg.chat.id.0,
                message_id: msg.id.0,
                from,
                text,
            }))
        }
        UpdateKind::CallbackQuery(query) => {
            let origin = query.message.as_ref().map(|m| MessageRef {
                chat_id: m.chat().id.0,
                message_id: m.id().0,
            });
            Some(Event::Callback(IncomingCallback {
                query_id: query.id.to_string(),
                origin,
                from: chat_user(&query.from),
                data: query.data,
            }))
        }
        _ => None,
    }
}
