pub mod heartbeat;
pub mod link;
pub mod telegram;
pub mod units;

use burberry::executor::telegram_message::{escape, MessageBuilder, TelegramMessageDispatcher};
use tokio::runtime::{Builder as TokioRuntimeBuilder, Handle as TokioHandle, RuntimeFlavor as TokioRuntimeFlavor};
use tracing::error;

use crate::telegram::AdminChat;

/// Logs panics on the `panic_hook` target and forwards them to the admin chat, if one is
/// configured. Long command-line arguments are redacted since bot tokens and keys are
/// usually passed that way.
pub fn set_panic_hook() {
    std::panic::set_hook(Box::new(move |panic_info| {
        let cmdline = redacted_cmdline(std::env::args());

        let thread = std::thread::current();
        let thread_name = thread.name().unwrap_or("<unnamed>");

        let payload = match panic_info.payload().downcast_ref::<&'static str>() {
            Some(s) => *s,
            None => match panic_info.payload().downcast_ref::<String>() {
                Some(s) => &**s,
                None => "Box<Any>",
            },
        };

        let msg = match panic_info.location() {
            Some(location) => format!(
                "thread '{}' panicked at '{}': {}:{}",
                thread_name,
                payload,
                location.file(),
                location.line(),
            ),
            None => format!("thread '{}' panicked at '{}'", thread_name, payload),
        };

        error!(target: "panic_hook", "{}", msg);
        if let Some(admin) = telegram::admin_chat() {
            send_panic_to_telegram(admin, &cmdline, &msg);
        }
    }));
}

fn redacted_cmdline(args: impl Iterator<Item = String>) -> String {
    args.map(|arg| if arg.len() > 32 { "[REDACTED]".to_string() } else { arg })
        .collect::<Vec<_>>()
        .join(" ")
}

fn send_panic_to_telegram(admin: &AdminChat, cmdline: &str, msg: &str) {
    let dispatcher = TelegramMessageDispatcher::new(None, None, None);
    let text = escape(&format!("Command: {:?}\nError: {:?}", cmdline, msg));
    let mut builder = MessageBuilder::new()
        .bot_token(&admin.bot_token)
        .chat_id(&admin.chat_id)
        .text(&text)
        .disable_link_preview(true)
        .disable_notification(true);
    if let Some(thread_id) = &admin.thread_id {
        builder = builder.thread_id(thread_id);
    }
    let message = builder.build();

    // The hook can fire inside or outside a runtime, and inside a current-thread runtime
    // we are not allowed to block on it.
    match TokioHandle::try_current() {
        Ok(handle) => match handle.runtime_flavor() {
            TokioRuntimeFlavor::CurrentThread => std::thread::scope(move |s| {
                s.spawn(move || {
                    if let Ok(rt) = TokioRuntimeBuilder::new_current_thread().enable_all().build() {
                        rt.block_on(dispatcher.send_message(message));
                    }
                });
            }),
            _ => {
                tokio::task::block_in_place(move || handle.block_on(dispatcher.send_message(message)));
            }
        },
        Err(_) => {
            if let Ok(rt) = TokioRuntimeBuilder::new_current_thread().enable_all().build() {
                rt.block_on(dispatcher.send_message(message));
            }
        }
    }
}
