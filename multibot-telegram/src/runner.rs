//! REPL runner: converts teloxide messages to core::Message, dispatches them through the
//! [`MultiBot`] and executes the merged response.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use multi_bot::MultiBot;
use multibot_core::{Bot as CoreBot, ChatType, Message, ToCoreMessage};
use teloxide::prelude::*;
use tracing::{error, info, instrument, warn};

use super::adapters::{chat_type, TelegramMessageWrapper};
use super::bot_adapter::TelegramBotAdapter;
use super::responder::send_response;

/// Starts the REPL with the given teloxide Bot and dispatcher.
///
/// Calls get_me() first to learn the bot's username. Every update is handled on its own task so a
/// slow dispatch never blocks the next update.
#[instrument(skip(bot, multi_bot))]
pub async fn run_repl(
    bot: teloxide::Bot,
    multi_bot: MultiBot,
    dispatch_timeout: Option<Duration>,
) -> Result<()> {
    let me = bot.get_me().await?;
    let bot_username: Arc<str> = Arc::from(me.user.username.clone().unwrap_or_default());
    info!(username = %bot_username, handlers = multi_bot.len(), "Bot username set before repl");

    let adapter = Arc::new(TelegramBotAdapter::new(bot.clone()));
    let multi_bot = Arc::new(multi_bot);

    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let adapter = adapter.clone();
        let multi_bot = multi_bot.clone();
        let bot_username = bot_username.clone();

        async move {
            tokio::spawn(async move {
                handle_update(adapter.as_ref(), &multi_bot, &msg, &bot_username, dispatch_timeout)
                    .await;
            });
            respond(())
        }
    })
    .await;

    Ok(())
}

/// Converts one Telegram message and runs it through the dispatcher. Updates carrying neither
/// text nor new members are ignored.
async fn handle_update(
    bot: &dyn CoreBot,
    multi_bot: &MultiBot,
    msg: &teloxide::types::Message,
    bot_username: &str,
    dispatch_timeout: Option<Duration>,
) {
    if msg.text().is_none() && msg.new_chat_members().is_none() {
        return;
    }

    let sender_is_admin = match msg.from.as_ref() {
        Some(user) => is_admin(bot, chat_type(&msg.chat), msg.chat.id.0, user.id.0 as i64).await,
        None => false,
    };

    let core_msg = TelegramMessageWrapper {
        message: msg,
        bot_username,
        sender_is_admin,
    }
    .to_core();

    info!(
        user_id = core_msg.from.as_ref().map(|u| u.id),
        chat_id = core_msg.chat_id,
        message_id = %core_msg.id,
        added_bot_to_chat = core_msg.added_bot_to_chat,
        "Received message"
    );

    if let Err(e) = dispatch_and_respond(bot, multi_bot, &core_msg, dispatch_timeout).await {
        error!(error = %e, chat_id = core_msg.chat_id, "Failed to execute response");
    }
}

/// Whether the user administers the chat. Only group chats have administrators; lookup failures
/// count as not admin.
pub async fn is_admin(bot: &dyn CoreBot, chat_type: ChatType, chat_id: i64, user_id: i64) -> bool {
    if chat_type != ChatType::Group {
        return false;
    }

    match bot.chat_administrators(chat_id).await {
        Ok(admins) => admins.contains(&user_id),
        Err(e) => {
            warn!(error = %e, chat_id, "Failed to get chat administrators");
            false
        }
    }
}

/// Dispatches the message and executes the merged response, if any. When the dispatch exceeds
/// `dispatch_timeout`, the handlers still running are cancelled and nothing is sent.
pub async fn dispatch_and_respond(
    bot: &dyn CoreBot,
    multi_bot: &MultiBot,
    message: &Message,
    dispatch_timeout: Option<Duration>,
) -> multibot_core::Result<()> {
    let response = match dispatch_timeout {
        Some(limit) => match tokio::time::timeout(limit, multi_bot.on_message(message)).await {
            Ok(response) => response,
            Err(_) => {
                warn!(chat_id = message.chat_id, timeout = ?limit, "Dispatch timed out");
                return Ok(());
            }
        },
        None => multi_bot.on_message(message).await,
    };

    match response {
        Some(response) => send_response(bot, message, &response).await,
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingBot;
    use async_trait::async_trait;
    use chrono::Utc;
    use multibot_core::{Handler, Response};

    struct Echo;

    #[async_trait]
    impl Handler for Echo {
        async fn on_message(&self, message: &Message) -> Option<Response> {
            Some(Response::text(format!("echo: {}", message.text)))
        }

        fn help(&self) -> String {
            "echo".to_string()
        }
    }

    struct Sleepy;

    #[async_trait]
    impl Handler for Sleepy {
        async fn on_message(&self, _message: &Message) -> Option<Response> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Some(Response::text("too late"))
        }

        fn help(&self) -> String {
            String::new()
        }
    }

    fn message(text: &str) -> Message {
        Message {
            id: "5".to_string(),
            chat_id: 11,
            chat_type: ChatType::Private,
            from: None,
            sent: Utc::now(),
            text: text.to_string(),
            added_bot_to_chat: false,
        }
    }

    #[tokio::test]
    async fn test_dispatch_and_respond_sends_merged_text() {
        let bot = RecordingBot::default();
        let multi_bot = MultiBot::new().add_handler(Arc::new(Echo));

        dispatch_and_respond(&bot, &multi_bot, &message("hi"), None)
            .await
            .unwrap();

        assert_eq!(bot.calls(), vec!["send(11, echo: hi, preview=false, reply_to=None)"]);
    }

    #[tokio::test]
    async fn test_dispatch_and_respond_help_request() {
        let bot = RecordingBot::default();
        let multi_bot = MultiBot::new().add_handler(Arc::new(Echo));

        dispatch_and_respond(&bot, &multi_bot, &message("/help"), None)
            .await
            .unwrap();

        assert_eq!(bot.calls(), vec!["send(11, echo, preview=false, reply_to=None)"]);
    }

    #[tokio::test]
    async fn test_dispatch_and_respond_nothing_to_send() {
        let bot = RecordingBot::default();
        let multi_bot = MultiBot::new();

        dispatch_and_respond(&bot, &multi_bot, &message("hi"), None)
            .await
            .unwrap();

        assert!(bot.calls().is_empty());
    }

    /// **Test: a dispatch that exceeds the timeout sends nothing.**
    #[tokio::test(start_paused = true)]
    async fn test_dispatch_and_respond_timeout() {
        let bot = RecordingBot::default();
        let multi_bot = MultiBot::new()
            .add_handler(Arc::new(Echo))
            .add_handler(Arc::new(Sleepy));

        dispatch_and_respond(&bot, &multi_bot, &message("hi"), Some(Duration::from_secs(1)))
            .await
            .unwrap();

        assert!(bot.calls().is_empty());
    }

    #[tokio::test]
    async fn test_is_admin_only_in_groups() {
        let bot = RecordingBot::with_admins(vec![7]);

        assert!(is_admin(&bot, ChatType::Group, -100, 7).await);
        assert!(!is_admin(&bot, ChatType::Group, -100, 8).await);
        assert!(!is_admin(&bot, ChatType::Private, 7, 7).await);
        assert_eq!(bot.calls(), vec!["admins(-100)", "admins(-100)"]);
    }
}
