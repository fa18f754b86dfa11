//! Adapters from Telegram (teloxide) types to multibot_core types.
//! Depends only on teloxide and multibot_core type definitions.

use multibot_core::{ChatType, Message, ToCoreMessage, ToCoreUser, User};

/// Wraps a teloxide User for conversion to core [`User`]. The admin flag depends on the chat and
/// is filled in by [`TelegramMessageWrapper`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            display_name: self.0.full_name(),
            is_admin: false,
            is_bot: self.0.is_bot,
        }
    }
}

/// Wraps a teloxide Message for conversion to core [`Message`].
pub struct TelegramMessageWrapper<'a> {
    pub message: &'a teloxide::types::Message,
    /// Username of this bot, to recognize it among new chat members.
    pub bot_username: &'a str,
    /// Whether the sender administers the chat; resolved by the caller.
    pub sender_is_admin: bool,
}

impl<'a> ToCoreMessage for TelegramMessageWrapper<'a> {
    fn to_core(&self) -> Message {
        let msg = self.message;
        Message {
            id: msg.id.to_string(),
            chat_id: msg.chat.id.0,
            chat_type: chat_type(&msg.chat),
            from: msg.from.as_ref().map(|u| User {
                is_admin: self.sender_is_admin,
                ..TelegramUserWrapper(u).to_core()
            }),
            sent: msg.date,
            text: msg.text().unwrap_or("").to_string(),
            added_bot_to_chat: is_bot_added(
                msg.text(),
                msg.new_chat_members().unwrap_or(&[]),
                self.bot_username,
            ),
        }
    }
}

/// Maps the teloxide chat kind; supergroups are groups.
pub fn chat_type(chat: &teloxide::types::Chat) -> ChatType {
    if chat.is_group() || chat.is_supergroup() {
        ChatType::Group
    } else if chat.is_channel() {
        ChatType::Channel
    } else {
        ChatType::Private
    }
}

/// `/start` in a private chat, or this bot among the new members of a group.
pub fn is_bot_added(
    text: Option<&str>,
    new_members: &[teloxide::types::User],
    bot_username: &str,
) -> bool {
    if text == Some("/start") {
        return true;
    }

    new_members
        .iter()
        .any(|u| u.is_bot && u.username.as_deref() == Some(bot_username))
}
