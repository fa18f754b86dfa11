//! Core types: user, message, response directive, and the Handler trait.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of chat the message came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatType {
    #[default]
    Private,
    Group,
    Channel,
}

/// Sender identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// None for users without a Telegram username.
    pub username: Option<String>,
    pub display_name: String,
    pub is_admin: bool,
    pub is_bot: bool,
}

/// A single inbound chat event, produced once by the transport adapter and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub chat_id: i64,
    pub chat_type: ChatType,
    /// Absent for system events.
    pub from: Option<User>,
    pub sent: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Set when this event notifies that the bot was added to the chat.
    pub added_bot_to_chat: bool,
}

impl Message {
    /// Returns true when the sender is known and is a chat administrator.
    pub fn from_admin(&self) -> bool {
        self.from.as_ref().is_some_and(|u| u.is_admin)
    }
}

/// What a handler (or the dispatcher) asks the transport to do in response to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub text: String,
    /// Pin the sent message.
    pub pin: bool,
    /// Unpin the currently pinned message.
    pub unpin: bool,
    /// Enable web page preview.
    pub preview: bool,
    /// Reply to the triggering message instead of posting standalone.
    pub reply: bool,
    /// Ban the sender for this long; zero means no ban.
    pub ban_interval: Duration,
}

impl Response {
    /// Creates a response carrying only text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Creates a text response that replies to the triggering message.
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reply: true,
            ..Self::default()
        }
    }

    /// Returns true when there is nothing to send or execute.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
            && !self.pin
            && !self.unpin
            && !self.preview
            && !self.reply
            && self.ban_interval.is_zero()
    }
}

/// A pluggable bot: reacts to messages and describes its usage.
///
/// Handlers never return errors; failures are logged by the handler and reported as `None`
/// (or as ordinary response text).
#[async_trait]
pub trait Handler: Send + Sync {
    /// Processes the message; `None` means there is nothing to send.
    async fn on_message(&self, message: &Message) -> Option<Response>;

    /// Usage text for this handler. Empty string contributes nothing to the combined help.
    fn help(&self) -> String;

    /// Name used in log fields.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Converts a transport-specific user type to core [`User`].
pub trait ToCoreUser: Send + Sync {
    fn to_core(&self) -> User;
}

/// Converts a transport-specific message type to core [`Message`].
pub trait ToCoreMessage: Send + Sync {
    fn to_core(&self) -> Message;
}
