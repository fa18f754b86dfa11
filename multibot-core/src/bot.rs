//! Transport abstraction for executing responses.
//!
//! [`Bot`] is transport-agnostic; the Telegram implementation lives in `multibot-telegram`.
//! Tests substitute a recording implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{MultibotError, Result};

/// Per-message send options derived from a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Enable web page preview.
    pub preview: bool,
    /// Message id (transport-specific) to reply to.
    pub reply_to: Option<String>,
}

/// Operations the dispatcher's output can be translated into.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message and returns its id.
    async fn send_message(&self, chat_id: i64, text: &str, options: SendOptions) -> Result<String>;
    /// Pins the given message without notification.
    async fn pin_message(&self, chat_id: i64, message_id: &str) -> Result<()>;
    /// Unpins the currently pinned message.
    async fn unpin_message(&self, chat_id: i64) -> Result<()>;
    /// Bans the user until the given moment.
    async fn ban_user(&self, chat_id: i64, user_id: i64, until: DateTime<Utc>) -> Result<()>;
    /// Returns ids of the chat's administrators.
    async fn chat_administrators(&self, chat_id: i64) -> Result<Vec<i64>>;
}

/// Parses a message id string into an i32, as Telegram expects.
pub fn parse_message_id(s: &str) -> Result<i32> {
    s.parse()
        .map_err(|_| MultibotError::Bot(format!("Invalid message_id: {}", s)))
}
