//! Wraps teloxide::Bot and implements [`multibot_core::Bot`]. Production code talks to Telegram;
//! tests substitute a recording Bot impl.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use multibot_core::{parse_message_id, Bot as CoreBot, MultibotError, Result, SendOptions};
use teloxide::prelude::*;
use teloxide::types::{ChatId, LinkPreviewOptions, MessageId, ParseMode, ReplyParameters, UserId};

/// Thin wrapper around teloxide::Bot that implements multibot-core's Bot trait.
#[derive(Clone)]
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    /// Creates an adapter from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

fn bot_error(e: teloxide::RequestError) -> MultibotError {
    MultibotError::Bot(e.to_string())
}

fn link_preview(enabled: bool) -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: !enabled,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat_id: i64, text: &str, options: SendOptions) -> Result<String> {
        let mut request = self
            .bot
            .send_message(ChatId(chat_id), text.to_string())
            .parse_mode(ParseMode::Markdown)
            .link_preview_options(link_preview(options.preview));

        if let Some(reply_to) = options.reply_to.as_deref() {
            let id = parse_message_id(reply_to)?;
            request = request.reply_parameters(ReplyParameters::new(MessageId(id)));
        }

        let sent = request.await.map_err(bot_error)?;
        Ok(sent.id.to_string())
    }

    async fn pin_message(&self, chat_id: i64, message_id: &str) -> Result<()> {
        let id = parse_message_id(message_id)?;
        self.bot
            .pin_chat_message(ChatId(chat_id), MessageId(id))
            .disable_notification(true)
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn unpin_message(&self, chat_id: i64) -> Result<()> {
        self.bot
            .unpin_chat_message(ChatId(chat_id))
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn ban_user(&self, chat_id: i64, user_id: i64, until: DateTime<Utc>) -> Result<()> {
        let user_id = u64::try_from(user_id)
            .map_err(|_| MultibotError::Bot(format!("Invalid user_id: {}", user_id)))?;
        self.bot
            .ban_chat_member(ChatId(chat_id), UserId(user_id))
            .until_date(until)
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn chat_administrators(&self, chat_id: i64) -> Result<Vec<i64>> {
        let admins = self
            .bot
            .get_chat_administrators(ChatId(chat_id))
            .await
            .map_err(bot_error)?;
        Ok(admins.iter().map(|m| m.user.id.0 as i64).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_preview_follows_flag() {
        assert!(link_preview(false).is_disabled);
        assert!(!link_preview(true).is_disabled);
    }
}
