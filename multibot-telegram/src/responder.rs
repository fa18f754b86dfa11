//! Executes a merged [`Response`] against a [`Bot`]: send text, unpin, pin, ban.

use multibot_core::{Bot, Message, MultibotError, Response, Result, SendOptions};
use tracing::{debug, warn};

/// Carries out the directive for the triggering message. Empty responses do nothing.
///
/// Unpin runs before pin so a freshly pinned message survives. Without text, pin applies to the
/// triggering message. The ban ends `ban_interval` after the message was sent.
pub async fn send_response(bot: &dyn Bot, message: &Message, response: &Response) -> Result<()> {
    if response.is_empty() {
        return Ok(());
    }

    let chat_id = message.chat_id;
    let mut pin_target = message.id.clone();

    if !response.text.is_empty() {
        let options = SendOptions {
            preview: response.preview,
            reply_to: response.reply.then(|| message.id.clone()),
        };
        pin_target = bot.send_message(chat_id, &response.text, options).await?;
        debug!(chat_id, message_id = %pin_target, "Response sent");
    }

    if response.unpin {
        bot.unpin_message(chat_id).await?;
    }

    if response.pin {
        bot.pin_message(chat_id, &pin_target).await?;
    }

    if !response.ban_interval.is_zero() {
        match &message.from {
            Some(user) => {
                let until = chrono::Duration::from_std(response.ban_interval)
                    .ok()
                    .and_then(|interval| message.sent.checked_add_signed(interval))
                    .ok_or_else(|| {
                        MultibotError::Bot(format!(
                            "Ban interval out of range: {:?}",
                            response.ban_interval
                        ))
                    })?;
                bot.ban_user(chat_id, user.id, until).await?;
                debug!(chat_id, user_id = user.id, "Sender banned");
            }
            None => warn!(chat_id, "Ban requested for a message without sender"),
        }
    }

    Ok(())
}
