//! Recording [`Bot`] shared by the unit tests of this crate.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use multibot_core::{Bot, Result, SendOptions};

/// Records each Bot call as a string; sent messages get id "900".
#[derive(Default)]
pub(crate) struct RecordingBot {
    calls: Mutex<Vec<String>>,
    admins: Vec<i64>,
}

impl RecordingBot {
    /// A bot whose chats are administered by the given users.
    pub(crate) fn with_admins(admins: Vec<i64>) -> Self {
        Self {
            admins,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn send_message(&self, chat_id: i64, text: &str, options: SendOptions) -> Result<String> {
        self.record(format!(
            "send({}, {}, preview={}, reply_to={:?})",
            chat_id, text, options.preview, options.reply_to
        ));
        Ok("900".to_string())
    }

    async fn pin_message(&self, chat_id: i64, message_id: &str) -> Result<()> {
        self.record(format!("pin({}, {})", chat_id, message_id));
        Ok(())
    }

    async fn unpin_message(&self, chat_id: i64) -> Result<()> {
        self.record(format!("unpin({})", chat_id));
        Ok(())
    }

    async fn ban_user(&self, chat_id: i64, user_id: i64, until: DateTime<Utc>) -> Result<()> {
        self.record(format!("ban({}, {}, {})", chat_id, user_id, until.to_rfc3339()));
        Ok(())
    }

    async fn chat_administrators(&self, chat_id: i64) -> Result<Vec<i64>> {
        self.record(format!("admins({})", chat_id));
        Ok(self.admins.clone())
    }
}
