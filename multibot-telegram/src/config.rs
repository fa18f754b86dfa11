//! Minimal Telegram layer config: token, API URL, log file and dispatch timeout.
//! Loaded from BOT_TOKEN, TELEGRAM_API_URL (or TELOXIDE_API_URL), LOG_FILE, DISPATCH_TIMEOUT_SECS.

use std::env;
use std::time::Duration;

use anyhow::Result;
use tracing::error;

/// Telegram connectivity and logging settings.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub telegram_api_url: Option<String>,
    pub log_file: Option<String>,
    /// Upper bound on one dispatch; None waits for every handler.
    pub dispatch_timeout: Option<Duration>,
}

impl TelegramConfig {
    /// Loads from the environment: BOT_TOKEN is required, the rest optional.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Like [`TelegramConfig::from_env`], but a given `token` takes the place of BOT_TOKEN.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(token) => token,
            None => env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN not set"))?,
        };
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();
        let log_file = env::var("LOG_FILE").ok();
        let dispatch_timeout = match env::var("DISPATCH_TIMEOUT_SECS") {
            Ok(secs) => {
                let secs: u64 = secs
                    .parse()
                    .map_err(|_| anyhow::anyhow!("DISPATCH_TIMEOUT_SECS must be a number of seconds, got {:?}", secs))?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            Err(_) => None,
        };
        Ok(Self {
            bot_token,
            telegram_api_url,
            log_file,
            dispatch_timeout,
        })
    }

    /// Builds with the given token; everything else unset.
    pub fn with_token(bot_token: String) -> Self {
        Self {
            bot_token,
            telegram_api_url: None,
            log_file: None,
            dispatch_timeout: None,
        }
    }

    /// Creates the teloxide Bot, pointed at the custom API URL when one is set and valid.
    pub fn build_bot(&self) -> teloxide::Bot {
        let bot = teloxide::Bot::new(self.bot_token.clone());
        match self.telegram_api_url.as_deref() {
            Some(url_str) => match reqwest::Url::parse(url_str) {
                Ok(url) => bot.set_api_url(url),
                Err(e) => {
                    error!(error = %e, url = %url_str, "Invalid TELEGRAM_API_URL, using default");
                    bot
                }
            },
            None => bot,
        }
    }
}
