//! # multibot-telegram
//!
//! Telegram layer: adapters, [`multibot_core::Bot`] implementation, response execution, minimal
//! config and the REPL runner. Handles only Telegram connectivity; dispatching is done by
//! [`multi_bot::MultiBot`].

mod adapters;
mod bot_adapter;
mod config;
mod responder;
mod runner;
#[cfg(test)]
mod test_support;

pub use adapters::{chat_type, is_bot_added, TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::TelegramBotAdapter;
pub use config::TelegramConfig;
pub use responder::send_response;
pub use runner::{dispatch_and_respond, is_admin, run_repl};
