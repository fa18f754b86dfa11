//! # multibot-core
//!
//! Core types and traits for the multibot framework: [`Handler`] (a pluggable bot), [`Bot`]
//! (transport that executes responses), message, user and response types, and tracing
//! initialization. Transport-agnostic; used by multi-bot, group-bot and multibot-telegram.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::{parse_message_id, Bot, SendOptions};
pub use error::{MultibotError, Result};
pub use logger::init_tracing;
pub use types::{ChatType, Handler, Message, Response, ToCoreMessage, ToCoreUser, User};
