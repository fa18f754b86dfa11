//! # group-bot
//!
//! [`GroupBot`] handler: manages named user groups per chat (aliases like `@admins`) and
//! mentions all members of a group when its alias appears in a message.

mod group_bot;
mod text;


pub use group_bot::{ChatMembers, GroupBot, GroupBotParams};
