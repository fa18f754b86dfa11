//! Group store abstraction: named member lists (aliases) per chat.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;

use crate::error::StorageError;

/// Groups of a chat: alias to member usernames, sorted by alias.
pub type Groups = BTreeMap<String, Vec<String>>;

/// Stores and fetches user groups. Each call is atomic on its own.
///
/// Operations on a chat that was never registered (neither by [`GroupStore::add_chat`] nor by
/// [`GroupStore::put_group`]) fail with [`StorageError::NotFound`].
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Creates or replaces a group; registers the chat if needed.
    async fn put_group(&self, chat_id: i64, alias: &str, members: &[String]) -> Result<(), StorageError>;
    /// Appends a member to an existing group. Adding a present member is a no-op.
    async fn add_user(&self, chat_id: i64, alias: &str, member: &str) -> Result<(), StorageError>;
    /// Members of one group.
    async fn get_group(&self, chat_id: i64, alias: &str) -> Result<Vec<String>, StorageError>;
    /// All groups of the chat.
    async fn get_groups(&self, chat_id: i64) -> Result<Groups, StorageError>;
    /// Removes a member from the group. Removing an absent member is a no-op.
    async fn delete_user_from_group(&self, chat_id: i64, alias: &str, member: &str) -> Result<(), StorageError>;
    /// Removes the group. Removing an absent group is a no-op.
    async fn delete_group(&self, chat_id: i64, alias: &str) -> Result<(), StorageError>;
    /// Members of every listed alias that is a group, de-duplicated in first-seen order.
    /// Aliases that are not groups are skipped.
    async fn find_aliases(&self, chat_id: i64, aliases: &[String]) -> Result<Vec<String>, StorageError>;
    /// Registers the chat.
    async fn add_chat(&self, chat_id: i64) -> Result<(), StorageError>;
}

/// Removes duplicates, keeping the first occurrence of each item.
pub fn unique(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
