//! In-memory implementation of [`GroupStore`], for tests and ephemeral runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::group_store::{unique, GroupStore, Groups};

/// Keeps all chats in a map guarded by one lock; every call holds the lock for its duration.
#[derive(Debug, Default)]
pub struct InMemoryGroupStore {
    chats: RwLock<HashMap<i64, Groups>>,
}

impl InMemoryGroupStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn chat_not_found(chat_id: i64) -> StorageError {
    StorageError::NotFound(format!("chat {}", chat_id))
}

fn group_not_found(chat_id: i64, alias: &str) -> StorageError {
    StorageError::NotFound(format!("group {}:{}", chat_id, alias))
}

#[async_trait]
impl GroupStore for InMemoryGroupStore {
    async fn put_group(&self, chat_id: i64, alias: &str, members: &[String]) -> Result<(), StorageError> {
        let mut chats = self.chats.write().await;
        chats
            .entry(chat_id)
            .or_default()
            .insert(alias.to_string(), members.to_vec());
        Ok(())
    }

    async fn add_user(&self, chat_id: i64, alias: &str, member: &str) -> Result<(), StorageError> {
        let mut chats = self.chats.write().await;
        let members = chats
            .get_mut(&chat_id)
            .ok_or_else(|| chat_not_found(chat_id))?
            .get_mut(alias)
            .ok_or_else(|| group_not_found(chat_id, alias))?;
        if !members.iter().any(|m| m == member) {
            members.push(member.to_string());
        }
        Ok(())
    }

    async fn get_group(&self, chat_id: i64, alias: &str) -> Result<Vec<String>, StorageError> {
        let chats = self.chats.read().await;
        chats
            .get(&chat_id)
            .ok_or_else(|| chat_not_found(chat_id))?
            .get(alias)
            .cloned()
            .ok_or_else(|| group_not_found(chat_id, alias))
    }

    async fn get_groups(&self, chat_id: i64) -> Result<Groups, StorageError> {
        let chats = self.chats.read().await;
        chats
            .get(&chat_id)
            .cloned()
            .ok_or_else(|| chat_not_found(chat_id))
    }

    async fn delete_user_from_group(&self, chat_id: i64, alias: &str, member: &str) -> Result<(), StorageError> {
        let mut chats = self.chats.write().await;
        let members = chats
            .get_mut(&chat_id)
            .ok_or_else(|| chat_not_found(chat_id))?
            .get_mut(alias)
            .ok_or_else(|| group_not_found(chat_id, alias))?;
        members.retain(|m| m != member);
        Ok(())
    }

    async fn delete_group(&self, chat_id: i64, alias: &str) -> Result<(), StorageError> {
        let mut chats = self.chats.write().await;
        chats
            .get_mut(&chat_id)
            .ok_or_else(|| chat_not_found(chat_id))?
            .remove(alias);
        Ok(())
    }

    async fn find_aliases(&self, chat_id: i64, aliases: &[String]) -> Result<Vec<String>, StorageError> {
        let chats = self.chats.read().await;
        let groups = chats.get(&chat_id).ok_or_else(|| chat_not_found(chat_id))?;
        let found = aliases
            .iter()
            .filter_map(|alias| groups.get(alias))
            .flatten()
            .cloned();
        Ok(unique(found))
    }

    async fn add_chat(&self, chat_id: i64) -> Result<(), StorageError> {
        self.chats.write().await.entry(chat_id).or_default();
        Ok(())
    }
}
