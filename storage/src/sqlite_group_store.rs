//! SQLite implementation of [`GroupStore`].
//!
//! Chats live in `chats`; each group is a row of `user_groups` keyed by (chat_id, alias) with the
//! member list stored as a JSON array, so member order is preserved.

use async_trait::async_trait;
use sqlx::SqliteConnection;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::group_store::{unique, GroupStore, Groups};
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct SqliteGroupStore {
    pub(crate) pool_manager: SqlitePoolManager,
}

impl SqliteGroupStore {
    /// Opens (or creates) the database and its tables.
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        let store = Self { pool_manager };
        store.init().await?;
        info!("SqliteGroupStore instantiated");
        Ok(store)
    }

    async fn init(&self) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chats (
                chat_id INTEGER PRIMARY KEY
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_groups (
                chat_id INTEGER NOT NULL,
                alias TEXT NOT NULL,
                members TEXT NOT NULL,
                PRIMARY KEY (chat_id, alias)
            )
            "#,
        )
        .execute(pool)
        .await?;

        debug!("Group tables ready");
        Ok(())
    }
}

async fn ensure_chat(conn: &mut SqliteConnection, chat_id: i64) -> Result<(), StorageError> {
    let found: Option<(i64,)> = sqlx::query_as("SELECT chat_id FROM chats WHERE chat_id = ?")
        .bind(chat_id)
        .fetch_optional(&mut *conn)
        .await?;

    match found {
        Some(_) => Ok(()),
        None => Err(StorageError::NotFound(format!("chat {}", chat_id))),
    }
}

async fn load_members(
    conn: &mut SqliteConnection,
    chat_id: i64,
    alias: &str,
) -> Result<Option<Vec<String>>, StorageError> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT members FROM user_groups WHERE chat_id = ? AND alias = ?")
            .bind(chat_id)
            .bind(alias)
            .fetch_optional(&mut *conn)
            .await?;

    match row {
        Some((json,)) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

async fn store_members(
    conn: &mut SqliteConnection,
    chat_id: i64,
    alias: &str,
    members: &[String],
) -> Result<(), StorageError> {
    let json = serde_json::to_string(members)?;
    sqlx::query(
        r#"
        INSERT INTO user_groups (chat_id, alias, members) VALUES (?, ?, ?)
        ON CONFLICT (chat_id, alias) DO UPDATE SET members = excluded.members
        "#,
    )
    .bind(chat_id)
    .bind(alias)
    .bind(json)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

fn group_not_found(chat_id: i64, alias: &str) -> StorageError {
    StorageError::NotFound(format!("group {}:{}", chat_id, alias))
}

#[async_trait]
impl GroupStore for SqliteGroupStore {
    async fn put_group(&self, chat_id: i64, alias: &str, members: &[String]) -> Result<(), StorageError> {
        let mut tx = self.pool_manager.pool().begin().await?;

        sqlx::query("INSERT OR IGNORE INTO chats (chat_id) VALUES (?)")
            .bind(chat_id)
            .execute(&mut *tx)
            .await?;
        store_members(&mut tx, chat_id, alias, members).await?;

        tx.commit().await?;
        info!(chat_id, alias = %alias, members = members.len(), "Group saved");
        Ok(())
    }

    async fn add_user(&self, chat_id: i64, alias: &str, member: &str) -> Result<(), StorageError> {
        let mut tx = self.pool_manager.pool().begin().await?;

        ensure_chat(&mut tx, chat_id).await?;
        let mut members = load_members(&mut tx, chat_id, alias)
            .await?
            .ok_or_else(|| group_not_found(chat_id, alias))?;

        if !members.iter().any(|m| m == member) {
            members.push(member.to_string());
            store_members(&mut tx, chat_id, alias, &members).await?;
        }

        tx.commit().await?;
        info!(chat_id, alias = %alias, member = %member, "User added to group");
        Ok(())
    }

    async fn get_group(&self, chat_id: i64, alias: &str) -> Result<Vec<String>, StorageError> {
        let mut conn = self.pool_manager.pool().acquire().await?;

        ensure_chat(&mut conn, chat_id).await?;
        load_members(&mut conn, chat_id, alias)
            .await?
            .ok_or_else(|| group_not_found(chat_id, alias))
    }

    async fn get_groups(&self, chat_id: i64) -> Result<Groups, StorageError> {
        let mut conn = self.pool_manager.pool().acquire().await?;

        ensure_chat(&mut conn, chat_id).await?;
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT alias, members FROM user_groups WHERE chat_id = ?")
                .bind(chat_id)
                .fetch_all(&mut *conn)
                .await?;

        let mut groups = Groups::new();
        for (alias, json) in rows {
            groups.insert(alias, serde_json::from_str(&json)?);
        }
        debug!(chat_id, groups = groups.len(), "Retrieved groups");
        Ok(groups)
    }

    async fn delete_user_from_group(&self, chat_id: i64, alias: &str, member: &str) -> Result<(), StorageError> {
        let mut tx = self.pool_manager.pool().begin().await?;

        ensure_chat(&mut tx, chat_id).await?;
        let mut members = load_members(&mut tx, chat_id, alias)
            .await?
            .ok_or_else(|| group_not_found(chat_id, alias))?;

        let before = members.len();
        members.retain(|m| m != member);
        if members.len() != before {
            store_members(&mut tx, chat_id, alias, &members).await?;
        }

        tx.commit().await?;
        info!(chat_id, alias = %alias, member = %member, "User deleted from group");
        Ok(())
    }

    async fn delete_group(&self, chat_id: i64, alias: &str) -> Result<(), StorageError> {
        let mut tx = self.pool_manager.pool().begin().await?;

        ensure_chat(&mut tx, chat_id).await?;
        sqlx::query("DELETE FROM user_groups WHERE chat_id = ? AND alias = ?")
            .bind(chat_id)
            .bind(alias)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(chat_id, alias = %alias, "Group deleted");
        Ok(())
    }

    async fn find_aliases(&self, chat_id: i64, aliases: &[String]) -> Result<Vec<String>, StorageError> {
        let mut conn = self.pool_manager.pool().acquire().await?;

        ensure_chat(&mut conn, chat_id).await?;
        let mut found = Vec::new();
        for alias in aliases {
            if let Some(members) = load_members(&mut conn, chat_id, alias).await? {
                found.extend(members);
            }
        }
        Ok(unique(found))
    }

    async fn add_chat(&self, chat_id: i64) -> Result<(), StorageError> {
        sqlx::query("INSERT OR IGNORE INTO chats (chat_id) VALUES (?)")
            .bind(chat_id)
            .execute(self.pool_manager.pool())
            .await?;
        info!(chat_id, "Chat registered");
        Ok(())
    }
}
