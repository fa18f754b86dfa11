//! Storage crate: group alias persistence.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`group_store`] – GroupStore trait
//! - [`sqlite_group_store`] – SqliteGroupStore (SQLite)
//! - [`inmemory`] – InMemoryGroupStore
//! - [`sqlite_pool`] – SqlitePoolManager

mod error;
mod group_store;
mod inmemory;
mod sqlite_group_store;
mod sqlite_pool;


pub use error::StorageError;
pub use group_store::{unique, GroupStore, Groups};
pub use inmemory::InMemoryGroupStore;
pub use sqlite_group_store::SqliteGroupStore;
pub use sqlite_pool::SqlitePoolManager;
