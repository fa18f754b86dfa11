//! Integration tests for [`storage::GroupStore`] implementations.
//!
//! Every scenario runs against both the SQLite store (in-memory database) and the in-memory store
//! so the two behave the same.

use std::sync::Arc;

use storage::{GroupStore, InMemoryGroupStore, SqliteGroupStore, StorageError};

fn members(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

async fn stores() -> Vec<(&'static str, Arc<dyn GroupStore>)> {
    let sqlite = SqliteGroupStore::new("sqlite::memory:")
        .await
        .expect("Failed to create sqlite store");
    vec![
        ("sqlite", Arc::new(sqlite) as Arc<dyn GroupStore>),
        ("inmemory", Arc::new(InMemoryGroupStore::new())),
    ]
}

/// **Test: put_group then get_group returns the members in order.**
#[tokio::test]
async fn test_put_and_get_group() {
    for (name, store) in stores().await {
        store
            .put_group(1, "@bar", &members(&["@blah", "@blah1", "@blah2"]))
            .await
            .unwrap();

        let got = store.get_group(1, "@bar").await.unwrap();
        assert_eq!(got, members(&["@blah", "@blah1", "@blah2"]), "{}", name);
    }
}

/// **Test: put_group replaces an existing group.**
#[tokio::test]
async fn test_put_group_replaces() {
    for (name, store) in stores().await {
        store.put_group(1, "@bar", &members(&["@a", "@b"])).await.unwrap();
        store.put_group(1, "@bar", &members(&["@c"])).await.unwrap();

        assert_eq!(store.get_group(1, "@bar").await.unwrap(), members(&["@c"]), "{}", name);
    }
}

/// **Test: groups are isolated per chat.**
#[tokio::test]
async fn test_groups_are_per_chat() {
    for (name, store) in stores().await {
        store.put_group(1, "@bar", &members(&["@a"])).await.unwrap();
        store.put_group(2, "@bar", &members(&["@b"])).await.unwrap();

        assert_eq!(store.get_group(1, "@bar").await.unwrap(), members(&["@a"]), "{}", name);
        assert_eq!(store.get_group(2, "@bar").await.unwrap(), members(&["@b"]), "{}", name);
    }
}

/// **Test: get_group on unknown chat or alias is NotFound.**
#[tokio::test]
async fn test_get_group_not_found() {
    for (name, store) in stores().await {
        let err = store.get_group(1, "@bar").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)), "{}: {:?}", name, err);

        store.add_chat(1).await.unwrap();
        let err = store.get_group(1, "@bar").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)), "{}: {:?}", name, err);
    }
}

/// **Test: get_groups lists all groups sorted by alias; empty for registered chat.**
#[tokio::test]
async fn test_get_groups() {
    for (name, store) in stores().await {
        assert!(store.get_groups(1).await.is_err(), "{}", name);

        store.add_chat(1).await.unwrap();
        assert!(store.get_groups(1).await.unwrap().is_empty(), "{}", name);

        store.put_group(1, "@bar1", &members(&["@x"])).await.unwrap();
        store.put_group(1, "@bar", &members(&["@y", "@z"])).await.unwrap();

        let groups = store.get_groups(1).await.unwrap();
        let aliases: Vec<&String> = groups.keys().collect();
        assert_eq!(aliases, vec!["@bar", "@bar1"], "{}", name);
        assert_eq!(groups["@bar"], members(&["@y", "@z"]), "{}", name);
    }
}

/// **Test: add_user appends once; unknown group is NotFound.**
#[tokio::test]
async fn test_add_user() {
    for (name, store) in stores().await {
        store.put_group(1, "@bar", &members(&["@a"])).await.unwrap();
        store.add_user(1, "@bar", "@b").await.unwrap();
        store.add_user(1, "@bar", "@b").await.unwrap();

        assert_eq!(store.get_group(1, "@bar").await.unwrap(), members(&["@a", "@b"]), "{}", name);

        let err = store.add_user(1, "@nope", "@b").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)), "{}", name);
        let err = store.add_user(2, "@bar", "@b").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)), "{}", name);
    }
}

/// **Test: delete_user_from_group removes the member; deleting twice is fine.**
#[tokio::test]
async fn test_delete_user_from_group() {
    for (name, store) in stores().await {
        store
            .put_group(1, "@bar", &members(&["@blah", "@blah1", "@blah2"]))
            .await
            .unwrap();

        store.delete_user_from_group(1, "@bar", "@blah1").await.unwrap();
        store.delete_user_from_group(1, "@bar", "@blah1").await.unwrap();

        assert_eq!(
            store.get_group(1, "@bar").await.unwrap(),
            members(&["@blah", "@blah2"]),
            "{}",
            name
        );

        assert!(store.delete_user_from_group(1, "@nope", "@blah").await.is_err(), "{}", name);
    }
}

/// **Test: delete_group removes the group; absent alias is fine; unknown chat fails.**
#[tokio::test]
async fn test_delete_group() {
    for (name, store) in stores().await {
        store.put_group(1, "@bar", &members(&["@a"])).await.unwrap();
        store.delete_group(1, "@bar").await.unwrap();
        store.delete_group(1, "@bar").await.unwrap();

        assert!(store.get_groups(1).await.unwrap().is_empty(), "{}", name);
        assert!(store.delete_group(2, "@bar").await.is_err(), "{}", name);
    }
}

/// **Test: find_aliases merges members of matching groups, skips unknown aliases, de-duplicates.**
#[tokio::test]
async fn test_find_aliases() {
    for (name, store) in stores().await {
        store
            .put_group(1, "@some_students", &members(&["@blah", "@blah1", "@blah2"]))
            .await
            .unwrap();
        store
            .put_group(1, "@kek", &members(&["@blah", "@blah3", "@blah4"]))
            .await
            .unwrap();
        store
            .put_group(1, "@lol", &members(&["@blah5"]))
            .await
            .unwrap();

        let found = store
            .find_aliases(1, &members(&["@some_students", "@kek", "@unknown"]))
            .await
            .unwrap();
        assert_eq!(
            found,
            members(&["@blah", "@blah1", "@blah2", "@blah3", "@blah4"]),
            "{}",
            name
        );

        let none = store.find_aliases(1, &members(&["@nobody"])).await.unwrap();
        assert!(none.is_empty(), "{}", name);
    }
}

/// **Test: find_aliases on unknown chat is NotFound.**
#[tokio::test]
async fn test_find_aliases_unknown_chat() {
    for (name, store) in stores().await {
        let err = store.find_aliases(42, &members(&["@a"])).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)), "{}", name);
    }
}

/// **Test: add_chat is idempotent and keeps existing groups.**
#[tokio::test]
async fn test_add_chat_idempotent() {
    for (name, store) in stores().await {
        store.put_group(1, "@bar", &members(&["@a"])).await.unwrap();
        store.add_chat(1).await.unwrap();
        store.add_chat(1).await.unwrap();

        assert_eq!(store.get_group(1, "@bar").await.unwrap(), members(&["@a"]), "{}", name);
    }
}
