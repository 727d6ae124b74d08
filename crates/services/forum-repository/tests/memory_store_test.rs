//! Snapshot durability tests for the in-memory store.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use tokio_test::assert_err;

use common::{AppError, StoreConfig};
use domain::{Reply, Role, User};
use forum_repository::{Durability, EntityStore, FixedClock, MemoryStore, ReplyRepository, ReplyStore, UserRepository, UserStore};

fn config(path: std::path::PathBuf) -> StoreConfig {
    StoreConfig {
        snapshot_path: Some(path),
    }
}

#[tokio::test]
async fn test_snapshot_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path().join("forum.json"));
    let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

    {
        let store = Arc::new(MemoryStore::open(&config).await.unwrap());
        let users = UserStore::new(store.clone(), Arc::new(FixedClock::new(now)));
        let replies = ReplyStore::new(store);

        users.add_user(User::new("Alice", "alice@example.com", now)).await.unwrap();
        users.ignore_user("Alice", "Bob", Durability::Immediate).await.unwrap();
        replies.add_reply(Reply::new(7, 1, "Alice", "persisted", now)).await.unwrap();
    }

    let reopened = Arc::new(MemoryStore::open(&config).await.unwrap());
    let users = UserStore::new(reopened.clone(), Arc::new(FixedClock::new(now)));
    let replies = ReplyStore::new(reopened.clone());

    assert_eq!(users.get_stored_username("ALICE").await.unwrap(), "Alice");
    assert!(users.is_ignoring("alice", "bob").await.unwrap());
    assert_eq!(replies.get_reply_count(7, false).await.unwrap(), 1);

    // Ids continue after the loaded rows
    let next = users.add_user(User::new("Carol", "carol@example.com", now)).await.unwrap();
    assert_eq!(next.id, 2);
}

#[tokio::test]
async fn test_open_without_snapshot_starts_empty() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::open(&config(dir.path().join("missing.json"))).await.unwrap();

    assert!(store.snapshot().await.users.is_empty());
    assert!(!dir.path().join("missing.json").exists());
}

#[tokio::test]
async fn test_failed_snapshot_write_keeps_state() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::open(&config(dir.path().join("no-such-dir").join("forum.json")))
        .await
        .unwrap();

    store.add(Role::new("Moderator")).await.unwrap();
    let err = assert_err!(store.commit().await);

    assert!(matches!(err, AppError::StorageFailure(_)));
    assert_eq!(err.user_message(), "A storage error occurred");
    assert_eq!(store.pending_changes().await, 1);
    assert!(store.snapshot().await.roles.is_empty());
}

#[tokio::test]
async fn test_corrupt_snapshot_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("forum.json");
    std::fs::write(&path, b"not json").unwrap();

    let result = MemoryStore::open(&config(path)).await;

    assert!(matches!(result, Err(AppError::StorageFailure(_))));
}
