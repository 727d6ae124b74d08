//! Reply repository tests against the in-memory store.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio_test::{assert_err, assert_ok};

use common::AppError;
use domain::{Reply, User};
use forum_repository::{
    EntityStore, FixedClock, MemoryStore, ReplyRepository, ReplyStore, UserRepository, UserStore,
};

const TOPIC: i64 = 10;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

fn create_test_reply(topic_id: i64, minute: i64, body: &str) -> Reply {
    Reply::new(topic_id, 1, "Alice", body, start() + Duration::minutes(minute))
}

fn setup() -> (Arc<MemoryStore>, ReplyStore<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let repo = ReplyStore::new(store.clone());
    (store, repo)
}

/// Three public and two moderators-only replies, added out of time order
async fn seed_mixed_topic(repo: &ReplyStore<MemoryStore>) {
    let replies = vec![
        create_test_reply(TOPIC, 30, "public 3"),
        create_test_reply(TOPIC, 5, "hidden 1").moderators_only(),
        create_test_reply(TOPIC, 10, "public 1"),
        create_test_reply(TOPIC, 25, "hidden 2").moderators_only(),
        create_test_reply(TOPIC, 20, "public 2"),
        create_test_reply(TOPIC + 1, 1, "other topic"),
    ];
    for reply in replies {
        repo.add_reply(reply).await.unwrap();
    }
}

fn bodies(replies: &[Reply]) -> Vec<&str> {
    replies.iter().map(|reply| reply.body.as_str()).collect()
}

#[tokio::test]
async fn test_add_reply_assigns_id_and_commits() {
    let (store, repo) = setup();

    let reply = assert_ok!(repo.add_reply(create_test_reply(TOPIC, 0, "hello")).await);

    assert!(reply.id > 0);
    assert_eq!(store.pending_changes().await, 0);
    assert_eq!(repo.get_reply(reply.id).await.unwrap(), Some(reply));
}

#[tokio::test]
async fn test_get_reply_not_found_is_none() {
    let (_, repo) = setup();

    let result = repo.get_reply(404).await;

    assert!(matches!(result, Ok(None)));
}

#[tokio::test]
async fn test_members_do_not_see_moderator_replies() {
    let (_, repo) = setup();
    seed_mixed_topic(&repo).await;

    let page = repo.get_replies(TOPIC, 1, 10, false).await.unwrap();

    assert_eq!(page.total_items, 3);
    assert_eq!(bodies(&page.items), vec!["public 1", "public 2", "public 3"]);
}

#[tokio::test]
async fn test_moderators_see_every_reply_in_time_order() {
    let (_, repo) = setup();
    seed_mixed_topic(&repo).await;

    let page = repo.get_replies(TOPIC, 1, 10, true).await.unwrap();

    assert_eq!(page.total_items, 5);
    assert_eq!(page.total_pages, 1);
    assert_eq!(
        bodies(&page.items),
        vec!["hidden 1", "public 1", "public 2", "hidden 2", "public 3"]
    );
}

#[tokio::test]
async fn test_out_of_range_pages_are_clamped() {
    let (_, repo) = setup();
    for minute in (1..=35).rev() {
        repo.add_reply(create_test_reply(TOPIC, minute, &format!("r{minute}")))
            .await
            .unwrap();
    }

    let first = repo.get_replies(TOPIC, 0, 10, false).await.unwrap();
    let last = repo.get_replies(TOPIC, 999, 10, false).await.unwrap();

    assert_eq!(first, repo.get_replies(TOPIC, 1, 10, false).await.unwrap());
    assert_eq!(last, repo.get_replies(TOPIC, 4, 10, false).await.unwrap());
    assert_eq!(last.page, 4);
    assert_eq!(bodies(&last.items), vec!["r31", "r32", "r33", "r34", "r35"]);
}

#[tokio::test]
async fn test_empty_topic_has_one_page() {
    let (_, repo) = setup();

    let page = repo.get_replies(TOPIC, 5, 10, false).await.unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.total_items, 0);
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn test_zero_page_size_is_rejected() {
    let (_, repo) = setup();

    let err = assert_err!(repo.get_replies(TOPIC, 1, 0, false).await);

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_update_reply_commits_edit() {
    let (_, repo) = setup();
    let mut reply = repo.add_reply(create_test_reply(TOPIC, 0, "draft")).await.unwrap();

    reply.edit("final", start() + Duration::hours(1));
    assert_ok!(repo.update_reply(&reply).await);

    let stored = repo.get_reply(reply.id).await.unwrap().unwrap();
    assert_eq!(stored.body, "final");
    assert_eq!(stored.topic_id(), TOPIC);
}

#[tokio::test]
async fn test_update_of_unstored_reply_is_noop() {
    let (store, repo) = setup();
    let mut ghost = create_test_reply(TOPIC, 0, "ghost");
    ghost.id = 77;

    assert_ok!(repo.update_reply(&ghost).await);

    assert_eq!(repo.get_reply(77).await.unwrap(), None);
    assert_eq!(store.pending_changes().await, 0);
}

#[tokio::test]
async fn test_delete_reply() {
    let (_, repo) = setup();
    let reply = repo.add_reply(create_test_reply(TOPIC, 0, "bye")).await.unwrap();

    assert_ok!(repo.delete_reply(&reply).await);

    assert_eq!(repo.get_reply(reply.id).await.unwrap(), None);
}

#[tokio::test]
async fn test_reply_count_and_last_reply_respect_visibility() {
    let (_, repo) = setup();
    seed_mixed_topic(&repo).await;
    repo.add_reply(create_test_reply(TOPIC, 40, "late hidden").moderators_only())
        .await
        .unwrap();

    assert_eq!(repo.get_reply_count(TOPIC, false).await.unwrap(), 3);
    assert_eq!(repo.get_reply_count(TOPIC, true).await.unwrap(), 6);

    let member_last = repo.get_last_reply(TOPIC, false).await.unwrap().unwrap();
    let moderator_last = repo.get_last_reply(TOPIC, true).await.unwrap().unwrap();
    assert_eq!(member_last.body, "public 3");
    assert_eq!(moderator_last.body, "late hidden");
}

#[tokio::test]
async fn test_rejected_add_does_not_block_later_writes() {
    let (store, repo) = setup();
    let users = UserStore::new(store.clone(), Arc::new(FixedClock::new(start())));
    let reply = repo.add_reply(create_test_reply(TOPIC, 0, "first")).await.unwrap();

    let err = assert_err!(repo.add_reply(reply.clone()).await);
    assert!(matches!(err, AppError::StorageFailure(_)));
    assert_eq!(store.pending_changes().await, 0);

    let bob = assert_ok!(users.add_user(User::new("Bob", "bob@example.com", start())).await);
    assert_eq!(users.get_user("bob").await.unwrap(), Some(bob));

    let second = assert_ok!(repo.add_reply(create_test_reply(TOPIC, 1, "second")).await);
    assert_eq!(second.id, reply.id + 1);
    assert_eq!(repo.get_reply_count(TOPIC, false).await.unwrap(), 2);
}
