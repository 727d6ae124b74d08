//! Reply repository implementation.

use std::sync::Arc;

use async_trait::async_trait;

use common::AppResult;
use domain::{CollectionPage, Reply};

use crate::pagination::{fetch_page, items_per_page};
use crate::store::{EntityStore, Query};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Reply repository trait for dependency injection.
///
/// Replies flagged moderators-only are left out of every read unless the
/// caller passes `is_moderator = true`.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReplyRepository: Send + Sync {
    /// Store a new reply and commit; returns it with its assigned id
    async fn add_reply(&self, reply: Reply) -> AppResult<Reply>;

    /// Commit field changes made to a stored reply (no-op if it is not stored)
    async fn update_reply(&self, reply: &Reply) -> AppResult<()>;

    /// Remove a reply and commit
    async fn delete_reply(&self, reply: &Reply) -> AppResult<()>;

    /// Find reply by ID
    async fn get_reply(&self, id: i64) -> AppResult<Option<Reply>>;

    /// One page of a topic's replies, oldest first
    async fn get_replies(
        &self,
        topic_id: i64,
        page: i64,
        items_per_page: u64,
        is_moderator: bool,
    ) -> AppResult<CollectionPage<Reply>>;

    /// Number of replies in a topic visible to the viewer
    async fn get_reply_count(&self, topic_id: i64, is_moderator: bool) -> AppResult<u64>;

    /// Most recent reply in a topic visible to the viewer
    async fn get_last_reply(&self, topic_id: i64, is_moderator: bool) -> AppResult<Option<Reply>>;
}

/// Concrete implementation of ReplyRepository over an entity store
pub struct ReplyStore<S> {
    store: Arc<S>,
}

impl<S: EntityStore> ReplyStore<S> {
    /// Create new repository instance
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

/// Replies of a topic visible to the viewer, oldest first
fn topic_replies(topic_id: i64, is_moderator: bool) -> Query<Reply> {
    Query::new()
        .filter(move |reply: &Reply| reply.topic_id() == topic_id)
        .filter(move |reply: &Reply| reply.is_visible_to(is_moderator))
        .order_by(|reply: &Reply| reply.posted_at)
        .order_by(|reply: &Reply| reply.id)
}

#[async_trait]
impl<S: EntityStore + 'static> ReplyRepository for ReplyStore<S> {
    async fn add_reply(&self, reply: Reply) -> AppResult<Reply> {
        let reply = self.store.add(reply).await?;
        self.store.commit().await?;
        tracing::info!("Added reply {} to topic {}", reply.id, reply.topic_id());
        Ok(reply)
    }

    async fn update_reply(&self, reply: &Reply) -> AppResult<()> {
        self.store.update(reply.clone()).await?;
        self.store.commit().await
    }

    async fn delete_reply(&self, reply: &Reply) -> AppResult<()> {
        self.store.remove(reply).await?;
        self.store.commit().await?;
        tracing::info!("Deleted reply {} from topic {}", reply.id, reply.topic_id());
        Ok(())
    }

    async fn get_reply(&self, id: i64) -> AppResult<Option<Reply>> {
        self.store.find(id).await
    }

    async fn get_replies(
        &self,
        topic_id: i64,
        page: i64,
        per_page: u64,
        is_moderator: bool,
    ) -> AppResult<CollectionPage<Reply>> {
        let per_page = items_per_page(per_page)?;
        let query = topic_replies(topic_id, is_moderator);
        let total = self.store.count(&query).await?;

        fetch_page(self.store.as_ref(), query, page, per_page, total).await
    }

    async fn get_reply_count(&self, topic_id: i64, is_moderator: bool) -> AppResult<u64> {
        self.store.count(&topic_replies(topic_id, is_moderator)).await
    }

    async fn get_last_reply(&self, topic_id: i64, is_moderator: bool) -> AppResult<Option<Reply>> {
        let query = Query::new()
            .filter(move |reply: &Reply| reply.topic_id() == topic_id)
            .filter(move |reply: &Reply| reply.is_visible_to(is_moderator))
            .order_by_desc(|reply: &Reply| reply.posted_at)
            .order_by_desc(|reply: &Reply| reply.id)
            .take(1);

        Ok(self.store.fetch(&query).await?.into_iter().next())
    }
}
