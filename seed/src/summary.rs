//! Read-only summaries logged after seeding.

use tracing::info;

use common::AppResult;
use domain::{UserStats, FIRST_PAGE};
use forum_repository::{ReplyRepository, UserRepository};

#[derive(Debug, PartialEq)]
pub struct UserSummary {
    pub stats: UserStats,
    pub staff: Vec<String>,
    pub online: Vec<String>,
}

impl UserSummary {
    pub fn log(&self) {
        let s = &self.stats;
        info!("Users: {} total, {} banned", s.total_users, s.banned_users);
        info!(
            "Logged in: {} day / {} week / {} month / {} year",
            s.logged_in_last_day, s.logged_in_last_week, s.logged_in_last_month, s.logged_in_last_year
        );
        info!(
            "New users: {} day / {} week / {} month / {} year",
            s.new_users_last_day, s.new_users_last_week, s.new_users_last_month, s.new_users_last_year
        );
        info!("Staff: {}", self.staff.join(", "));
        info!("Online now: {}", self.online.join(", "));
    }
}

#[derive(Debug, PartialEq)]
pub struct TopicSummary {
    pub topic_id: i64,
    pub visible_replies: u64,
    pub hidden_replies: u64,
    /// Pages a moderator sees at the requested page size
    pub pages: u64,
    pub last_author: Option<String>,
}

impl TopicSummary {
    pub fn log(&self) {
        info!(
            "Topic {}: {} replies ({} moderators-only) on {} pages, last by {}",
            self.topic_id,
            self.visible_replies + self.hidden_replies,
            self.hidden_replies,
            self.pages,
            self.last_author.as_deref().unwrap_or("nobody")
        );
    }
}

pub async fn summarize_users(users: &dyn UserRepository) -> AppResult<UserSummary> {
    let stats = users.get_user_statistics().await?;
    let staff = users.get_moderators_and_administrators().await?;
    let online = users.get_logged_in_users().await?;

    Ok(UserSummary {
        stats,
        staff: staff.into_iter().map(|u| u.username).collect(),
        online: online.into_iter().map(|u| u.username).collect(),
    })
}

/// Reply counts as seen by a moderator, split by visibility
pub async fn summarize_topic(
    replies: &dyn ReplyRepository,
    topic_id: i64,
    page_size: u64,
) -> AppResult<TopicSummary> {
    let visible = replies.get_reply_count(topic_id, false).await?;
    let all = replies.get_reply_count(topic_id, true).await?;
    let first_page = replies.get_replies(topic_id, FIRST_PAGE as i64, page_size, true).await?;
    let last = replies.get_last_reply(topic_id, true).await?;

    Ok(TopicSummary {
        topic_id,
        visible_replies: visible,
        hidden_replies: all.saturating_sub(visible),
        pages: first_page.total_pages,
        last_author: last.map(|reply| reply.author_name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU64;

    use chrono::Utc;
    use common::AppError;
    use domain::{CollectionPage, PageWindow, Reply, User, DEFAULT_PAGE_SIZE};
    use forum_repository::repository::{MockReplyRepository, MockUserRepository};
    use mockall::predicate::eq;

    #[tokio::test]
    async fn user_summary_collects_names() {
        let mut users = MockUserRepository::new();
        users.expect_get_user_statistics().times(1).returning(|| {
            Ok(UserStats {
                total_users: 3,
                ..Default::default()
            })
        });
        users
            .expect_get_moderators_and_administrators()
            .returning(|| Ok(vec![User::new("Admin", "admin@example.com", Utc::now())]));
        users.expect_get_logged_in_users().returning(|| Ok(vec![]));

        let summary = summarize_users(&users).await.unwrap();

        assert_eq!(summary.stats.total_users, 3);
        assert_eq!(summary.staff, vec!["Admin"]);
        assert!(summary.online.is_empty());
    }

    #[tokio::test]
    async fn topic_summary_splits_hidden_replies() {
        let mut replies = MockReplyRepository::new();
        replies
            .expect_get_reply_count()
            .with(eq(4), eq(false))
            .returning(|_, _| Ok(7));
        replies
            .expect_get_reply_count()
            .with(eq(4), eq(true))
            .returning(|_, _| Ok(9));
        replies
            .expect_get_replies()
            .with(eq(4), eq(1), eq(DEFAULT_PAGE_SIZE), eq(true))
            .returning(|_, _, per_page, _| {
                let per_page = NonZeroU64::new(per_page).unwrap();
                Ok(CollectionPage::new(Vec::new(), 9, PageWindow::resolve(1, per_page, 9)))
            });
        replies
            .expect_get_last_reply()
            .with(eq(4), eq(true))
            .returning(|topic_id, _| Ok(Some(Reply::new(topic_id, 2, "Moderator", "closing", Utc::now()))));

        let summary = summarize_topic(&replies, 4, DEFAULT_PAGE_SIZE).await.unwrap();

        assert_eq!(
            summary,
            TopicSummary {
                topic_id: 4,
                visible_replies: 7,
                hidden_replies: 2,
                pages: 1,
                last_author: Some("Moderator".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn topic_summary_propagates_errors() {
        let mut replies = MockReplyRepository::new();
        replies
            .expect_get_reply_count()
            .returning(|_, _| Err(AppError::storage("disk gone")));

        let result = summarize_topic(&replies, 1, DEFAULT_PAGE_SIZE).await;

        assert!(matches!(result, Err(AppError::StorageFailure(_))));
    }
}
