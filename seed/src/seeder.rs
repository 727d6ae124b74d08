//! Deterministic demo data written through the repositories.

use chrono::{DateTime, Duration, Utc};

use common::AppResult;
use domain::{Reply, User, ROLE_ADMINISTRATOR, ROLE_MODERATOR};
use forum_repository::{Durability, ReplyRepository, UserRepository};

/// How much demo data to create
#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub users: u32,
    pub topics: i64,
    pub replies_per_topic: u32,
}

/// Counts of what a seed run added
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: u32,
    pub replies: u32,
    pub bans: u32,
    pub warnings: u32,
}

fn username(n: u32) -> String {
    match n {
        1 => "Admin".to_string(),
        2 => "Moderator".to_string(),
        n => format!("Member{n:03}"),
    }
}

/// Seed users, staff roles, topic replies and moderation history.
///
/// The first user is an administrator and the second a moderator. The last
/// member is banned and the one before it warned. Every fifth reply in a
/// topic is moderators-only.
pub async fn seed(
    users: &dyn UserRepository,
    replies: &dyn ReplyRepository,
    plan: &SeedPlan,
    now: DateTime<Utc>,
) -> AppResult<SeedReport> {
    let mut report = SeedReport::default();

    for role in [ROLE_ADMINISTRATOR, ROLE_MODERATOR] {
        if !users.get_roles().await?.iter().any(|r| r.is_named(role)) {
            users.add_role(role).await?;
        }
    }

    let mut authors = Vec::new();
    for n in 1..=plan.users {
        let name = username(n);
        if let Some(existing) = users.get_user(&name).await? {
            tracing::debug!("Keeping existing user {}", existing.username);
            authors.push(existing);
            continue;
        }

        let mut user = User::new(
            name.as_str(),
            format!("{}@example.com", name.to_ascii_lowercase()),
            now - Duration::days(i64::from(n) * 11),
        );
        user.touch_login(now - Duration::minutes(i64::from(n) * 37));

        let mut user = users.add_user(user).await?;
        let role = match n {
            1 => Some(ROLE_ADMINISTRATOR),
            2 => Some(ROLE_MODERATOR),
            _ => None,
        };
        if let Some(role) = role {
            users.add_role_to_user(&mut user, role).await?;
            users.update_user(&user).await?;
        }

        report.users += 1;
        authors.push(user);
    }

    if !authors.is_empty() {
        for topic_id in 1..=plan.topics {
            for i in 0..plan.replies_per_topic {
                let author = &authors[i as usize % authors.len()];
                let posted_at = now - Duration::hours(topic_id * 24) + Duration::minutes(i64::from(i) * 7);
                let mut reply = Reply::new(
                    topic_id,
                    author.id,
                    author.username.as_str(),
                    format!("Reply {} in topic {}", i + 1, topic_id),
                    posted_at,
                );
                if (i + 1) % 5 == 0 {
                    reply = reply.moderators_only();
                }
                replies.add_reply(reply).await?;
                report.replies += 1;
            }
        }
    }

    if plan.users >= 4 {
        let banned = username(plan.users);
        if !users.is_banned(&banned).await? {
            users.ban_user(&banned, "Spam").await?;
            report.bans += 1;
        }

        let warned = username(plan.users - 1);
        users.warn_user(&warned, "Off-topic posting").await?;
        users.ignore_user(&warned, &username(1), Durability::Deferred).await?;
        users.commit().await?;
        report.warnings += 1;
    }

    Ok(report)
}
