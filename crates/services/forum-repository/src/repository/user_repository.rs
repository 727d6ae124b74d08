//! User repository implementation.
//!
//! Every username comparison is ASCII case-insensitive and never changes
//! the stored casing.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Months, Utc};

use common::{single_match, AppResult, PresenceConfig};
use domain::{
    is_offense, same_username, Ban, CollectionPage, Ignore, Role, User, UserActivityLogItem,
    UserStats, ACTIVITY_BAN, ACTIVITY_WARNING, DEFAULT_PRESENCE_WINDOW_MINUTES,
};

use super::Durability;
use crate::clock::Clock;
use crate::pagination::{fetch_page, items_per_page};
use crate::store::{Entity, EntityStore, Query};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Single-match operations (`get_stored_username`, `add_role_to_user`,
/// `unignore_user`, `unban_user`) fail with `NotFound` when nothing matches
/// and `Ambiguous` when several records do.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new user and commit; returns it with its assigned id
    async fn add_user(&self, user: User) -> AppResult<User>;

    /// Commit field changes made to a stored user, including role changes
    async fn update_user(&self, user: &User) -> AppResult<()>;

    /// Remove a user; `Durability::Deferred` leaves the removal staged
    async fn delete_user(&self, user: &User, durability: Durability) -> AppResult<()>;

    /// Find user by username (case-insensitive)
    async fn get_user(&self, username: &str) -> AppResult<Option<User>>;

    /// Find user by ID
    async fn get_user_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// Check whether a username is taken (case-insensitive)
    async fn check_user_exists(&self, username: &str) -> AppResult<bool>;

    /// Username exactly as stored for a case-insensitive match
    async fn get_stored_username(&self, username: &str) -> AppResult<String>;

    /// One page of all users ordered by username
    async fn get_users(&self, page: i64, items_per_page: u64) -> AppResult<CollectionPage<User>>;

    /// Users who logged in within the presence window, ordered by username
    async fn get_logged_in_users(&self) -> AppResult<Vec<User>>;

    /// Create a role and commit
    async fn add_role(&self, name: &str) -> AppResult<Role>;

    /// All roles ordered by name
    async fn get_roles(&self) -> AppResult<Vec<Role>>;

    /// Attach a role to the user in memory; persist with `update_user`
    async fn add_role_to_user(&self, user: &mut User, role_name: &str) -> AppResult<()>;

    /// Detach a role from the user in memory; returns whether it was held
    fn remove_role_from_user(&self, user: &mut User, role_name: &str) -> bool;

    /// User counters over trailing day/week/month/year windows
    async fn get_user_statistics(&self) -> AppResult<UserStats>;

    /// Users holding the Moderator or Administrator role
    async fn get_moderators_and_administrators(&self) -> AppResult<Vec<User>>;

    /// Record that `username` ignores `ignored_username`
    async fn ignore_user(
        &self,
        username: &str,
        ignored_username: &str,
        durability: Durability,
    ) -> AppResult<Ignore>;

    /// Remove the ignore record for the pair and commit
    async fn unignore_user(&self, username: &str, ignored_username: &str) -> AppResult<()>;

    /// Usernames ignored by `username`
    async fn get_ignored_users(&self, username: &str) -> AppResult<Vec<String>>;

    /// Whether `username` ignores `ignored_username`
    async fn is_ignoring(&self, username: &str, ignored_username: &str) -> AppResult<bool>;

    /// Ban a username, logging a Ban activity; an existing ban is returned as is
    async fn ban_user(&self, username: &str, reason: &str) -> AppResult<Ban>;

    /// Remove the ban on a username and commit
    async fn unban_user(&self, username: &str) -> AppResult<()>;

    /// Whether a ban exists for the username
    async fn is_banned(&self, username: &str) -> AppResult<bool>;

    /// Append an activity log entry and commit
    async fn log_activity(&self, item: UserActivityLogItem) -> AppResult<UserActivityLogItem>;

    /// Log a Warning activity for the username
    async fn warn_user(&self, username: &str, detail: &str) -> AppResult<UserActivityLogItem>;

    /// Warnings and bans recorded for the username, oldest first
    async fn get_offense_history(&self, username: &str) -> AppResult<Vec<UserActivityLogItem>>;

    /// Commit changes staged with `Durability::Deferred`
    async fn commit(&self) -> AppResult<()>;
}

/// Concrete implementation of UserRepository over an entity store
pub struct UserStore<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    presence_window: Duration,
}

impl<S: EntityStore> UserStore<S> {
    /// Create new repository instance with the default presence window
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(store, clock, &PresenceConfig::default())
    }

    /// Create a repository with the configured presence window.
    ///
    /// A window that is not positive or does not fit a `Duration` falls
    /// back to the default.
    pub fn with_config(store: Arc<S>, clock: Arc<dyn Clock>, presence: &PresenceConfig) -> Self {
        Self {
            store,
            clock,
            presence_window: presence_window(presence.window_minutes),
        }
    }

    async fn finish<T: Entity>(&self, durability: Durability, what: &str, entity: &T) -> AppResult<()> {
        match durability {
            Durability::Immediate => {
                self.store.commit().await?;
                tracing::info!("{} {} {}", what, T::KIND, entity.id());
            }
            Durability::Deferred => {
                tracing::debug!("{} {} {} staged without commit", what, T::KIND, entity.id());
            }
        }
        Ok(())
    }
}

fn presence_window(minutes: i64) -> Duration {
    match Duration::try_minutes(minutes) {
        Some(window) if minutes > 0 => window,
        _ => {
            tracing::warn!(
                "Presence window of {} minutes is out of range, using {}",
                minutes,
                DEFAULT_PRESENCE_WINDOW_MINUTES
            );
            Duration::minutes(DEFAULT_PRESENCE_WINDOW_MINUTES)
        }
    }
}

/// Users whose name matches, ignoring case
fn users_named(username: &str) -> Query<User> {
    let username = username.to_string();
    Query::new().filter(move |user: &User| user.is_named(&username))
}

/// Sort by username ignoring case, with the exact name as tiebreak
fn by_username(query: Query<User>) -> Query<User> {
    query
        .order_by(|user: &User| user.username.to_ascii_lowercase())
        .order_by(|user: &User| user.username.clone())
}

fn ignores_of(username: &str) -> Query<Ignore> {
    let username = username.to_string();
    Query::new().filter(move |ignore: &Ignore| same_username(&ignore.username, &username))
}

fn ignore_pair(username: &str, ignored_username: &str) -> Query<Ignore> {
    let (username, ignored) = (username.to_string(), ignored_username.to_string());
    Query::new().filter(move |ignore: &Ignore| ignore.is_pair(&username, &ignored))
}

fn bans_of(username: &str) -> Query<Ban> {
    let username = username.to_string();
    Query::new().filter(move |ban: &Ban| same_username(&ban.username, &username))
}

/// Users with `field` at or after `cutoff`
fn since(field: fn(&User) -> DateTime<Utc>, cutoff: DateTime<Utc>) -> Query<User> {
    Query::new().filter(move |user: &User| field(user) >= cutoff)
}

/// Window starts shared by every counter of one statistics call
#[derive(Debug, Clone, Copy)]
struct Cutoffs {
    day: DateTime<Utc>,
    week: DateTime<Utc>,
    month: DateTime<Utc>,
    year: DateTime<Utc>,
}

impl Cutoffs {
    fn at(now: DateTime<Utc>) -> Self {
        Self {
            day: now - Duration::days(1),
            week: now - Duration::days(7),
            month: now.checked_sub_months(Months::new(1)).unwrap_or(DateTime::<Utc>::MIN_UTC),
            year: now.checked_sub_months(Months::new(12)).unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }
}

#[async_trait]
impl<S: EntityStore + 'static> UserRepository for UserStore<S> {
    async fn add_user(&self, user: User) -> AppResult<User> {
        let user = self.store.add(user).await?;
        self.store.commit().await?;
        tracing::info!("Added user {} ({})", user.username, user.id);
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> AppResult<()> {
        self.store.update(user.clone()).await?;
        self.store.commit().await
    }

    async fn delete_user(&self, user: &User, durability: Durability) -> AppResult<()> {
        self.store.remove(user).await?;
        self.finish(durability, "Deleted", user).await
    }

    async fn get_user(&self, username: &str) -> AppResult<Option<User>> {
        let users = self.store.fetch(&users_named(username).order_by(|user: &User| user.id)).await?;
        Ok(users.into_iter().next())
    }

    async fn get_user_by_id(&self, id: i64) -> AppResult<Option<User>> {
        self.store.find(id).await
    }

    async fn check_user_exists(&self, username: &str) -> AppResult<bool> {
        Ok(self.store.count(&users_named(username)).await? > 0)
    }

    async fn get_stored_username(&self, username: &str) -> AppResult<String> {
        let users = self.store.fetch(&users_named(username)).await?;
        let user = single_match(users, "User", username)?;
        Ok(user.username)
    }

    async fn get_users(&self, page: i64, per_page: u64) -> AppResult<CollectionPage<User>> {
        let per_page = items_per_page(per_page)?;
        let query = by_username(Query::new());
        let total = self.store.count(&query).await?;

        fetch_page(self.store.as_ref(), query, page, per_page, total).await
    }

    async fn get_logged_in_users(&self) -> AppResult<Vec<User>> {
        let cutoff = self
            .clock
            .now()
            .checked_sub_signed(self.presence_window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let query = by_username(since(|user| user.last_login_at, cutoff));
        self.store.fetch(&query).await
    }

    async fn add_role(&self, name: &str) -> AppResult<Role> {
        let role = self.store.add(Role::new(name)).await?;
        self.store.commit().await?;
        tracing::info!("Added role {} ({})", role.name, role.id);
        Ok(role)
    }

    async fn get_roles(&self) -> AppResult<Vec<Role>> {
        let query = Query::new()
            .order_by(|role: &Role| role.name.to_ascii_lowercase())
            .order_by(|role: &Role| role.id);
        self.store.fetch(&query).await
    }

    async fn add_role_to_user(&self, user: &mut User, role_name: &str) -> AppResult<()> {
        let name = role_name.to_string();
        let roles = self
            .store
            .fetch(&Query::new().filter(move |role: &Role| role.is_named(&name)))
            .await?;
        let role = single_match(roles, "Role", role_name)?;

        if !user.roles.iter().any(|held| held.id == role.id) {
            tracing::debug!("Granting role {} to {}", role.name, user.username);
            user.roles.push(role);
        }
        Ok(())
    }

    fn remove_role_from_user(&self, user: &mut User, role_name: &str) -> bool {
        let before = user.roles.len();
        user.roles.retain(|role| !role.is_named(role_name));
        user.roles.len() != before
    }

    async fn get_user_statistics(&self) -> AppResult<UserStats> {
        let now = self.clock.now();
        let cutoffs = Cutoffs::at(now);

        let banned: HashSet<String> = self
            .store
            .fetch(&Query::<Ban>::new())
            .await?
            .into_iter()
            .map(|ban| ban.username.to_ascii_lowercase())
            .collect();
        let banned_users = Query::new().filter(move |user: &User| banned.contains(&user.username.to_ascii_lowercase()));

        let logged_in = |cutoff| since(|user| user.last_login_at, cutoff);
        let joined = |cutoff| since(|user| user.joined_at, cutoff);

        let stats = UserStats {
            banned_users: self.store.count(&banned_users).await?,
            logged_in_last_day: self.store.count(&logged_in(cutoffs.day)).await?,
            logged_in_last_week: self.store.count(&logged_in(cutoffs.week)).await?,
            logged_in_last_month: self.store.count(&logged_in(cutoffs.month)).await?,
            logged_in_last_year: self.store.count(&logged_in(cutoffs.year)).await?,
            new_users_last_day: self.store.count(&joined(cutoffs.day)).await?,
            new_users_last_week: self.store.count(&joined(cutoffs.week)).await?,
            new_users_last_month: self.store.count(&joined(cutoffs.month)).await?,
            new_users_last_year: self.store.count(&joined(cutoffs.year)).await?,
            total_users: self.store.count(&Query::<User>::new()).await?,
        };

        tracing::debug!("Computed user statistics at {}", now);
        Ok(stats)
    }

    async fn get_moderators_and_administrators(&self) -> AppResult<Vec<User>> {
        let query = by_username(Query::new().filter(|user: &User| user.is_staff()));
        self.store.fetch(&query).await
    }

    async fn ignore_user(
        &self,
        username: &str,
        ignored_username: &str,
        durability: Durability,
    ) -> AppResult<Ignore> {
        let ignore = self.store.add(Ignore::new(username, ignored_username)).await?;
        self.finish(durability, "Added", &ignore).await?;
        Ok(ignore)
    }

    async fn unignore_user(&self, username: &str, ignored_username: &str) -> AppResult<()> {
        let matches = self.store.fetch(&ignore_pair(username, ignored_username)).await?;
        let ignore = single_match(matches, "Ignore", format!("{username} -> {ignored_username}"))?;

        self.store.remove(&ignore).await?;
        self.store.commit().await?;
        tracing::info!("{} no longer ignores {}", ignore.username, ignore.ignored_username);
        Ok(())
    }

    async fn get_ignored_users(&self, username: &str) -> AppResult<Vec<String>> {
        let query = ignores_of(username)
            .order_by(|ignore: &Ignore| ignore.ignored_username.to_ascii_lowercase())
            .order_by(|ignore: &Ignore| ignore.id);
        let ignores = self.store.fetch(&query).await?;
        Ok(ignores.into_iter().map(|ignore| ignore.ignored_username).collect())
    }

    async fn is_ignoring(&self, username: &str, ignored_username: &str) -> AppResult<bool> {
        Ok(self.store.count(&ignore_pair(username, ignored_username)).await? > 0)
    }

    async fn ban_user(&self, username: &str, reason: &str) -> AppResult<Ban> {
        let existing = self.store.fetch(&bans_of(username).order_by(|ban: &Ban| ban.id)).await?;
        if let Some(ban) = existing.into_iter().next() {
            tracing::debug!("{} is already banned", ban.username);
            return Ok(ban);
        }

        let username = match self.get_user(username).await? {
            Some(user) => user.username,
            None => username.to_string(),
        };
        let now = self.clock.now();

        let ban = self.store.add(Ban::new(username.as_str(), reason, now)).await?;
        self.store
            .add(UserActivityLogItem::new(username.as_str(), ACTIVITY_BAN, now, reason))
            .await?;
        self.store.commit().await?;

        tracing::info!("Banned {}: {}", ban.username, ban.reason);
        Ok(ban)
    }

    async fn unban_user(&self, username: &str) -> AppResult<()> {
        let bans = self.store.fetch(&bans_of(username)).await?;
        let ban = single_match(bans, "Ban", username)?;

        self.store.remove(&ban).await?;
        self.store.commit().await?;
        tracing::info!("Unbanned {}", ban.username);
        Ok(())
    }

    async fn is_banned(&self, username: &str) -> AppResult<bool> {
        Ok(self.store.count(&bans_of(username)).await? > 0)
    }

    async fn log_activity(&self, item: UserActivityLogItem) -> AppResult<UserActivityLogItem> {
        let item = self.store.add(item).await?;
        self.store.commit().await?;
        tracing::debug!("Logged {} activity for {}", item.activity_type, item.username);
        Ok(item)
    }

    async fn warn_user(&self, username: &str, detail: &str) -> AppResult<UserActivityLogItem> {
        let item = UserActivityLogItem::new(username, ACTIVITY_WARNING, self.clock.now(), detail);
        self.log_activity(item).await
    }

    async fn get_offense_history(&self, username: &str) -> AppResult<Vec<UserActivityLogItem>> {
        let username = username.to_string();
        let query = Query::new()
            .filter(move |item: &UserActivityLogItem| same_username(&item.username, &username))
            .filter(|item: &UserActivityLogItem| is_offense(&item.activity_type))
            .order_by(|item: &UserActivityLogItem| item.occurred_at)
            .order_by(|item: &UserActivityLogItem| item.id);
        self.store.fetch(&query).await
    }

    async fn commit(&self) -> AppResult<()> {
        self.store.commit().await
    }
}
