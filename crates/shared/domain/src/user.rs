//! User domain entity and the records hanging off a username.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::is_staff_role;

/// Case-insensitive username comparison used for every identity lookup
pub fn same_username(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// A named role that can be granted to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
        }
    }

    /// Check the role name, ignoring case
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// User domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// Stored casing is preserved; equality is case-insensitive
    pub username: String,
    pub email: String,
    pub joined_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl User {
    /// Create a new user that joined (and last logged in) at `joined_at`
    pub fn new(username: impl Into<String>, email: impl Into<String>, joined_at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            username: username.into(),
            email: email.into(),
            joined_at,
            last_login_at: joined_at,
            roles: Vec::new(),
        }
    }

    /// Check the username, ignoring case
    pub fn is_named(&self, username: &str) -> bool {
        same_username(&self.username, username)
    }

    /// Check if user holds a role (case-insensitive)
    pub fn in_role(&self, role_name: &str) -> bool {
        self.roles.iter().any(|role| role.is_named(role_name))
    }

    /// Check if user is a moderator or administrator
    pub fn is_staff(&self) -> bool {
        self.roles.iter().any(|role| is_staff_role(&role.name))
    }

    /// Record a login
    pub fn touch_login(&mut self, at: DateTime<Utc>) {
        self.last_login_at = at;
    }
}

/// An active ban on a username
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ban {
    pub id: i64,
    pub username: String,
    pub reason: String,
    pub banned_at: DateTime<Utc>,
}

impl Ban {
    pub fn new(username: impl Into<String>, reason: impl Into<String>, banned_at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            username: username.into(),
            reason: reason.into(),
            banned_at,
        }
    }
}

/// Directed "initiator ignores target" relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ignore {
    pub id: i64,
    /// The user doing the ignoring
    pub username: String,
    pub ignored_username: String,
}

impl Ignore {
    pub fn new(username: impl Into<String>, ignored_username: impl Into<String>) -> Self {
        Self {
            id: 0,
            username: username.into(),
            ignored_username: ignored_username.into(),
        }
    }

    /// Both ends match, ignoring case
    pub fn is_pair(&self, username: &str, ignored_username: &str) -> bool {
        same_username(&self.username, username) && same_username(&self.ignored_username, ignored_username)
    }
}

/// Entry in a user's activity log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserActivityLogItem {
    pub id: i64,
    pub username: String,
    /// Free-text category, e.g. "Warning" or "Ban"
    pub activity_type: String,
    pub occurred_at: DateTime<Utc>,
    pub detail: String,
}

impl UserActivityLogItem {
    pub fn new(
        username: impl Into<String>,
        activity_type: impl Into<String>,
        occurred_at: DateTime<Utc>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            username: username.into(),
            activity_type: activity_type.into(),
            occurred_at,
            detail: detail.into(),
        }
    }
}

/// Aggregate user counters computed against one reference instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub banned_users: u64,
    pub logged_in_last_day: u64,
    pub logged_in_last_week: u64,
    pub logged_in_last_month: u64,
    pub logged_in_last_year: u64,
    pub new_users_last_day: u64,
    pub new_users_last_week: u64,
    pub new_users_last_month: u64,
    pub new_users_last_year: u64,
    pub total_users: u64,
}
