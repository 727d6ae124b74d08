//! Entity kinds known to the store.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use domain::{Ban, Ignore, Reply, Role, User, UserActivityLogItem};

/// Rows of one entity kind keyed by identity
pub type Table<T> = BTreeMap<i64, T>;

/// The collections the store manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Reply,
    User,
    Role,
    Ban,
    Ignore,
    ActivityLog,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Reply => "Reply",
            EntityKind::User => "User",
            EntityKind::Role => "Role",
            EntityKind::Ban => "Ban",
            EntityKind::Ignore => "Ignore",
            EntityKind::ActivityLog => "UserActivityLogItem",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every table, as held in memory and written to snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub replies: Table<Reply>,
    #[serde(default)]
    pub users: Table<User>,
    #[serde(default)]
    pub roles: Table<Role>,
    #[serde(default)]
    pub bans: Table<Ban>,
    #[serde(default)]
    pub ignores: Table<Ignore>,
    #[serde(default)]
    pub activity_log: Table<UserActivityLogItem>,
}

/// A storable entity with an integer identity.
///
/// An id of 0 means "not stored yet"; the store assigns one on insert.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> i64;

    fn set_id(&mut self, id: i64);

    fn table(data: &Dataset) -> &Table<Self>;

    fn table_mut(data: &mut Dataset) -> &mut Table<Self>;
}

macro_rules! entity {
    ($ty:ty, $kind:ident, $table:ident) => {
        impl Entity for $ty {
            const KIND: EntityKind = EntityKind::$kind;

            fn id(&self) -> i64 {
                self.id
            }

            fn set_id(&mut self, id: i64) {
                self.id = id;
            }

            fn table(data: &Dataset) -> &Table<Self> {
                &data.$table
            }

            fn table_mut(data: &mut Dataset) -> &mut Table<Self> {
                &mut data.$table
            }
        }
    };
}

entity!(Reply, Reply, replies);
entity!(User, User, users);
entity!(Role, Role, roles);
entity!(Ban, Ban, bans);
entity!(Ignore, Ignore, ignores);
entity!(UserActivityLogItem, ActivityLog, activity_log);
