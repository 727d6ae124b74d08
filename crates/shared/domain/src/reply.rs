//! Reply domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reply posted in a topic.
///
/// The owning topic is fixed at construction; there is no setter for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    /// Store-assigned identity (0 until added)
    pub id: i64,
    topic_id: i64,
    pub user_id: i64,
    pub author_name: String,
    pub body: String,
    pub ip_address: String,
    pub posted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
    /// Hidden from everyone except moderators
    pub is_moderators_only: bool,
}

impl Reply {
    /// Create a new, not yet stored reply
    pub fn new(
        topic_id: i64,
        user_id: i64,
        author_name: impl Into<String>,
        body: impl Into<String>,
        posted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            topic_id,
            user_id,
            author_name: author_name.into(),
            body: body.into(),
            ip_address: String::new(),
            posted_at,
            edited_at: None,
            is_moderators_only: false,
        }
    }

    /// Mark the reply as visible to moderators only
    pub fn moderators_only(mut self) -> Self {
        self.is_moderators_only = true;
        self
    }

    pub fn topic_id(&self) -> i64 {
        self.topic_id
    }

    /// Replace the body and stamp the edit time
    pub fn edit(&mut self, body: impl Into<String>, at: DateTime<Utc>) {
        self.body = body.into();
        self.edited_at = Some(at);
    }

    /// Whether a viewer with the given moderation rights may see this reply
    pub fn is_visible_to(&self, is_moderator: bool) -> bool {
        is_moderator || !self.is_moderators_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moderators_only_replies_hidden_from_members() {
        let reply = Reply::new(7, 1, "alice", "hidden", Utc::now()).moderators_only();
        assert!(!reply.is_visible_to(false));
        assert!(reply.is_visible_to(true));
        assert_eq!(reply.topic_id(), 7);
    }

    #[test]
    fn edit_stamps_time() {
        let posted = Utc::now();
        let mut reply = Reply::new(1, 1, "alice", "first", posted);
        reply.edit("second", posted);
        assert_eq!(reply.body, "second");
        assert_eq!(reply.edited_at, Some(posted));
    }
}
