//! Forum repository configuration.

use std::env;
use std::path::PathBuf;

use chrono::Duration;
use common::{PresenceConfig, StoreConfig};

/// Repository layer configuration.
#[derive(Debug, Clone, Default)]
pub struct ForumConfig {
    pub store: StoreConfig,
    pub presence: PresenceConfig,
}

impl ForumConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            store: StoreConfig {
                snapshot_path: env::var("FORUM_SNAPSHOT_PATH")
                    .ok()
                    .filter(|path| !path.trim().is_empty())
                    .map(PathBuf::from),
            },
            presence: PresenceConfig {
                window_minutes: env::var("FORUM_PRESENCE_WINDOW_MINUTES")
                    .ok()
                    .and_then(|minutes| parse_window_minutes(&minutes))
                    .unwrap_or(defaults.presence.window_minutes),
            },
        }
    }
}

/// A positive minute count that fits a `Duration`
fn parse_window_minutes(raw: &str) -> Option<i64> {
    raw.trim()
        .parse()
        .ok()
        .filter(|minutes: &i64| *minutes > 0 && Duration::try_minutes(*minutes).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_data_in_memory() {
        let config = ForumConfig::default();
        assert!(config.store.snapshot_path.is_none());
        assert_eq!(config.presence.window_minutes, domain::DEFAULT_PRESENCE_WINDOW_MINUTES);
    }

    #[test]
    fn window_minutes_must_be_positive_and_in_range() {
        assert_eq!(parse_window_minutes("15"), Some(15));
        assert_eq!(parse_window_minutes(" 30 "), Some(30));
        assert_eq!(parse_window_minutes("0"), None);
        assert_eq!(parse_window_minutes("-10"), None);
        assert_eq!(parse_window_minutes("soon"), None);
        assert_eq!(parse_window_minutes(&(i64::MAX / 1000).to_string()), None);
    }
}
