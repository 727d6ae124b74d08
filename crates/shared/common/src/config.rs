//! Shared configuration structures.

use std::path::PathBuf;

use domain::DEFAULT_PRESENCE_WINDOW_MINUTES;
use serde::{Deserialize, Serialize};

/// Entity store configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoreConfig {
    /// JSON snapshot written on every commit; `None` keeps data in memory only
    pub snapshot_path: Option<PathBuf>,
}

/// Presence (who is online) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PresenceConfig {
    /// Trailing window in minutes in which a login counts as online
    pub window_minutes: i64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            window_minutes: DEFAULT_PRESENCE_WINDOW_MINUTES,
        }
    }
}
