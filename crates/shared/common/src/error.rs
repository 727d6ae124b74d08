//! Unified error handling for the forum repositories.
//!
//! Every repository operation returns [`AppResult`]. Lookup failures carry
//! the entity kind and the key that was searched for, so callers can map
//! them to their own presentation.

use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    /// A single-match lookup found nothing
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// A single-match lookup found more than one record
    #[error("{entity} lookup for {key} is ambiguous ({matches} matches)")]
    Ambiguous {
        entity: &'static str,
        key: String,
        matches: usize,
    },

    /// Caller supplied an unusable argument
    #[error("{0}")]
    Validation(String),

    /// The store failed to commit or persist
    #[error("Storage failure: {0}")]
    StorageFailure(String),
}

impl AppError {
    /// Get error code for callers
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Ambiguous { .. } => "AMBIGUOUS",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::StorageFailure(_) => "STORAGE_FAILURE",
        }
    }

    /// The key that caused a lookup failure, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            AppError::NotFound { key, .. } | AppError::Ambiguous { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Get user-facing message (hides storage details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::StorageFailure(msg) => {
                tracing::error!("Storage failure: {}", msg);
                "A storage error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::StorageFailure(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::StorageFailure(err.to_string())
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, entity: &'static str, key: impl Into<String>) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &'static str, key: impl Into<String>) -> AppResult<T> {
        self.ok_or_else(|| AppError::not_found(entity, key))
    }
}

/// Convenience constructors
impl AppError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        AppError::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn ambiguous(entity: &'static str, key: impl Into<String>, matches: usize) -> Self {
        AppError::Ambiguous {
            entity,
            key: key.into(),
            matches,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        AppError::StorageFailure(msg.into())
    }
}

/// Require exactly one match from a lookup.
///
/// Zero matches is [`AppError::NotFound`], more than one is
/// [`AppError::Ambiguous`]; both carry `key`.
pub fn single_match<T>(mut matches: Vec<T>, entity: &'static str, key: impl Into<String>) -> AppResult<T> {
    match matches.len() {
        1 => Ok(matches.remove(0)),
        0 => Err(AppError::not_found(entity, key)),
        n => Err(AppError::ambiguous(entity, key, n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_match_returns_the_only_item() {
        let found = single_match(vec!["Alice"], "User", "alice").unwrap();
        assert_eq!(found, "Alice");
    }

    #[test]
    fn single_match_reports_missing_key() {
        let err = single_match(Vec::<u8>::new(), "Ban", "bob").unwrap_err();
        assert!(matches!(err, AppError::NotFound { entity: "Ban", .. }));
        assert_eq!(err.key(), Some("bob"));
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn single_match_rejects_duplicates() {
        let err = single_match(vec![1, 2, 3], "Role", "Moderator").unwrap_err();
        match err {
            AppError::Ambiguous { key, matches, .. } => {
                assert_eq!(key, "Moderator");
                assert_eq!(matches, 3);
            }
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn option_ext_maps_none() {
        let err = None::<u8>.ok_or_not_found("Reply", "42").unwrap_err();
        assert_eq!(err.to_string(), "Reply not found: 42");
    }

    #[test]
    fn storage_details_hidden_from_users() {
        let err = AppError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"));
        assert_eq!(err.code(), "STORAGE_FAILURE");
        assert_eq!(err.user_message(), "A storage error occurred");
    }
}
