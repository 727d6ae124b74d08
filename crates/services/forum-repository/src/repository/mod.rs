//! Repository layer for forum data access.

mod reply_repository;
mod user_repository;

pub use reply_repository::{ReplyRepository, ReplyStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use reply_repository::MockReplyRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;

/// Whether a mutating operation commits before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Durability {
    /// Stage the change and commit it
    #[default]
    Immediate,
    /// Stage the change only; it becomes visible on the next commit
    Deferred,
}
