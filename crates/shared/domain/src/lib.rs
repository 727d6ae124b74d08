//! Domain layer - Forum entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the entities stored by the forum repositories, the pagination arithmetic
//! shared by every paged query, and the business constants (staff roles,
//! offense categories, presence window).

pub mod constants;
pub mod pagination;
pub mod reply;
pub mod user;

pub use constants::*;
pub use pagination::{page_count, CollectionPage, PageWindow};
pub use reply::Reply;
pub use user::{same_username, Ban, Ignore, Role, User, UserActivityLogItem, UserStats};
