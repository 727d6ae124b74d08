//! Forum Repository Library
//!
//! Paged and aggregated queries over forum replies and users, written
//! against the [`store::EntityStore`] contract so the same repositories run
//! over the in-memory [`store::MemoryStore`] or any other backend.
//!
//! ```ignore
//! let store = Arc::new(MemoryStore::open(&config.store).await?);
//! let replies = ReplyStore::new(store.clone());
//! let users = UserStore::with_config(store, Arc::new(SystemClock), &config.presence);
//!
//! let page = replies.get_replies(topic_id, 2, 20, false).await?;
//! let stats = users.get_user_statistics().await?;
//! ```

pub mod clock;
pub mod config;
pub mod pagination;
pub mod repository;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ForumConfig;
pub use pagination::fetch_page;
pub use repository::{Durability, ReplyRepository, ReplyStore, UserRepository, UserStore};
pub use store::{EntityStore, MemoryStore, Query};
