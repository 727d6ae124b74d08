//! Entity store contract and its in-memory implementation.
//!
//! The store owns every entity. Mutations are staged with `add`, `update`
//! and `remove` and only become visible to reads after `commit`.

mod entity;
mod memory;
mod query;

use async_trait::async_trait;

use common::AppResult;

pub use entity::{Dataset, Entity, EntityKind, Table};
pub use memory::MemoryStore;
pub use query::Query;

/// Storage capability set the repositories are written against.
///
/// Reads observe committed state only; staged changes are invisible until
/// [`commit`](EntityStore::commit) succeeds.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Stage an insert. Returns the entity with its assigned id.
    async fn add<T: Entity>(&self, entity: T) -> AppResult<T>;

    /// Stage a replace of a tracked entity. Untracked entities are ignored at commit.
    async fn update<T: Entity>(&self, entity: T) -> AppResult<()>;

    /// Stage a removal. Untracked entities are ignored at commit.
    async fn remove<T: Entity>(&self, entity: &T) -> AppResult<()>;

    /// Find a committed entity by identity
    async fn find<T: Entity>(&self, id: i64) -> AppResult<Option<T>>;

    /// Materialize a query against committed state
    async fn fetch<T: Entity>(&self, query: &Query<T>) -> AppResult<Vec<T>>;

    /// Count the entities a query would return
    async fn count<T: Entity>(&self, query: &Query<T>) -> AppResult<u64>;

    /// Make every staged change durable and visible
    async fn commit(&self) -> AppResult<()>;

    /// Drop every staged change
    async fn rollback(&self);

    /// Number of staged, uncommitted changes
    async fn pending_changes(&self) -> usize;
}
