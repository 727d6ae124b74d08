//! In-memory entity store with optional JSON snapshot durability.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use common::{AppError, AppResult, StoreConfig};

use super::entity::{Dataset, Entity, EntityKind};
use super::query::Query;
use super::EntityStore;

/// Outcome of applying one staged change
enum Applied {
    Written,
    Untracked,
    Conflict,
}

#[derive(Debug, Clone, Copy)]
enum ChangeOp {
    Insert,
    Update,
    Remove,
}

struct StagedChange {
    kind: EntityKind,
    op: ChangeOp,
    id: i64,
    apply: Box<dyn Fn(&mut Dataset) -> Applied + Send + Sync>,
}

#[derive(Default)]
struct Staging {
    changes: Vec<StagedChange>,
    /// Highest id handed out per kind, including uncommitted inserts
    issued_ids: HashMap<EntityKind, i64>,
}

/// Entity store keeping committed data in memory.
///
/// When a snapshot path is configured every commit rewrites the snapshot
/// before the new state becomes visible, so a failed write leaves both
/// the committed data and the staged changes untouched and the commit can
/// be retried. A commit rejected for a duplicate id discards the staged
/// changes instead.
pub struct MemoryStore {
    data: RwLock<Dataset>,
    staging: Mutex<Staging>,
    snapshot_path: Option<PathBuf>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty, purely in-memory store
    pub fn new() -> Self {
        Self::with_data(Dataset::default(), None)
    }

    /// Create a store over existing data
    pub fn with_data(data: Dataset, snapshot_path: Option<PathBuf>) -> Self {
        Self {
            data: RwLock::new(data),
            staging: Mutex::new(Staging::default()),
            snapshot_path,
        }
    }

    /// Open a store from configuration, loading the snapshot if one exists.
    pub async fn open(config: &StoreConfig) -> AppResult<Self> {
        let data = match &config.snapshot_path {
            Some(path) if tokio::fs::try_exists(path).await? => {
                let bytes = tokio::fs::read(path).await?;
                let data: Dataset = serde_json::from_slice(&bytes)?;
                tracing::info!("Loaded store snapshot from {}", path.display());
                data
            }
            _ => Dataset::default(),
        };

        Ok(Self::with_data(data, config.snapshot_path.clone()))
    }

    /// Copy of the committed data
    pub async fn snapshot(&self) -> Dataset {
        self.data.read().await.clone()
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    async fn next_id<T: Entity>(&self, staging: &mut Staging) -> i64 {
        let committed_max = {
            let data = self.data.read().await;
            T::table(&data).keys().next_back().copied().unwrap_or(0)
        };
        let issued = staging.issued_ids.entry(T::KIND).or_insert(0);
        *issued = (*issued).max(committed_max) + 1;
        *issued
    }

    fn stage(staging: &mut Staging, change: StagedChange) {
        tracing::debug!("Staged {:?} of {} {}", change.op, change.kind, change.id);
        staging.changes.push(change);
    }
}

/// Write the snapshot next to its final path, then move it into place.
async fn write_snapshot(path: &Path, data: &Dataset) -> AppResult<()> {
    let bytes = serde_json::to_vec_pretty(data)?;
    let staging_path = path.with_extension("tmp");
    tokio::fs::write(&staging_path, bytes).await?;
    tokio::fs::rename(&staging_path, path).await?;
    Ok(())
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn add<T: Entity>(&self, mut entity: T) -> AppResult<T> {
        let mut staging = self.staging.lock().await;

        if entity.id() == 0 {
            let id = self.next_id::<T>(&mut staging).await;
            entity.set_id(id);
        } else {
            let issued = staging.issued_ids.entry(T::KIND).or_insert(0);
            *issued = (*issued).max(entity.id());
        }

        let id = entity.id();
        let row = entity.clone();
        let change = StagedChange {
            kind: T::KIND,
            op: ChangeOp::Insert,
            id,
            apply: Box::new(move |data: &mut Dataset| {
                let table = T::table_mut(data);
                if table.contains_key(&id) {
                    return Applied::Conflict;
                }
                table.insert(id, row.clone());
                Applied::Written
            }),
        };
        Self::stage(&mut staging, change);

        Ok(entity)
    }

    async fn update<T: Entity>(&self, entity: T) -> AppResult<()> {
        let mut staging = self.staging.lock().await;
        let id = entity.id();
        let change = StagedChange {
            kind: T::KIND,
            op: ChangeOp::Update,
            id,
            apply: Box::new(move |data: &mut Dataset| match T::table_mut(data).get_mut(&id) {
                Some(stored) => {
                    *stored = entity.clone();
                    Applied::Written
                }
                None => Applied::Untracked,
            }),
        };
        Self::stage(&mut staging, change);
        Ok(())
    }

    async fn remove<T: Entity>(&self, entity: &T) -> AppResult<()> {
        let mut staging = self.staging.lock().await;
        let id = entity.id();
        let change = StagedChange {
            kind: T::KIND,
            op: ChangeOp::Remove,
            id,
            apply: Box::new(move |data: &mut Dataset| match T::table_mut(data).remove(&id) {
                Some(_) => Applied::Written,
                None => Applied::Untracked,
            }),
        };
        Self::stage(&mut staging, change);
        Ok(())
    }

    async fn find<T: Entity>(&self, id: i64) -> AppResult<Option<T>> {
        let data = self.data.read().await;
        Ok(T::table(&data).get(&id).cloned())
    }

    async fn fetch<T: Entity>(&self, query: &Query<T>) -> AppResult<Vec<T>> {
        let data = self.data.read().await;
        let rows = query.evaluate(T::table(&data).values());
        tracing::debug!("Fetched {} {} rows", rows.len(), T::KIND);
        Ok(rows)
    }

    async fn count<T: Entity>(&self, query: &Query<T>) -> AppResult<u64> {
        let data = self.data.read().await;
        Ok(query.count_in(T::table(&data).values()))
    }

    async fn commit(&self) -> AppResult<()> {
        let mut staging = self.staging.lock().await;
        if staging.changes.is_empty() {
            return Ok(());
        }

        let mut next = self.data.read().await.clone();
        let mut rejected = None;
        for change in &staging.changes {
            match (change.apply)(&mut next) {
                Applied::Written => {}
                Applied::Untracked => {
                    tracing::warn!(
                        "Ignoring {:?} of untracked {} {}",
                        change.op,
                        change.kind,
                        change.id
                    );
                }
                Applied::Conflict => {
                    rejected = Some(format!("{} {} already exists", change.kind, change.id));
                    break;
                }
            }
        }

        if let Some(reason) = rejected {
            let dropped = staging.changes.len();
            staging.changes.clear();
            staging.issued_ids.clear();
            tracing::warn!("Commit rejected, dropped {} staged changes: {}", dropped, reason);
            return Err(AppError::storage(reason));
        }

        if let Some(path) = &self.snapshot_path {
            if let Err(e) = write_snapshot(path, &next).await {
                tracing::error!("Snapshot write to {} failed: {}", path.display(), e);
                return Err(e);
            }
        }

        *self.data.write().await = next;
        let committed = staging.changes.len();
        staging.changes.clear();
        tracing::info!("Committed {} staged changes", committed);
        Ok(())
    }

    async fn rollback(&self) {
        let mut staging = self.staging.lock().await;
        let dropped = staging.changes.len();
        staging.changes.clear();
        staging.issued_ids.clear();
        if dropped > 0 {
            tracing::info!("Rolled back {} staged changes", dropped);
        }
    }

    async fn pending_changes(&self) -> usize {
        self.staging.lock().await.changes.len()
    }
}
