//! Cell repository.

use std::collections::BTreeMap;
use std::sync::Arc;

use domain::models::Cell;
use tokio::sync::RwLock;

/// Repository for cell topology records.
///
/// Backed by an ordered map so that listings are stable, which in turn makes
/// the nearest-cell tie-break deterministic.
#[derive(Clone, Default)]
pub struct CellRepository {
    inner: Arc<RwLock<BTreeMap<i64, Cell>>>,
}

impl CellRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, cell: Cell) {
        self.inner.write().await.insert(cell.id, cell);
    }

    pub async fn get(&self, id: i64) -> Option<Cell> {
        self.inner.read().await.get(&id).cloned()
    }

    pub async fn list_by_owner(&self, owner_id: i64) -> Vec<Cell> {
        self.inner
            .read()
            .await
            .values()
            .filter(|cell| cell.owner_id == owner_id)
            .cloned()
            .collect()
    }
}
