//! UE repository.

use std::collections::HashMap;
use std::sync::Arc;

use domain::models::Ue;
use tokio::sync::RwLock;

use crate::error::RepositoryError;

/// Repository for UE topology records, keyed by SUPI.
#[derive(Clone, Default)]
pub struct UeRepository {
    inner: Arc<RwLock<HashMap<String, Ue>>>,
}

impl UeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a UE record.
    pub async fn insert(&self, ue: Ue) {
        self.inner.write().await.insert(ue.supi.clone(), ue);
    }

    pub async fn get_by_supi(&self, supi: &str) -> Option<Ue> {
        self.inner.read().await.get(supi).cloned()
    }

    pub async fn list_by_owner(&self, owner_id: i64) -> Vec<Ue> {
        self.inner
            .read()
            .await
            .values()
            .filter(|ue| ue.owner_id == owner_id)
            .cloned()
            .collect()
    }

    /// Persist a UE's new coordinates, returning the updated record.
    pub async fn update_coordinates(
        &self,
        supi: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<Ue, RepositoryError> {
        let mut ues = self.inner.write().await;
        let ue = ues
            .get_mut(supi)
            .ok_or_else(|| RepositoryError::UeNotFound(supi.to_string()))?;
        ue.latitude = latitude;
        ue.longitude = longitude;
        Ok(ue.clone())
    }

    /// Persist a UE's attached cell (or detachment), returning the updated record.
    pub async fn update_cell(
        &self,
        supi: &str,
        cell_id: Option<i64>,
    ) -> Result<Ue, RepositoryError> {
        let mut ues = self.inner.write().await;
        let ue = ues
            .get_mut(supi)
            .ok_or_else(|| RepositoryError::UeNotFound(supi.to_string()))?;
        ue.cell_id = cell_id;
        Ok(ue.clone())
    }

    pub async fn delete(&self, supi: &str) -> bool {
        self.inner.write().await.remove(supi).is_some()
    }
}
