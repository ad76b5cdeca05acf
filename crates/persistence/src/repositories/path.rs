//! Path repository.

use std::collections::HashMap;
use std::sync::Arc;

use domain::models::{Path, Waypoint};
use tokio::sync::RwLock;

/// Repository for paths and their ordered waypoint lists.
#[derive(Clone, Default)]
pub struct PathRepository {
    inner: Arc<RwLock<HashMap<i64, (Path, Vec<Waypoint>)>>>,
}

impl PathRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, path: Path, waypoints: Vec<Waypoint>) {
        self.inner.write().await.insert(path.id, (path, waypoints));
    }

    pub async fn get(&self, id: i64) -> Option<Path> {
        self.inner.read().await.get(&id).map(|(p, _)| p.clone())
    }

    /// Ordered waypoints of a path; empty when the path is unknown.
    pub async fn waypoints(&self, id: i64) -> Vec<Waypoint> {
        self.inner
            .read()
            .await
            .get(&id)
            .map(|(_, wps)| wps.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_waypoints_preserve_order() {
        let repo = PathRepository::new();
        let waypoints = vec![
            Waypoint {
                latitude: 0.0,
                longitude: 0.0,
            },
            Waypoint {
                latitude: 0.1,
                longitude: 0.0,
            },
            Waypoint {
                latitude: 0.1,
                longitude: 0.1,
            },
        ];
        repo.insert(
            Path {
                id: 1,
                description: "square".to_string(),
                owner_id: 1,
            },
            waypoints.clone(),
        )
        .await;

        assert_eq!(repo.waypoints(1).await, waypoints);
        assert!(repo.get(1).await.is_some());
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let repo = PathRepository::new();
        assert!(repo.get(42).await.is_none());
        assert!(repo.waypoints(42).await.is_empty());
    }
}
