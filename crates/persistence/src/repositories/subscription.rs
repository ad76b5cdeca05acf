//! Monitoring subscription repository.

use std::collections::HashMap;
use std::sync::Arc;

use domain::models::Subscription;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::RepositoryError;

/// Repository for monitoring subscriptions.
#[derive(Clone, Default)]
pub struct SubscriptionRepository {
    inner: Arc<RwLock<HashMap<Uuid, Subscription>>>,
}

impl SubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, sub: Subscription) {
        self.inner.write().await.insert(sub.id, sub);
    }

    pub async fn get(&self, id: Uuid) -> Option<Subscription> {
        self.inner.read().await.get(&id).cloned()
    }

    /// All subscriptions targeting a device, ordered by id for stable iteration.
    pub async fn find_by_supi(&self, supi: &str) -> Vec<Subscription> {
        let mut subs: Vec<Subscription> = self
            .inner
            .read()
            .await
            .values()
            .filter(|sub| sub.supi == supi)
            .cloned()
            .collect();
        subs.sort_by_key(|sub| sub.id);
        subs
    }

    pub async fn delete(&self, id: Uuid) -> bool {
        let removed = self.inner.write().await.remove(&id).is_some();
        if removed {
            debug!(subscription = %id, "subscription deleted");
        }
        removed
    }

    /// Decrement the remaining-report counter after a successful delivery.
    ///
    /// Subscriptions without a report limit are left untouched. Returns the
    /// updated counter.
    pub async fn decrement_remaining_reports(
        &self,
        id: Uuid,
    ) -> Result<Option<i32>, RepositoryError> {
        let mut subs = self.inner.write().await;
        let sub = subs
            .get_mut(&id)
            .ok_or(RepositoryError::SubscriptionNotFound(id))?;
        if let Some(count) = sub.maximum_number_of_reports.as_mut() {
            *count -= 1;
        }
        Ok(sub.maximum_number_of_reports)
    }

    /// Rewrite the callback URL after a permanent redirect.
    pub async fn update_notification_destination(
        &self,
        id: Uuid,
        destination: &str,
    ) -> Result<(), RepositoryError> {
        let mut subs = self.inner.write().await;
        let sub = subs
            .get_mut(&id)
            .ok_or(RepositoryError::SubscriptionNotFound(id))?;
        sub.notification_destination = destination.to_string();
        Ok(())
    }
}
