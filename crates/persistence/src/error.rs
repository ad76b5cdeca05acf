//! Repository error type.

use thiserror::Error;

/// Errors surfaced by repository operations.
///
/// The stores are in-memory, so the only runtime failure is acting on an
/// entity that no longer exists (deleted concurrently by another actor).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("UE {0} not found")]
    UeNotFound(String),

    #[error("subscription {0} not found")]
    SubscriptionNotFound(uuid::Uuid),
}
