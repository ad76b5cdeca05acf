//! Subscription validity predicates.
//!
//! A subscription stays eligible for delivery and retention while both
//! predicates hold; the mobility engine deletes it from the repository the
//! first time either one fails.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::Subscription;

/// True while the expiry timestamp has not passed (or none was set).
pub fn is_time_valid(expire_time: Option<DateTime<Utc>>) -> bool {
    match expire_time {
        None => true,
        Some(expiry) => Utc::now() < expiry,
    }
}

/// True while deliveries remain (or no report limit was set).
///
/// A counter of exactly 0 is treated as already exhausted, so a subscription
/// created with N reports is removed on the first check after its Nth
/// successful delivery.
pub fn has_reports_remaining(remaining: Option<i32>) -> bool {
    match remaining {
        None => true,
        Some(count) => count > 0,
    }
}

/// Combined eligibility check.
pub fn is_subscription_valid(sub: &Subscription) -> bool {
    if !is_time_valid(sub.monitor_expire_time) {
        debug!(subscription = %sub.id, "subscription expired (monitorExpireTime)");
        return false;
    }
    if !has_reports_remaining(sub.maximum_number_of_reports) {
        debug!(subscription = %sub.id, "subscription exhausted (maximumNumberOfReports)");
        return false;
    }
    true
}
