//! Monitoring subscription domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Monitoring event types the emulator can report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonitoringType {
    LocationReporting,
    LossOfConnectivity,
    UeReachability,
    RoamingStatus,
}

/// Reachability kind requested by a UE_REACHABILITY subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReachabilityType {
    Sms,
    Data,
}

/// A standing request to be notified of a device-state event.
///
/// The mobility core mutates a subscription in exactly two ways: it
/// decrements `maximum_number_of_reports` after a successful delivery, and
/// it rewrites `notification_destination` when the subscriber answers with a
/// permanent redirect. Everything else is owned by the provisioning layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    /// Resource URL of this subscription, echoed back in notifications.
    pub link: String,
    pub supi: String,
    pub monitoring_type: MonitoringType,
    pub notification_destination: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_expire_time"
    )]
    pub monitor_expire_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_number_of_reports: Option<i32>,
    /// Seconds a device may stay unreachable before a loss-of-connectivity
    /// report fires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_detection_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reachability_type: Option<ReachabilityType>,
    #[serde(default)]
    pub plmn_indication: bool,
    #[serde(default)]
    pub immediate_rep: bool,
    pub owner_id: i64,
}

/// Accepts RFC 3339 timestamps as well as timezone-naive ones (read as UTC).
fn deserialize_expire_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(value) => shared::time::parse_expire_time(&value)
            .map(Some)
            .ok_or_else(|| {
                serde::de::Error::custom(format!("invalid monitorExpireTime: {value}"))
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_monitoring_type_wire_format() {
        assert_eq!(
            serde_json::to_string(&MonitoringType::LossOfConnectivity).unwrap(),
            "\"LOSS_OF_CONNECTIVITY\""
        );
        let parsed: MonitoringType = serde_json::from_str("\"LOCATION_REPORTING\"").unwrap();
        assert_eq!(parsed, MonitoringType::LocationReporting);
    }

    #[test]
    fn test_subscription_accepts_naive_expiry() {
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "link": "http://localhost:8888/nef/api/v1/3gpp-monitoring-event/v1/netapp/subscriptions/1",
            "supi": "202010000000001",
            "monitoringType": "LOCATION_REPORTING",
            "notificationDestination": "http://localhost:9999/callback",
            "monitorExpireTime": "2030-05-01T12:30:00",
            "ownerId": 1
        }"#;

        let sub: Subscription = serde_json::from_str(json).unwrap();
        let expiry = sub.monitor_expire_time.unwrap();
        assert_eq!(expiry.hour(), 12);
        assert!(sub.maximum_number_of_reports.is_none());
        assert!(!sub.plmn_indication);
    }

    #[test]
    fn test_subscription_accepts_aware_expiry() {
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "link": "http://localhost:8888/subscriptions/1",
            "supi": "202010000000001",
            "monitoringType": "UE_REACHABILITY",
            "notificationDestination": "http://localhost:9999/callback",
            "monitorExpireTime": "2030-05-01T12:30:00+02:00",
            "reachabilityType": "SMS",
            "ownerId": 1
        }"#;

        let sub: Subscription = serde_json::from_str(json).unwrap();
        assert_eq!(sub.monitor_expire_time.unwrap().hour(), 10);
        assert_eq!(sub.reachability_type, Some(ReachabilityType::Sms));
    }

    #[test]
    fn test_subscription_rejects_garbage_expiry() {
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "link": "http://localhost:8888/subscriptions/1",
            "supi": "202010000000001",
            "monitoringType": "LOCATION_REPORTING",
            "notificationDestination": "http://localhost:9999/callback",
            "monitorExpireTime": "whenever",
            "ownerId": 1
        }"#;

        assert!(serde_json::from_str::<Subscription>(json).is_err());
    }
}
