//! Outbound notification wire payloads.
//!
//! These follow the 3GPP monitoring-event shapes the emulator exposes:
//! camelCase field names, unset fields omitted from the JSON body.

use serde::{Deserialize, Serialize};

use crate::models::cell::PlmnId;
use crate::models::subscription::{MonitoringType, ReachabilityType};

/// Latitude/longitude pair in a GAD point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeographicalCoordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A GAD point shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub shape: PointShape,
    pub point: GeographicalCoordinates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PointShape {
    Point,
}

/// Location information attached to a LOCATION_REPORTING report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enode_b_id: Option<String>,
    pub geographic_area: Point,
}

/// One typed event report inside a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringEventReport {
    pub monitoring_type: MonitoringType,
    pub external_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4_addr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_info: Option<LocationInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss_of_connect_reason: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reachability_type: Option<ReachabilityType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roaming_status: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plmn_id: Option<PlmnId>,
}

/// The notification envelope POSTed to a subscriber's callback URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringNotification {
    /// Resource URL of the subscription this notification belongs to.
    pub subscription: String,
    pub monitoring_event_reports: Vec<MonitoringEventReport>,
}

impl MonitoringNotification {
    pub fn new(subscription: String, report: MonitoringEventReport) -> Self {
        Self {
            subscription,
            monitoring_event_reports: vec![report],
        }
    }
}
