//! Event report builders.
//!
//! Each builder is a pure function of device state and subscription
//! parameters; none perform I/O. The mobility engine decides *when* a report
//! type applies (attach/detach transitions, detection timers) and calls the
//! matching builder here.

use crate::models::{
    Cell, GeographicalCoordinates, LocationInfo, MonitoringEventReport, MonitoringType, PlmnId,
    Point, ReachabilityType, Ue,
};
use crate::models::notification::PointShape;

/// Reason codes carried by a loss-of-connectivity report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossOfConnectivityReason {
    /// The UE was deregistered from the network.
    Deregistered,
    /// The maximum detection timer expired while the UE stayed unreachable.
    MaxDetectionTimeExpired,
}

impl LossOfConnectivityReason {
    pub fn code(&self) -> i32 {
        match self {
            LossOfConnectivityReason::Deregistered => 6,
            LossOfConnectivityReason::MaxDetectionTimeExpired => 7,
        }
    }
}

fn base_report(ue: &Ue, monitoring_type: MonitoringType) -> MonitoringEventReport {
    MonitoringEventReport {
        monitoring_type,
        external_id: ue.external_identifier.clone(),
        ipv4_addr: None,
        location_info: None,
        loss_of_connect_reason: None,
        reachability_type: None,
        roaming_status: None,
        plmn_id: None,
    }
}

/// Location report: current coordinates plus the attached cell, if any.
pub fn location_report(ue: &Ue, attached_cell: Option<&Cell>) -> MonitoringEventReport {
    let mut report = base_report(ue, MonitoringType::LocationReporting);
    report.location_info = Some(LocationInfo {
        cell_id: attached_cell.map(|c| c.cell_id_hex.clone()),
        enode_b_id: None,
        geographic_area: Point {
            shape: PointShape::Point,
            point: GeographicalCoordinates {
                lat: ue.latitude,
                lon: ue.longitude,
            },
        },
    });
    report
}

/// Loss-of-connectivity report for a UE that dropped out of all coverage.
pub fn loss_of_connectivity_report(
    ue: &Ue,
    reason: LossOfConnectivityReason,
) -> MonitoringEventReport {
    let mut report = base_report(ue, MonitoringType::LossOfConnectivity);
    report.ipv4_addr = ue.ipv4_addr.clone();
    report.loss_of_connect_reason = Some(reason.code());
    report
}

/// UE-reachability report for a UE that re-entered coverage.
///
/// Echoes the reachability type the subscriber asked for, defaulting to DATA.
pub fn ue_reachability_report(
    ue: &Ue,
    requested: Option<ReachabilityType>,
) -> MonitoringEventReport {
    let mut report = base_report(ue, MonitoringType::UeReachability);
    report.ipv4_addr = ue.ipv4_addr.clone();
    report.reachability_type = Some(requested.unwrap_or(ReachabilityType::Data));
    report
}

/// Roaming-status report comparing the home PLMN against the visited one.
///
/// The visited PLMN identity is only disclosed when the subscriber requested
/// `plmnIndication`.
pub fn roaming_status_report(
    ue: &Ue,
    visited_plmn: &PlmnId,
    plmn_indication: bool,
) -> MonitoringEventReport {
    let roaming = *visited_plmn != ue.home_plmn;
    let mut report = base_report(ue, MonitoringType::RoamingStatus);
    report.roaming_status = Some(roaming);
    if plmn_indication {
        report.plmn_id = Some(visited_plmn.clone());
    }
    report
}
