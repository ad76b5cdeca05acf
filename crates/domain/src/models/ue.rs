//! UE (user equipment) domain model.

use serde::{Deserialize, Serialize};

use crate::models::cell::PlmnId;

/// A simulated device tracked by the emulator.
///
/// Coordinates and the attached cell are mutated once per movement tick;
/// everything else is provisioning data the mobility core only reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ue {
    pub supi: String,
    pub name: String,
    pub external_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4_addr: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub path_id: Option<i64>,
    #[serde(default)]
    pub speed: SpeedClass,
    #[serde(default)]
    pub cell_id: Option<i64>,
    pub owner_id: i64,
    pub home_plmn: PlmnId,
}

/// Movement speed class, mapped to a per-tick waypoint step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpeedClass {
    Stationary,
    #[default]
    Low,
    High,
}

impl SpeedClass {
    /// Number of waypoints advanced per movement tick.
    pub fn step(&self) -> usize {
        match self {
            SpeedClass::Stationary => 0,
            SpeedClass::Low => 1,
            SpeedClass::High => 10,
        }
    }
}
