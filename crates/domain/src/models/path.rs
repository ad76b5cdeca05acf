//! Path and waypoint domain models.

use serde::{Deserialize, Serialize};

/// An owner-scoped route a UE moves along.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Path {
    pub id: i64,
    pub description: String,
    pub owner_id: i64,
}

/// A single point of a path. Paths are ordered lists of waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub latitude: f64,
    pub longitude: f64,
}
