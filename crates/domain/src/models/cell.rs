//! Cell domain model.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Public land mobile network identity (MCC + MNC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlmnId {
    pub mcc: String,
    pub mnc: String,
}

/// A coverage area with a geographic center and radius.
///
/// Read-only from the mobility core's perspective; devices attach to the
/// nearest cell whose radius contains them.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub id: i64,
    /// Hex NCI carried verbatim in location reports.
    pub cell_id_hex: String,
    pub name: String,
    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: f64,
    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: f64,
    /// Coverage radius in meters.
    #[validate(custom(function = "shared::validation::validate_radius"))]
    pub radius: f64,
    pub owner_id: i64,
    pub plmn: PlmnId,
}
