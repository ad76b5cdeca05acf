//! Geometry and signal-quality calculations.
//!
//! Everything here is a pure function of its inputs: no state, no I/O, no
//! suspension. The propagation model is a simplified empirical path-loss
//! formula, not a physically exact one.

use std::collections::HashMap;

use crate::models::Cell;

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Default carrier frequency in GHz.
pub const DEFAULT_CARRIER_FREQ_GHZ: f64 = 2.6475;

/// Default transmission power in dBm.
pub const DEFAULT_TX_POWER_DBM: f64 = 30.0;

/// Distances below this floor are clamped before the path-loss logarithm.
const MIN_DISTANCE_M: f64 = 1e-3;

/// Great-circle distance between two coordinates in meters (haversine).
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Resolves which cell a position is attached to.
///
/// A position is inside a cell iff its distance to the cell center is within
/// the coverage radius; among all containing cells the nearest one wins.
/// Equidistant candidates are resolved by stable input order (the first one
/// encountered is kept, because later candidates must be strictly nearer to
/// replace it). Returns `None` when the position is inside no cell, plus the
/// computed distance to every candidate.
pub fn select_cell<'a>(
    lat: f64,
    lon: f64,
    cells: &'a [Cell],
) -> (Option<&'a Cell>, HashMap<i64, f64>) {
    let mut selected: Option<&Cell> = None;
    let mut selected_dist = f64::INFINITY;
    let mut distances = HashMap::with_capacity(cells.len());

    for cell in cells {
        let dist = distance(lat, lon, cell.latitude, cell.longitude);
        distances.insert(cell.id, dist);
        if dist <= cell.radius && dist < selected_dist {
            selected_dist = dist;
            selected = Some(cell);
        }
    }

    (selected, distances)
}

/// Empirical path loss in dB between a UE position and a cell center.
///
/// `28 + 22·ln(d3d) + 20·ln(fc)` with the 3D distance approximated by the
/// great-circle distance, floored to avoid the degenerate same-point case.
pub fn path_loss(ue_lat: f64, ue_lon: f64, cell_lat: f64, cell_lon: f64, freq_ghz: f64) -> f64 {
    let distance_3d = distance(ue_lat, ue_lon, cell_lat, cell_lon).max(MIN_DISTANCE_M);
    28.0 + 22.0 * distance_3d.ln() + 20.0 * freq_ghz.ln()
}

/// Path loss toward every candidate cell, keyed by cell id.
pub fn path_loss_by_cell(ue_lat: f64, ue_lon: f64, cells: &[Cell]) -> HashMap<i64, f64> {
    cells
        .iter()
        .map(|cell| {
            (
                cell.id,
                path_loss(
                    ue_lat,
                    ue_lon,
                    cell.latitude,
                    cell.longitude,
                    DEFAULT_CARRIER_FREQ_GHZ,
                ),
            )
        })
        .collect()
}

/// Received power estimate in dBm.
pub fn received_power(path_loss_db: f64, tx_power_dbm: f64) -> f64 {
    tx_power_dbm - path_loss_db
}

/// RSRP estimate toward every candidate cell, keyed by cell id.
pub fn rsrp_by_cell(ue_lat: f64, ue_lon: f64, cells: &[Cell]) -> HashMap<i64, f64> {
    path_loss_by_cell(ue_lat, ue_lon, cells)
        .into_iter()
        .map(|(id, loss)| (id, received_power(loss, DEFAULT_TX_POWER_DBM)))
        .collect()
}
