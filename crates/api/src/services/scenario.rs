//! Scenario loading.
//!
//! A scenario file seeds the topology repositories at startup: cells, paths
//! with their waypoints, and UEs. Subscriptions are provisioned at runtime
//! through the monitoring-event API, not through scenarios.

use domain::models::{Cell, Path, Ue, Waypoint};
use persistence::repositories::{CellRepository, PathRepository, UeRepository};
use serde::Deserialize;
use tracing::info;

/// On-disk scenario shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub paths: Vec<ScenarioPath>,
    #[serde(default)]
    pub ues: Vec<Ue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioPath {
    #[serde(flatten)]
    pub path: Path,
    pub waypoints: Vec<Waypoint>,
}

impl Scenario {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Seed the topology repositories with this scenario's contents.
    pub async fn apply(
        self,
        ues: &UeRepository,
        cells: &CellRepository,
        paths: &PathRepository,
    ) {
        let (cell_count, path_count, ue_count) =
            (self.cells.len(), self.paths.len(), self.ues.len());

        for cell in self.cells {
            cells.insert(cell).await;
        }
        for scenario_path in self.paths {
            paths.insert(scenario_path.path, scenario_path.waypoints).await;
        }
        for ue in self.ues {
            ues.insert(ue).await;
        }

        info!(
            cells = cell_count,
            paths = path_count,
            ues = ue_count,
            "scenario loaded"
        );
    }
}
