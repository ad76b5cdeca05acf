//! Mobility engine.
//!
//! Owns the set of actively-moving devices. Each running device gets one
//! cooperative task that advances it along its path once per tick, resolves
//! the covering cell, records handovers, and fans out monitoring
//! notifications. The session registry is the only state shared across
//! loops; every session carries the token of the task that owns it, and a
//! loop exits at the top of a tick as soon as its SUPI's registry entry is
//! gone or owned by a newer task.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use domain::models::{Cell, MonitoringNotification, MonitoringType, Subscription, Ue};
use domain::services::report::LossOfConnectivityReason;
use domain::services::{geometry, report, validity};
use persistence::repositories::{
    CellRepository, PathRepository, SubscriptionRepository, UeRepository,
};
use persistence::RepositoryError;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::services::dispatcher::NotificationDispatcher;

/// Errors surfaced by the start/stop/update operations.
#[derive(Debug, Error)]
pub enum MobilityError {
    #[error("a movement loop is already running for SUPI {0}")]
    AlreadyRunning(String),

    #[error("no movement loop is running for SUPI {0}")]
    NotRunning(String),

    #[error("UE {0} not found")]
    UeNotFound(String),

    #[error("UE {0} has no path assigned")]
    NoPathAssigned(String),

    #[error("path {0} not found")]
    PathNotFound(i64),

    #[error("path {0} has no waypoints")]
    EmptyPath(i64),

    #[error("UE {supi} is not owned by user {owner_id}")]
    NotOwner { supi: String, owner_id: i64 },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Per-device movement session. Lives from start-loop to stop-loop.
#[derive(Debug)]
struct MovementSession {
    /// Token of the task owning this session. A stop-then-restart within one
    /// tick interval replaces the entry under the same SUPI; the old task
    /// must recognize the entry is no longer its own and exit.
    token: Uuid,
    owner_id: i64,
    /// Cell ids visited, in handover order.
    handovers: Vec<i64>,
    /// Whether the device has been attached to any cell during this session.
    was_attached: bool,
    /// Consecutive ticks spent outside all coverage.
    cellless_ticks: u32,
    /// Loss subscriptions already notified for the current outage.
    loss_reported: HashSet<Uuid>,
}

/// The movement and notification-dispatch core.
#[derive(Clone)]
pub struct MobilityEngine {
    sessions: Arc<RwLock<HashMap<String, MovementSession>>>,
    ues: UeRepository,
    cells: CellRepository,
    paths: PathRepository,
    subscriptions: SubscriptionRepository,
    dispatcher: NotificationDispatcher,
    tick_interval: Duration,
    expected_status: u16,
}

impl MobilityEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ues: UeRepository,
        cells: CellRepository,
        paths: PathRepository,
        subscriptions: SubscriptionRepository,
        dispatcher: NotificationDispatcher,
        tick_interval: Duration,
        expected_status: u16,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ues,
            cells,
            paths,
            subscriptions,
            dispatcher,
            tick_interval,
            expected_status,
        }
    }

    /// Start the movement loop for a device.
    ///
    /// Fails without side effects when a session already exists or when the
    /// device, its ownership, or its path do not check out.
    pub async fn start_loop(&self, supi: &str, owner_id: i64) -> Result<(), MobilityError> {
        if self.sessions.read().await.contains_key(supi) {
            return Err(MobilityError::AlreadyRunning(supi.to_string()));
        }

        let ue = self
            .ues
            .get_by_supi(supi)
            .await
            .ok_or_else(|| MobilityError::UeNotFound(supi.to_string()))?;
        if ue.owner_id != owner_id {
            return Err(MobilityError::NotOwner {
                supi: supi.to_string(),
                owner_id,
            });
        }
        let path_id = ue
            .path_id
            .ok_or_else(|| MobilityError::NoPathAssigned(supi.to_string()))?;
        self.paths
            .get(path_id)
            .await
            .ok_or(MobilityError::PathNotFound(path_id))?;
        if self.paths.waypoints(path_id).await.is_empty() {
            return Err(MobilityError::EmptyPath(path_id));
        }

        let token = Uuid::new_v4();
        {
            let mut sessions = self.sessions.write().await;
            if sessions.contains_key(supi) {
                return Err(MobilityError::AlreadyRunning(supi.to_string()));
            }
            sessions.insert(
                supi.to_string(),
                MovementSession {
                    token,
                    owner_id,
                    handovers: Vec::new(),
                    was_attached: ue.cell_id.is_some(),
                    cellless_ticks: 0,
                    loss_reported: HashSet::new(),
                },
            );
        }

        info!(supi, owner_id, "movement loop started");
        let engine = self.clone();
        let supi = supi.to_string();
        tokio::spawn(async move {
            if let Err(e) = engine.movement_loop(&supi, owner_id, token).await {
                error!(supi, error = %e, "movement loop terminated");
            }
            // Only remove the session this task owns; a restart may have
            // replaced it under the same SUPI in the meantime.
            let mut sessions = engine.sessions.write().await;
            if sessions.get(&supi).is_some_and(|session| session.token == token) {
                sessions.remove(&supi);
                debug!(supi, "movement session removed");
            }
        });

        Ok(())
    }

    /// Stop the movement loop for a device.
    ///
    /// The loop observes the registry removal at the top of its next tick.
    pub async fn stop_loop(&self, supi: &str) -> Result<(), MobilityError> {
        if self.sessions.write().await.remove(supi).is_none() {
            return Err(MobilityError::NotRunning(supi.to_string()));
        }
        info!(supi, "movement loop stopped");
        Ok(())
    }

    pub async fn is_running(&self, supi: &str) -> bool {
        self.sessions.read().await.contains_key(supi)
    }

    /// All devices belonging to an owner, with their live positions.
    pub async fn list_ues(&self, owner_id: i64) -> Vec<Ue> {
        self.ues.list_by_owner(owner_id).await
    }

    /// Cell ids visited during the current session, in handover order.
    pub async fn handover_history(&self, supi: &str) -> Vec<i64> {
        self.sessions
            .read()
            .await
            .get(supi)
            .map(|session| session.handovers.clone())
            .unwrap_or_default()
    }

    /// One-shot position update outside the periodic loop.
    ///
    /// Persists the new coordinates, resolves the covering cell and
    /// dispatches notifications exactly like a movement tick would.
    pub async fn update_single_location(
        &self,
        supi: &str,
        owner_id: i64,
        latitude: f64,
        longitude: f64,
    ) -> Result<Ue, MobilityError> {
        let ue = self
            .ues
            .get_by_supi(supi)
            .await
            .ok_or_else(|| MobilityError::UeNotFound(supi.to_string()))?;
        if ue.owner_id != owner_id {
            return Err(MobilityError::NotOwner {
                supi: supi.to_string(),
                owner_id,
            });
        }

        let cells = self.cells.list_by_owner(owner_id).await;
        let previous_cell_id = ue.cell_id;
        let mut ue = self.ues.update_coordinates(supi, latitude, longitude).await?;
        let (cell_now, _) = geometry::select_cell(latitude, longitude, &cells);
        let current_cell_id = cell_now.map(|cell| cell.id);

        if current_cell_id != previous_cell_id {
            ue = self.ues.update_cell(supi, current_cell_id).await?;
            if let Some(cell_id) = current_cell_id {
                self.record_handover(supi, cell_id).await;
            }
        }

        let cell_now = cell_now.cloned();
        self.evaluate_subscriptions(&ue, previous_cell_id, cell_now.as_ref())
            .await;
        Ok(ue)
    }

    /// Distance from a UE to every cell of its owner, keyed by cell id.
    pub async fn distances(
        &self,
        supi: &str,
        owner_id: i64,
    ) -> Result<HashMap<i64, f64>, MobilityError> {
        let ue = self
            .ues
            .get_by_supi(supi)
            .await
            .ok_or_else(|| MobilityError::UeNotFound(supi.to_string()))?;
        let cells = self.cells.list_by_owner(owner_id).await;
        Ok(geometry::select_cell(ue.latitude, ue.longitude, &cells).1)
    }

    /// Path loss from a UE toward every cell of its owner.
    pub async fn path_losses(
        &self,
        supi: &str,
        owner_id: i64,
    ) -> Result<HashMap<i64, f64>, MobilityError> {
        let ue = self
            .ues
            .get_by_supi(supi)
            .await
            .ok_or_else(|| MobilityError::UeNotFound(supi.to_string()))?;
        let cells = self.cells.list_by_owner(owner_id).await;
        Ok(geometry::path_loss_by_cell(ue.latitude, ue.longitude, &cells))
    }

    /// RSRP estimate from a UE toward every cell of its owner.
    pub async fn rsrps(
        &self,
        supi: &str,
        owner_id: i64,
    ) -> Result<HashMap<i64, f64>, MobilityError> {
        let ue = self
            .ues
            .get_by_supi(supi)
            .await
            .ok_or_else(|| MobilityError::UeNotFound(supi.to_string()))?;
        let cells = self.cells.list_by_owner(owner_id).await;
        Ok(geometry::rsrp_by_cell(ue.latitude, ue.longitude, &cells))
    }

    /// The per-device movement loop.
    ///
    /// Ticks for as long as the registry entry for this SUPI carries this
    /// task's token. Repository failures terminate this loop only; the
    /// caller removes the session entry afterwards.
    async fn movement_loop(
        &self,
        supi: &str,
        owner_id: i64,
        token: Uuid,
    ) -> Result<(), MobilityError> {
        let mut ue = self
            .ues
            .get_by_supi(supi)
            .await
            .ok_or_else(|| MobilityError::UeNotFound(supi.to_string()))?;
        let path_id = ue
            .path_id
            .ok_or_else(|| MobilityError::NoPathAssigned(supi.to_string()))?;
        let waypoints = self.paths.waypoints(path_id).await;
        if waypoints.is_empty() {
            return Err(MobilityError::EmptyPath(path_id));
        }
        let cells = self.cells.list_by_owner(owner_id).await;
        let step = ue.speed.step() as i64;
        let len = waypoints.len() as i64;

        // Resume from the waypoint matching the stored position, if any.
        let mut index: i64 = waypoints
            .iter()
            .position(|wp| wp.latitude == ue.latitude && wp.longitude == ue.longitude)
            .map(|i| i as i64)
            .unwrap_or(-1);

        loop {
            let owns_session = self
                .sessions
                .read()
                .await
                .get(supi)
                .map(|session| session.token == token)
                .unwrap_or(false);
            if !owns_session {
                break;
            }

            let (latitude, longitude) = if step > 0 {
                index = (index + step).rem_euclid(len);
                let wp = &waypoints[index as usize];
                (wp.latitude, wp.longitude)
            } else {
                // Stationary devices keep their position but still get cell
                // resolution and subscription evaluation.
                (ue.latitude, ue.longitude)
            };

            let previous_cell_id = ue.cell_id;
            ue = self.ues.update_coordinates(supi, latitude, longitude).await?;
            let (cell_now, _) = geometry::select_cell(latitude, longitude, &cells);
            let current_cell_id = cell_now.map(|cell| cell.id);

            if current_cell_id != previous_cell_id {
                ue = self.ues.update_cell(supi, current_cell_id).await?;
                match current_cell_id {
                    Some(cell_id) => {
                        info!(supi, cell_id, "handover");
                        self.record_handover(supi, cell_id).await;
                    }
                    None => debug!(supi, "left all cell coverage"),
                }
            }

            self.update_attach_state(supi, current_cell_id.is_some()).await;

            let cell_now = cell_now.cloned();
            self.evaluate_subscriptions(&ue, previous_cell_id, cell_now.as_ref())
                .await;

            tokio::time::sleep(self.tick_interval).await;
        }

        Ok(())
    }

    async fn record_handover(&self, supi: &str, cell_id: i64) {
        if let Some(session) = self.sessions.write().await.get_mut(supi) {
            session.handovers.push(cell_id);
        }
    }

    async fn update_attach_state(&self, supi: &str, attached: bool) {
        if let Some(session) = self.sessions.write().await.get_mut(supi) {
            if attached {
                session.was_attached = true;
                session.cellless_ticks = 0;
                session.loss_reported.clear();
            } else {
                session.cellless_ticks = session.cellless_ticks.saturating_add(1);
            }
        }
    }

    /// Evaluate every subscription targeting a device for the current tick.
    ///
    /// Invalid subscriptions are deleted on observation; reports are built
    /// per monitoring type and handed to detached dispatch tasks so a slow
    /// subscriber never delays the next tick.
    async fn evaluate_subscriptions(
        &self,
        ue: &Ue,
        previous_cell_id: Option<i64>,
        current_cell: Option<&Cell>,
    ) {
        let subs = self.subscriptions.find_by_supi(&ue.supi).await;
        if subs.is_empty() {
            return;
        }

        // Loss-of-connectivity gating state; one-shot updates outside a
        // session report the transition immediately.
        let (was_attached, cellless_ticks) = {
            let sessions = self.sessions.read().await;
            sessions
                .get(&ue.supi)
                .map(|s| (s.was_attached, s.cellless_ticks))
                .unwrap_or((previous_cell_id.is_some(), u32::MAX))
        };

        for sub in subs {
            if !validity::is_subscription_valid(&sub) {
                info!(subscription = %sub.id, supi = %ue.supi, "removing invalid subscription");
                self.subscriptions.delete(sub.id).await;
                continue;
            }

            let report = match sub.monitoring_type {
                MonitoringType::LocationReporting => {
                    Some(report::location_report(ue, current_cell))
                }
                MonitoringType::LossOfConnectivity => {
                    self.loss_report(ue, &sub, current_cell.is_none(), was_attached, cellless_ticks)
                        .await
                }
                MonitoringType::UeReachability => {
                    if previous_cell_id.is_none() && current_cell.is_some() {
                        Some(report::ue_reachability_report(ue, sub.reachability_type))
                    } else {
                        None
                    }
                }
                MonitoringType::RoamingStatus => match current_cell {
                    Some(cell) if previous_cell_id != Some(cell.id) => Some(
                        report::roaming_status_report(ue, &cell.plmn, sub.plmn_indication),
                    ),
                    _ => None,
                },
            };

            if let Some(report) = report {
                let notification = MonitoringNotification::new(sub.link.clone(), report);
                self.spawn_dispatch(sub, notification);
            }
        }
    }

    /// Build a loss-of-connectivity report once the detection window elapsed.
    ///
    /// Fires at most once per outage per subscription; the marker set resets
    /// when the device reattaches.
    async fn loss_report(
        &self,
        ue: &Ue,
        sub: &Subscription,
        detached: bool,
        was_attached: bool,
        cellless_ticks: u32,
    ) -> Option<domain::models::MonitoringEventReport> {
        if !detached || !was_attached {
            return None;
        }
        let threshold = sub.maximum_detection_time.unwrap_or(1).clamp(1, u32::MAX as i64) as u32;
        if cellless_ticks < threshold {
            return None;
        }

        if let Some(session) = self.sessions.write().await.get_mut(&ue.supi) {
            if !session.loss_reported.insert(sub.id) {
                return None;
            }
        }

        Some(report::loss_of_connectivity_report(
            ue,
            LossOfConnectivityReason::MaxDetectionTimeExpired,
        ))
    }

    /// Fire-and-forget delivery of one notification.
    ///
    /// On success the subscription's remaining-report counter is decremented
    /// exactly once, and a permanent-redirect URL is persisted as the new
    /// destination. Failures are logged and abandoned for this tick.
    fn spawn_dispatch(&self, sub: Subscription, notification: MonitoringNotification) {
        let engine = self.clone();
        tokio::spawn(async move {
            let result = engine
                .dispatcher
                .send_notification(
                    &sub.notification_destination,
                    &notification,
                    engine.expected_status,
                )
                .await;

            match result {
                Ok(permanent_redirect) => {
                    if let Some(url) = permanent_redirect {
                        info!(subscription = %sub.id, destination = %url,
                            "subscriber moved permanently, updating destination");
                        if let Err(e) = engine
                            .subscriptions
                            .update_notification_destination(sub.id, &url)
                            .await
                        {
                            warn!(subscription = %sub.id, error = %e,
                                "failed to persist redirected destination");
                        }
                    }
                    if let Err(e) = engine.subscriptions.decrement_remaining_reports(sub.id).await
                    {
                        warn!(subscription = %sub.id, error = %e,
                            "failed to decrement remaining reports");
                    }
                }
                Err(e) => {
                    warn!(
                        subscription = %sub.id,
                        destination = %sub.notification_destination,
                        error = %e,
                        "notification delivery failed"
                    );
                }
            }
        });
    }
}
