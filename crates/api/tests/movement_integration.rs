//! End-to-end movement tests: a device walks a path against a real local
//! subscriber endpoint and the engine's notifications are observed on the
//! wire.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use tokio::sync::Mutex;
use uuid::Uuid;

use domain::models::{
    Cell, MonitoringType, Path, PlmnId, ReachabilityType, SpeedClass, Subscription, Ue, Waypoint,
};
use nef_emulator_api::services::dispatcher::NotificationDispatcher;
use nef_emulator_api::services::mobility::MobilityEngine;
use persistence::repositories::{
    CellRepository, PathRepository, SubscriptionRepository, UeRepository,
};

type ReceivedBodies = Arc<Mutex<Vec<serde_json::Value>>>;

struct Fixture {
    engine: MobilityEngine,
    ues: UeRepository,
    cells: CellRepository,
    paths: PathRepository,
    subscriptions: SubscriptionRepository,
}

fn fixture(tick: Duration) -> Fixture {
    let ues = UeRepository::new();
    let cells = CellRepository::new();
    let paths = PathRepository::new();
    let subscriptions = SubscriptionRepository::new();
    let engine = MobilityEngine::new(
        ues.clone(),
        cells.clone(),
        paths.clone(),
        subscriptions.clone(),
        NotificationDispatcher::new(Duration::from_secs(1), Duration::from_secs(1)),
        tick,
        204,
    );
    Fixture {
        engine,
        ues,
        cells,
        paths,
        subscriptions,
    }
}

/// Local subscriber recording every notification body and answering 204.
async fn spawn_subscriber() -> (SocketAddr, ReceivedBodies) {
    let received: ReceivedBodies = Arc::new(Mutex::new(Vec::new()));
    let state = received.clone();
    let router = Router::new().route(
        "/callback",
        post(move |Json(body): Json<serde_json::Value>| {
            let state = state.clone();
            async move {
                state.lock().await.push(body);
                StatusCode::NO_CONTENT
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind subscriber");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve subscriber");
    });
    (addr, received)
}

fn cell_at(id: i64, latitude: f64, longitude: f64, radius: f64) -> Cell {
    Cell {
        id,
        cell_id_hex: format!("AAAAA{:x}", 0x1000 + id),
        name: format!("cell{id}"),
        latitude,
        longitude,
        radius,
        owner_id: 1,
        plmn: PlmnId {
            mcc: "202".to_string(),
            mnc: "01".to_string(),
        },
    }
}

fn ue_at(supi: &str, latitude: f64, longitude: f64, path_id: Option<i64>) -> Ue {
    Ue {
        supi: supi.to_string(),
        name: "UE".to_string(),
        external_identifier: format!("{supi}@domain.com"),
        ipv4_addr: Some("10.0.0.1".to_string()),
        latitude,
        longitude,
        path_id,
        speed: SpeedClass::Low,
        cell_id: None,
        owner_id: 1,
        home_plmn: PlmnId {
            mcc: "202".to_string(),
            mnc: "01".to_string(),
        },
    }
}

fn subscription(supi: &str, monitoring_type: MonitoringType, destination: &str) -> Subscription {
    Subscription {
        id: Uuid::new_v4(),
        link: format!("http://localhost:8888/subscriptions/{}", Uuid::new_v4()),
        supi: supi.to_string(),
        monitoring_type,
        notification_destination: destination.to_string(),
        monitor_expire_time: None,
        maximum_number_of_reports: None,
        maximum_detection_time: None,
        reachability_type: None,
        plmn_indication: false,
        immediate_rep: false,
        owner_id: 1,
    }
}

async fn seed_path(paths: &PathRepository, id: i64, waypoints: Vec<Waypoint>) {
    paths
        .insert(
            Path {
                id,
                description: "test path".to_string(),
                owner_id: 1,
            },
            waypoints,
        )
        .await;
}

/// A device walking a square path crosses one cell: the handover is recorded
/// and a location notification carrying the cell id reaches the subscriber.
#[tokio::test]
async fn test_walk_through_cell_reports_location_with_cell_id() {
    let (addr, received) = spawn_subscriber().await;
    let f = fixture(Duration::from_millis(30));

    // Square, ~1.1 km per side; only the second waypoint is in coverage.
    seed_path(
        &f.paths,
        1,
        vec![
            Waypoint { latitude: 0.0, longitude: 0.0 },
            Waypoint { latitude: 0.01, longitude: 0.0 },
            Waypoint { latitude: 0.01, longitude: 0.01 },
            Waypoint { latitude: 0.0, longitude: 0.01 },
        ],
    )
    .await;
    f.cells.insert(cell_at(1, 0.01, 0.0, 500.0)).await;
    f.ues.insert(ue_at("202010000000001", 0.0, 0.0, Some(1))).await;
    f.subscriptions
        .insert(subscription(
            "202010000000001",
            MonitoringType::LocationReporting,
            &format!("http://{addr}/callback"),
        ))
        .await;

    f.engine.start_loop("202010000000001", 1).await.unwrap();
    // Three ticks: enter coverage on the first, leave it afterwards.
    tokio::time::sleep(Duration::from_millis(70)).await;
    assert_eq!(f.engine.handover_history("202010000000001").await, vec![1]);
    f.engine.stop_loop("202010000000001").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let bodies = received.lock().await;
    assert!(!bodies.is_empty());
    let attached: Vec<_> = bodies
        .iter()
        .filter(|b| b["monitoringEventReports"][0]["locationInfo"]["cellId"] == "AAAAA1001")
        .collect();
    assert_eq!(attached.len(), 1, "exactly one tick was spent in coverage");
    assert_eq!(
        attached[0]["monitoringEventReports"][0]["monitoringType"],
        "LOCATION_REPORTING"
    );

    let ue = f.ues.get_by_supi("202010000000001").await.unwrap();
    assert_eq!(ue.cell_id, None, "device left coverage again");
}

/// Loss of connectivity fires exactly once per outage, only after the
/// detection window elapsed.
#[tokio::test]
async fn test_loss_of_connectivity_after_detection_window() {
    let (addr, received) = spawn_subscriber().await;
    let f = fixture(Duration::from_millis(50));

    // Starts in coverage, every further waypoint is far outside.
    let mut waypoints = vec![Waypoint { latitude: 0.0, longitude: 0.0 }];
    for i in 1..8 {
        waypoints.push(Waypoint {
            latitude: 0.01 * i as f64 + 0.01,
            longitude: 0.05,
        });
    }
    seed_path(&f.paths, 1, waypoints).await;
    f.cells.insert(cell_at(1, 0.0, 0.0, 500.0)).await;
    let mut ue = ue_at("202010000000002", 0.0, 0.0, Some(1));
    ue.cell_id = Some(1);
    f.ues.insert(ue).await;

    let mut sub = subscription(
        "202010000000002",
        MonitoringType::LossOfConnectivity,
        &format!("http://{addr}/callback"),
    );
    sub.maximum_detection_time = Some(2);
    f.subscriptions.insert(sub).await;

    f.engine.start_loop("202010000000002", 1).await.unwrap();

    // One tick out of coverage is below the detection window.
    tokio::time::sleep(Duration::from_millis(25)).await;
    assert!(received.lock().await.is_empty());

    tokio::time::sleep(Duration::from_millis(225)).await;
    f.engine.stop_loop("202010000000002").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let bodies = received.lock().await;
    assert_eq!(bodies.len(), 1, "one outage, one notification");
    let report = &bodies[0]["monitoringEventReports"][0];
    assert_eq!(report["monitoringType"], "LOSS_OF_CONNECTIVITY");
    assert_eq!(report["lossOfConnectReason"], 7);
    assert_eq!(report["ipv4Addr"], "10.0.0.1");
}

/// A device entering coverage triggers a reachability notification.
#[tokio::test]
async fn test_reachability_on_attach() {
    let (addr, received) = spawn_subscriber().await;
    let f = fixture(Duration::from_millis(30));

    seed_path(
        &f.paths,
        1,
        vec![
            Waypoint { latitude: 0.05, longitude: 0.05 },
            Waypoint { latitude: 0.0, longitude: 0.0 },
        ],
    )
    .await;
    f.cells.insert(cell_at(1, 0.0, 0.0, 500.0)).await;
    f.ues.insert(ue_at("202010000000003", 0.05, 0.05, Some(1))).await;

    let mut sub = subscription(
        "202010000000003",
        MonitoringType::UeReachability,
        &format!("http://{addr}/callback"),
    );
    sub.reachability_type = Some(ReachabilityType::Sms);
    f.subscriptions.insert(sub).await;

    f.engine.start_loop("202010000000003", 1).await.unwrap();
    tokio::time::sleep(Duration::from_millis(40)).await;
    f.engine.stop_loop("202010000000003").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let bodies = received.lock().await;
    assert!(!bodies.is_empty());
    for body in bodies.iter() {
        let report = &body["monitoringEventReports"][0];
        assert_eq!(report["monitoringType"], "UE_REACHABILITY");
        assert_eq!(report["reachabilityType"], "SMS");
    }
}

/// The remaining-report counter is decremented per delivery and the
/// subscription disappears once it reaches zero.
#[tokio::test]
async fn test_report_counter_deletes_exhausted_subscription() {
    let (addr, received) = spawn_subscriber().await;
    let f = fixture(Duration::from_millis(50));

    // Stationary device parked inside coverage; location reports every tick.
    seed_path(
        &f.paths,
        1,
        vec![Waypoint { latitude: 0.0, longitude: 0.0 }],
    )
    .await;
    f.cells.insert(cell_at(1, 0.0, 0.0, 500.0)).await;
    let mut ue = ue_at("202010000000004", 0.0, 0.0, Some(1));
    ue.speed = SpeedClass::Stationary;
    f.ues.insert(ue).await;

    let mut sub = subscription(
        "202010000000004",
        MonitoringType::LocationReporting,
        &format!("http://{addr}/callback"),
    );
    sub.maximum_number_of_reports = Some(2);
    let sub_id = sub.id;
    f.subscriptions.insert(sub).await;

    f.engine.start_loop("202010000000004", 1).await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    f.engine.stop_loop("202010000000004").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(received.lock().await.len(), 2);
    assert!(f.subscriptions.get(sub_id).await.is_none());
}

/// Stopping and immediately restarting a loop must not leave the old task
/// ticking alongside the new one: the subscriber sees one loop's worth of
/// reports, not two.
#[tokio::test]
async fn test_restart_within_tick_does_not_duplicate_deliveries() {
    let (addr, received) = spawn_subscriber().await;
    let f = fixture(Duration::from_millis(50));

    seed_path(
        &f.paths,
        1,
        vec![Waypoint { latitude: 0.0, longitude: 0.0 }],
    )
    .await;
    f.cells.insert(cell_at(1, 0.0, 0.0, 500.0)).await;
    let mut ue = ue_at("202010000000007", 0.0, 0.0, Some(1));
    ue.speed = SpeedClass::Stationary;
    f.ues.insert(ue).await;
    f.subscriptions
        .insert(subscription(
            "202010000000007",
            MonitoringType::LocationReporting,
            &format!("http://{addr}/callback"),
        ))
        .await;

    f.engine.start_loop("202010000000007", 1).await.unwrap();
    // Restart within one tick interval, while the first task still sleeps.
    tokio::time::sleep(Duration::from_millis(20)).await;
    f.engine.stop_loop("202010000000007").await.unwrap();
    f.engine.start_loop("202010000000007", 1).await.unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;
    f.engine.stop_loop("202010000000007").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // ~11 ticks of a single loop at 50 ms; a surviving stale loop would
    // roughly double the count.
    let count = received.lock().await.len();
    assert!(count >= 8, "expected a steady stream of reports, got {count}");
    assert!(
        count <= 15,
        "a stale loop kept delivering after stop-loop/start-loop, got {count}"
    );
}

/// A permanent redirect rewrites the stored destination; later deliveries go
/// straight to the new URL.
#[tokio::test]
async fn test_permanent_redirect_updates_destination() {
    let received: ReceivedBodies = Arc::new(Mutex::new(Vec::new()));
    let state = received.clone();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let new_url = format!("http://{addr}/v2/callback");
    let redirect_to = new_url.clone();
    let router = Router::new()
        .route(
            "/callback",
            post(move || {
                let location = redirect_to.clone();
                async move {
                    (StatusCode::PERMANENT_REDIRECT, [(header::LOCATION, location)])
                }
            }),
        )
        .route(
            "/v2/callback",
            post(move |Json(body): Json<serde_json::Value>| {
                let state = state.clone();
                async move {
                    state.lock().await.push(body);
                    StatusCode::NO_CONTENT
                }
            }),
        );
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let f = fixture(Duration::from_millis(50));
    f.cells.insert(cell_at(1, 0.0, 0.0, 500.0)).await;
    f.ues.insert(ue_at("202010000000005", 0.1, 0.1, None)).await;

    let mut sub = subscription(
        "202010000000005",
        MonitoringType::LocationReporting,
        &format!("http://{addr}/callback"),
    );
    sub.maximum_number_of_reports = Some(5);
    let sub_id = sub.id;
    f.subscriptions.insert(sub).await;

    f.engine
        .update_single_location("202010000000005", 1, 0.0, 0.0)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(received.lock().await.len(), 1);
    let stored = f.subscriptions.get(sub_id).await.unwrap();
    assert_eq!(stored.notification_destination, new_url);
    assert_eq!(stored.maximum_number_of_reports, Some(4));
}

/// One-shot location updates attach the device and report roaming status
/// against the visited PLMN.
#[tokio::test]
async fn test_update_single_location_reports_roaming() {
    let (addr, received) = spawn_subscriber().await;
    let f = fixture(Duration::from_millis(50));

    let mut cell = cell_at(1, 0.0, 0.0, 500.0);
    cell.plmn = PlmnId {
        mcc: "310".to_string(),
        mnc: "410".to_string(),
    };
    f.cells.insert(cell).await;
    f.ues.insert(ue_at("202010000000006", 0.1, 0.1, None)).await;

    let mut sub = subscription(
        "202010000000006",
        MonitoringType::RoamingStatus,
        &format!("http://{addr}/callback"),
    );
    sub.plmn_indication = true;
    f.subscriptions.insert(sub).await;

    let ue = f
        .engine
        .update_single_location("202010000000006", 1, 0.0, 0.0)
        .await
        .unwrap();
    assert_eq!(ue.cell_id, Some(1));
    assert_eq!(ue.latitude, 0.0);
    tokio::time::sleep(Duration::from_millis(200)).await;

    let bodies = received.lock().await;
    assert_eq!(bodies.len(), 1);
    let report = &bodies[0]["monitoringEventReports"][0];
    assert_eq!(report["monitoringType"], "ROAMING_STATUS");
    assert_eq!(report["roamingStatus"], true);
    assert_eq!(report["plmnId"]["mcc"], "310");
    assert_eq!(report["plmnId"]["mnc"], "410");
}
