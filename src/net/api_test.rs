use super::*;
use crate::net::types::{PushMessage, Verdict};
use axum::Router;
use axum::extract::ws::{Message as WsMessage, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tokio::time::timeout;

type Captured = Arc<Mutex<Vec<String>>>;

async fn spawn_stub(router: Router) -> HttpOracleApi {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("stub listener should bind");
    let addr = listener.local_addr().expect("stub listener should have an address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    HttpOracleApi::new(&format!("http://{addr}"), Duration::from_secs(5)).expect("client should build")
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn new_bond() -> NewBond {
    NewBond {
        name: "Test Farm".to_owned(),
        lat: 12.97,
        lon: 77.59,
        capacity_kw: 100.0,
        threshold: 75.0,
        interest_rate: Some(4.5),
        contract_address: "0x00000000000000000000000000000000000000aa".to_owned(),
    }
}

// =============================================================
// Endpoint paths
// =============================================================

#[test]
fn endpoints_format_expected_paths() {
    let base = "http://127.0.0.1:8000";
    assert_eq!(bonds_endpoint(base), "http://127.0.0.1:8000/api/v1/bonds");
    assert_eq!(audit_endpoint(base, "abc123"), "http://127.0.0.1:8000/oracle/audit/abc123");
    assert_eq!(
        daily_pr_endpoint(base, "abc123", date("2026-10-19")),
        "http://127.0.0.1:8000/oracle/pr/abc123/2026-10-19"
    );
    assert_eq!(time_warp_endpoint(base, "abc123"), "http://127.0.0.1:8000/api/v1/oracle/time-warp/abc123");
    assert_eq!(manual_log_endpoint(base, "abc123"), "http://127.0.0.1:8000/api/v1/bonds/abc123/log-manual");
    assert_eq!(penalty_summary_endpoint(base, "abc123"), "http://127.0.0.1:8000/oracle/penalty-summary/abc123");
}

#[test]
fn new_trims_trailing_slash_and_rejects_bad_scheme() {
    let api = HttpOracleApi::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
    assert_eq!(api.base_url(), "http://localhost:8000");
    assert!(matches!(
        HttpOracleApi::new("localhost:8000", Duration::from_secs(1)),
        Err(ApiError::InvalidBaseUrl(_))
    ));
}

// =============================================================
// Registry
// =============================================================

#[tokio::test]
async fn list_bonds_reads_bare_array() {
    let router = Router::new().route(
        "/api/v1/bonds",
        get(|| async { axum::Json(json!([{ "id": "abc123", "name": "Test Farm", "capacity_kw": 100, "threshold": 75 }])) }),
    );
    let api = spawn_stub(router).await;
    let bonds = api.list_bonds().await.expect("list should succeed");
    assert_eq!(bonds.len(), 1);
    assert_eq!(bonds[0].name, "Test Farm");
}

#[tokio::test]
async fn list_bonds_reads_wrapped_list() {
    let router = Router::new().route(
        "/api/v1/bonds",
        get(|| async { axum::Json(json!({ "bonds": [{ "id": "a" }, { "id": "b" }] })) }),
    );
    let api = spawn_stub(router).await;
    let bonds = api.list_bonds().await.unwrap();
    let ids: Vec<&str> = bonds.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn list_bonds_surfaces_non_success_status() {
    let router = Router::new().route(
        "/api/v1/bonds",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let api = spawn_stub(router).await;
    match api.list_bonds().await {
        Err(ApiError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn list_bonds_surfaces_malformed_body() {
    let router = Router::new().route("/api/v1/bonds", get(|| async { "<html>not json</html>" }));
    let api = spawn_stub(router).await;
    assert!(matches!(api.list_bonds().await, Err(ApiError::Decode(_))));
}

#[tokio::test]
async fn list_bonds_surfaces_transport_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let api = HttpOracleApi::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    assert!(matches!(api.list_bonds().await, Err(ApiError::Transport(_))));
}

// =============================================================
// Detail reads
// =============================================================

#[tokio::test]
async fn audit_and_today_hit_bond_scoped_paths() {
    let router = Router::new()
        .route(
            "/oracle/audit/{bond_id}",
            get(|Path(bond_id): Path<String>| async move {
                axum::Json(json!({
                    "bond_id": bond_id,
                    "total_days": 1,
                    "audit_log": [{ "date": "2026-10-18", "performance_ratio": "77.5", "verdict": "COMPLIANT" }]
                }))
            }),
        )
        .route(
            "/oracle/pr/{bond_id}/{date}",
            get(|Path((bond_id, date)): Path<(String, String)>| async move {
                axum::Json(json!({ "bond_id": bond_id, "date": date, "performance_ratio": 81.0, "verdict": "COMPLIANT" }))
            }),
        );
    let api = spawn_stub(router).await;

    let log = api.audit_log("abc123").await.unwrap();
    assert_eq!(log.entries[0].performance_ratio, 77.5);
    assert_eq!(log.summary.total_days, Some(1));

    let today = api.today_result("abc123", date("2026-10-19")).await.unwrap();
    assert_eq!(today.date.as_deref(), Some("2026-10-19"));
    assert_eq!(today.performance_ratio, Some(81.0));
    assert_eq!(today.verdict, Some(Verdict::Compliant));
}

#[tokio::test]
async fn time_warp_returns_entries_sorted_by_date() {
    let router = Router::new().route(
        "/api/v1/oracle/time-warp/{bond_id}",
        get(|| async {
            axum::Json(json!({ "audit_log": [
                { "date": "2026-10-03", "performance_ratio": 70 },
                { "date": "2026-10-01", "performance_ratio": 90 },
                { "date": "2026-10-02", "performance_ratio": 80 }
            ]}))
        }),
    );
    let api = spawn_stub(router).await;
    let log = api.time_warp("abc123").await.unwrap();
    let dates: Vec<&str> = log.entries.iter().map(|e| e.date.as_str()).collect();
    assert_eq!(dates, vec!["2026-10-01", "2026-10-02", "2026-10-03"]);
}

#[tokio::test]
async fn penalty_summary_reads_report() {
    let router = Router::new().route(
        "/oracle/penalty-summary/{bond_id}",
        get(|| async {
            axum::Json(json!({
                "total_days": 30,
                "penalty_days": 1,
                "penalty_rate": 3.33,
                "penalty_events": [{ "date": "2026-10-02", "pr": 60.0, "actual_energy": 120.0, "theoretical_max": 200.0, "shortfall": 80.0 }]
            }))
        }),
    );
    let api = spawn_stub(router).await;
    let summary = api.penalty_summary("abc123").await.unwrap();
    assert_eq!(summary.penalty_days, 1);
    assert_eq!(summary.events[0].shortfall, 80.0);
}

// =============================================================
// Writes
// =============================================================

#[tokio::test]
async fn create_bond_json_sends_body() {
    let captured = Captured::default();
    let router = Router::new()
        .route(
            "/api/v1/bonds",
            post(|State(captured): State<Captured>, axum::Json(body): axum::Json<serde_json::Value>| async move {
                captured.lock().unwrap().push(body.to_string());
                (StatusCode::CREATED, axum::Json(json!({ "id": "new1" })))
            }),
        )
        .with_state(captured.clone());
    let api = spawn_stub(router).await;

    api.create_bond(&new_bond(), RegistrationEncoding::Json).await.unwrap();

    let bodies = captured.lock().unwrap().clone();
    assert_eq!(bodies.len(), 1);
    let body: serde_json::Value = serde_json::from_str(&bodies[0]).unwrap();
    assert_eq!(body["name"], "Test Farm");
    assert_eq!(body["capacity_kw"], 100.0);
    assert_eq!(body["contract_address"], "0x00000000000000000000000000000000000000aa");
}

#[tokio::test]
async fn create_bond_query_sends_parameters() {
    let captured = Captured::default();
    let router = Router::new()
        .route(
            "/api/v1/bonds",
            post(|State(captured): State<Captured>, Query(params): Query<HashMap<String, String>>| async move {
                let mut keys: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
                keys.sort();
                captured.lock().unwrap().extend(keys);
                StatusCode::OK
            }),
        )
        .with_state(captured.clone());
    let api = spawn_stub(router).await;

    api.create_bond(&new_bond(), RegistrationEncoding::Query).await.unwrap();

    let params = captured.lock().unwrap().clone();
    assert!(params.contains(&"name=Test Farm".to_owned()));
    assert!(params.contains(&"threshold=75".to_owned()) || params.contains(&"threshold=75.0".to_owned()));
    assert!(params.contains(&"interest_rate=4.5".to_owned()));
    assert!(params.iter().any(|p| p.starts_with("contract_address=0x")));
}

#[tokio::test]
async fn create_bond_rejection_carries_detail() {
    let router = Router::new().route(
        "/api/v1/bonds",
        post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(json!({ "detail": "duplicate bond name" }))) }),
    );
    let api = spawn_stub(router).await;
    let err = api
        .create_bond(&new_bond(), RegistrationEncoding::Json)
        .await
        .expect_err("422 should fail");
    assert_eq!(err.rejection_detail().as_deref(), Some("\"duplicate bond name\""));
}

#[tokio::test]
async fn log_manual_sends_actual_energy_parameter() {
    let captured = Captured::default();
    let router = Router::new()
        .route(
            "/api/v1/bonds/{bond_id}/log-manual",
            post(
                |State(captured): State<Captured>,
                 Path(bond_id): Path<String>,
                 Query(params): Query<HashMap<String, String>>| async move {
                    let energy = params.get("actual_energy").cloned().unwrap_or_default();
                    captured.lock().unwrap().push(format!("{bond_id}:{energy}"));
                    StatusCode::OK
                },
            ),
        )
        .with_state(captured.clone());
    let api = spawn_stub(router).await;

    api.log_manual("abc123", 412.5).await.unwrap();

    assert_eq!(captured.lock().unwrap().as_slice(), ["abc123:412.5".to_owned()]);
}

// =============================================================
// Live feed
// =============================================================

#[tokio::test]
async fn subscribe_streams_updates_and_releases_on_dispose() {
    let (closed_tx, closed_rx) = oneshot::channel::<()>();
    let closed_tx = Arc::new(Mutex::new(Some(closed_tx)));
    let router = Router::new().route(
        "/ws/oracle/{bond_id}",
        get(move |Path(bond_id): Path<String>, ws: WebSocketUpgrade| {
            let closed_tx = closed_tx.clone();
            async move {
                ws.on_upgrade(move |mut socket| async move {
                    let update = json!({
                        "type": "ORACLE_UPDATE",
                        "data": { "date": "2026-10-19", "performance_ratio": 91.2, "verdict": "COMPLIANT" }
                    });
                    let ping = json!({ "type": "PING", "bond_id": bond_id });
                    let _ = socket.send(WsMessage::Text(ping.to_string().into())).await;
                    let _ = socket.send(WsMessage::Text(update.to_string().into())).await;
                    while let Some(Ok(message)) = socket.recv().await {
                        if matches!(message, WsMessage::Close(_)) {
                            break;
                        }
                    }
                    if let Some(tx) = closed_tx.lock().unwrap().take() {
                        let _ = tx.send(());
                    }
                })
                .into_response()
            }
        }),
    );
    let api = spawn_stub(router).await;

    let mut sub = api.subscribe("abc123").await.expect("feed should connect");
    assert_eq!(sub.bond_id(), "abc123");

    let first = timeout(Duration::from_secs(2), sub.recv()).await.unwrap().unwrap();
    let second = timeout(Duration::from_secs(2), sub.recv()).await.unwrap().unwrap();
    assert_eq!(
        crate::net::normalize::push_message(&first).unwrap(),
        PushMessage::Unrecognized("PING".to_owned())
    );
    let PushMessage::OracleUpdate(entry) = crate::net::normalize::push_message(&second).unwrap() else {
        panic!("expected oracle update");
    };
    assert_eq!(entry.performance_ratio, 91.2);

    sub.dispose();
    timeout(Duration::from_secs(2), closed_rx)
        .await
        .expect("server should observe the close")
        .unwrap();
}

#[tokio::test]
async fn subscribe_fails_without_ws_route() {
    let router = Router::new().route("/api/v1/bonds", get(|| async { "[]" }));
    let api = spawn_stub(router).await;
    assert!(matches!(api.subscribe("abc123").await, Err(ApiError::WsConnect(_))));
}
