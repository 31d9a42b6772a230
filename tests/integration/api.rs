//! HTTP API end to end: config → service → router, with history persisted
//! to a temporary file.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tower::ServiceExt;

use policysim::config::AppConfig;
use policysim::data::{self, HealthRecord};
use policysim::engine::service::SimulationService;
use policysim::server::{build_router, ServerState};
use policysim::storage;
use policysim::types::{ModelInfo, SimulationResult};

fn temp_file(prefix: &str) -> String {
    let mut p = std::env::temp_dir();
    p.push(format!("{prefix}_{}.json", uuid::Uuid::new_v4()));
    p.to_string_lossy().to_string()
}

fn router_for(config: &AppConfig) -> Router {
    let records = data::records_or_builtin(config.data.records_path.as_deref()).unwrap();
    let service = SimulationService::from_records(
        &records,
        config.simulation.model,
        config.simulation.data_quality,
    )
    .unwrap();
    let state = Arc::new(ServerState::new(service, Vec::new(), config));
    build_router(state, &config.server.cors_origins)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    (status, body.to_vec())
}

fn run_request(code: &str) -> Request<Body> {
    let body = serde_json::json!({
        "country": code,
        "parameters": {
            "doctor_density": 4.0,
            "nurse_density": 9.0,
            "health_spending": 10.0
        }
    });
    Request::builder()
        .method("POST")
        .uri("/api/simulations/run")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_history_persisted_and_bounded() {
    let history_path = temp_file("policysim_it_history");
    let config = AppConfig::from_toml(&format!(
        r#"
        [simulation]
        model = "coefficient"
        data_quality = 98.4
        history_path = "{}"
        history_limit = 2
        "#,
        history_path.replace('\\', "\\\\")
    ))
    .unwrap();
    let app = router_for(&config);

    let mut ids = Vec::new();
    for code in ["PRT", "ESP", "SWE"] {
        let (status, body) = send(&app, run_request(code)).await;
        assert_eq!(status, StatusCode::OK);
        let result: SimulationResult = serde_json::from_slice(&body).unwrap();
        ids.push(result.simulation_id);
    }

    let saved = storage::load_history(Some(&history_path)).unwrap();
    let saved_ids: Vec<_> = saved.iter().map(|r| r.simulation_id.clone()).collect();
    assert_eq!(saved_ids, ids[1..].to_vec());

    let (_, body) = send(&app, get("/api/simulations/history?limit=5000")).await;
    let served: Vec<SimulationResult> = serde_json::from_slice(&body).unwrap();
    assert_eq!(served.len(), 2);
    assert_eq!(served[0].country, "SWE");

    let (status, _) = send(&app, get(&format!("/api/simulations/{}/export/csv", ids[0]))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    storage::delete_history(Some(&history_path)).unwrap();
}

#[tokio::test]
async fn test_regression_model_from_records_file() {
    let records_path = temp_file("policysim_it_records");
    let records: Vec<HealthRecord> = data::builtin::records()
        .into_iter()
        .filter(|r| r.country != "USA")
        .collect();
    std::fs::write(&records_path, serde_json::to_string(&records).unwrap()).unwrap();

    let config = AppConfig::from_toml(&format!(
        r#"
        [simulation]
        model = "regression"
        data_quality = 95.0
        history_limit = 10

        [data]
        records_path = "{}"
        "#,
        records_path.replace('\\', "\\\\")
    ))
    .unwrap();
    let app = router_for(&config);

    let (status, body) = send(&app, get("/api/simulations/model/info")).await;
    assert_eq!(status, StatusCode::OK);
    let info: ModelInfo = serde_json::from_slice(&body).unwrap();
    assert_eq!(info.model_type, "LinearRegression");
    assert_eq!(info.features.len(), 3);
    assert_eq!(info.metrics.training_samples + info.metrics.test_samples, 36);

    let (status, _) = send(&app, run_request("USA")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, run_request("DEU")).await;
    assert_eq!(status, StatusCode::OK);
    let result: SimulationResult = serde_json::from_slice(&body).unwrap();
    assert_eq!(result.metadata.model_version, "v1.0");
    assert_eq!(result.metadata.data_quality, 95.0);
    let ci = &result.prediction.confidence_interval;
    assert!(ci.lower <= result.prediction.life_expectancy);
    assert!(ci.upper >= result.prediction.life_expectancy);

    let retrain = Request::builder()
        .method("POST")
        .uri("/api/simulations/model/retrain")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, retrain).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["countries_loaded"], 9);

    std::fs::remove_file(&records_path).unwrap();
}

#[tokio::test]
async fn test_page_routes() {
    let app = router_for(&AppConfig::default());

    let (status, body) = send(&app, get("/dashboard")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(String::from_utf8(body).unwrap().contains("does not exist"));

    let (status, body) = send(&app, get("/narrative")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("Policy Narratives"));

    let (status, body) = send(&app, get("/benchmark")).await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Best: Sweden  Worst: Greece"));
}

#[tokio::test]
async fn test_unwritable_history_path_does_not_fail_run() {
    let mut dir = std::env::temp_dir();
    dir.push(format!("policysim_missing_{}", uuid::Uuid::new_v4()));
    dir.push("history.json");
    let history_path = dir.to_string_lossy().to_string();

    let config = AppConfig::from_toml(&format!(
        r#"
        [simulation]
        model = "coefficient"
        data_quality = 98.4
        history_path = "{}"
        history_limit = 5
        "#,
        history_path.replace('\\', "\\\\")
    ))
    .unwrap();
    let app = router_for(&config);

    let (status, _) = send(&app, run_request("PRT")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!std::path::Path::new(&history_path).exists());

    let (_, body) = send(&app, get("/api/simulations/history")).await;
    let served: Vec<SimulationResult> = serde_json::from_slice(&body).unwrap();
    assert_eq!(served.len(), 1);
}
