//! `ApiClient` against a live in-process server on an ephemeral port.

use std::sync::Arc;

use policysim::client::{ApiClient, CountrySource, SimulationRunner};
use policysim::config::{AppConfig, ClientConfig};
use policysim::engine::benchmark::ComparisonRequest;
use policysim::engine::service::SimulationService;
use policysim::server::{build_router, ServerState};
use policysim::types::{ParameterSet, PolicySimError, SimulationRequest};

/// Serve the default-config router on 127.0.0.1:0 and return a client for it.
async fn spawn_server() -> ApiClient {
    let config = AppConfig::default();
    let service = SimulationService::from_records(
        &policysim::data::builtin::records(),
        config.simulation.model,
        config.simulation.data_quality,
    )
    .unwrap();
    let state = Arc::new(ServerState::new(service, Vec::new(), &config));
    let app = build_router(state, &config.server.cors_origins);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    ApiClient::new(&ClientConfig {
        api_base_url: format!("http://{addr}/"),
        timeout_secs: 5,
    })
    .unwrap()
}

fn request(code: &str) -> SimulationRequest {
    SimulationRequest {
        country: code.to_string(),
        parameters: ParameterSet {
            doctor_density: 4.0,
            nurse_density: 9.0,
            health_spending: 10.0,
        },
        gender: Default::default(),
    }
}

#[tokio::test]
async fn test_client_round_trip_against_server() {
    let client = spawn_server().await;
    assert!(!client.base_url().ends_with('/'));

    let countries = client.fetch_countries().await.unwrap();
    assert_eq!(countries.len(), 10);
    assert_eq!(countries[0].code, "CAN");

    let prt = client.run(&request("PRT")).await.unwrap();
    assert_eq!(prt.country, "PRT");
    assert_eq!(prt.parameters.health_spending, 10.0);
    let esp = client.run_simulation(&request("esp")).await.unwrap();
    assert_eq!(esp.country, "ESP");

    let history = client.history(Some("PRT"), 10, 0).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].simulation_id, prt.simulation_id);
    let all = client.history(None, 10, 0).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].simulation_id, esp.simulation_id);

    let info = client.model_info().await.unwrap();
    assert_eq!(info.model_type, "BaselineRelativeCoefficients");
    assert_eq!(info.features.len(), 3);

    let comparison = client
        .compare(&ComparisonRequest {
            countries: vec!["PRT".into(), "ESP".into()],
            metrics: None,
        })
        .await
        .unwrap();
    assert_eq!(comparison.rankings.len(), 2);

    let narrative = client.narrative(&prt.simulation_id).await.unwrap();
    assert_eq!(narrative.country, "PRT");
}

#[tokio::test]
async fn test_client_maps_error_status_and_detail() {
    let client = spawn_server().await;

    let err = client.run(&request("XYZ")).await.unwrap_err();
    match err.downcast_ref::<PolicySimError>() {
        Some(PolicySimError::Api { status, message }) => {
            assert_eq!(*status, 404);
            assert_eq!(message, "Country XYZ not found in baseline data");
        }
        other => panic!("expected Api error, got {other:?}"),
    }

    let mut invalid = request("PRT");
    invalid.parameters.nurse_density = 25.0;
    let err = client.run(&invalid).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PolicySimError>(),
        Some(PolicySimError::Api { status: 422, .. })
    ));

    let err = client.narrative("missing").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PolicySimError>(),
        Some(PolicySimError::Api { status: 404, .. })
    ));
}
