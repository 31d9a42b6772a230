//! Selector → runner → presenter flow, against the mock backend and the
//! in-process simulation service.

use policysim::config::ModelKind;
use policysim::data::builtin;
use policysim::engine::service::SimulationService;
use policysim::types::{ExportFormat, Gender, ParameterField};
use policysim::ui::results::EMPTY_STATE;
use policysim::ui::selector::{NO_COUNTRIES_LABEL, RUN_LABEL};
use policysim::ui::{ResultsView, SimulationPage};

use crate::mock_backend::MockBackend;

#[tokio::test]
async fn test_full_flow_with_mock_backend() {
    let backend = MockBackend::with_defaults();
    let mut page = SimulationPage::mount(&backend).await;

    let view = page.selector().view();
    assert_eq!(view.options.len(), 2);
    assert!(view.options[0].selected);
    assert_eq!(view.run_button.label, RUN_LABEL);
    assert_eq!(page.results_view().to_string(), EMPTY_STATE);

    assert!(page.selector_mut().select_country("ESP"));
    page.selector_mut().set_parameter(ParameterField::HealthSpending, 9.0);
    assert!(page.run(&backend).await);

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].country, "ESP");
    assert_eq!(requests[0].parameters.health_spending, 9.0);
    assert_eq!(requests[0].parameters.doctor_density, 4.6);

    let text = page.results_view().to_string();
    assert!(text.contains("Simulation Results: ESP"));
    assert!(text.contains("Predicted Life Expectancy: 84.2"));
    assert!(text.contains("Change: +1.00 years"));
    assert!(text.contains("Health Spending: 7.3% → 9%"));
}

#[tokio::test]
async fn test_fetch_failure_leaves_empty_selector() {
    let backend = MockBackend::with_defaults();
    backend.set_error(Some("connection refused"));

    let mut page = SimulationPage::mount(&backend).await;
    assert!(page.selector().countries().is_empty());
    assert!(page.selector().view().to_string().contains(NO_COUNTRIES_LABEL));
    assert!(page.selector().view().run_button.disabled);

    backend.set_error(None);
    assert!(!page.run(&backend).await);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_backend_error_keeps_previous_result() {
    let backend = MockBackend::with_defaults();
    let mut page = SimulationPage::mount(&backend).await;
    assert!(page.run(&backend).await);
    let first = page.result().unwrap().simulation_id.clone();

    backend.set_error(Some("503 Simulation engine not ready"));
    assert!(!page.run(&backend).await);
    assert_eq!(page.result().unwrap().simulation_id, first);
    assert!(!page.selector().is_loading());
}

#[tokio::test]
async fn test_flow_against_simulation_service() {
    let service =
        SimulationService::from_records(&builtin::records(), ModelKind::Coefficient, 98.4).unwrap();
    let mut page = SimulationPage::mount(&service).await;
    assert_eq!(page.selector().countries().len(), 10);

    page.selector_mut().select_country("ESP");
    page.selector_mut().set_parameter(ParameterField::DoctorDensity, 5.6);
    assert!(page.run(&service).await);

    let result = page.result().unwrap();
    assert_eq!(result.country, "ESP");
    assert!((result.prediction.change - 0.12).abs() < 1e-9);
    assert!((result.prediction.life_expectancy - 83.32).abs() < 1e-9);

    match page.results_view() {
        ResultsView::Populated(panel) => {
            assert_eq!(panel.predicted_life_expectancy, "83.3");
            assert_eq!(panel.change, "+0.12 years");
            assert_eq!(panel.change_percentage, "+0.14%");
            assert_eq!(panel.metrics.model_version, "v1.0-coefficient");
        }
        ResultsView::Empty { .. } => panic!("expected populated results"),
    }
}

#[tokio::test]
async fn test_gendered_run_against_service() {
    let service =
        SimulationService::from_records(&builtin::records(), ModelKind::Coefficient, 98.4).unwrap();
    let mut page = SimulationPage::mount(&service).await;
    page.selector_mut().select_country("ESP");
    page.set_gender(Gender::Female);
    assert!(page.run(&service).await);

    let result = page.result().unwrap();
    assert!((result.baseline.life_expectancy - 85.9).abs() < 1e-9);
    assert!((result.prediction.confidence_interval.margin_of_error - 0.8).abs() < 1e-9);
}

#[tokio::test]
async fn test_export_click_forwards_tag() {
    let backend = MockBackend::with_defaults();
    let mut page = SimulationPage::mount(&backend).await;
    page.run(&backend).await;

    let mut tags = Vec::new();
    for format in ExportFormat::ALL {
        assert!(page.export(*format, |f| tags.push(f.tag())));
    }
    assert_eq!(tags, vec!["pdf", "csv", "image"]);
}
