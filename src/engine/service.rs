//! Simulation service.
//!
//! Owns the country catalog and the active prediction model, and turns a
//! `SimulationRequest` into a complete `SimulationResult`.

use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use super::coefficient::CoefficientModel;
use super::regression::RegressionModel;
use super::PredictionModel;
use crate::client::{CountrySource, SimulationRunner};
use crate::config::ModelKind;
use crate::data::catalog::Catalog;
use crate::data::HealthRecord;
use crate::types::{
    Baseline, Country, ModelInfo, ModelMetrics, PolicySimError, SimulationMetadata,
    SimulationRequest, SimulationResult,
};

/// Build the configured model over `records`.
pub fn build_model(
    kind: ModelKind,
    records: &[HealthRecord],
) -> Result<Box<dyn PredictionModel>, PolicySimError> {
    Ok(match kind {
        ModelKind::Coefficient => Box::new(CoefficientModel::default()),
        ModelKind::Regression => Box::new(RegressionModel::fit(records)?),
    })
}

/// Catalog + model, ready to run simulations.
pub struct SimulationService {
    catalog: Catalog,
    model: Box<dyn PredictionModel>,
    kind: ModelKind,
    data_quality: f64,
}

impl SimulationService {
    pub fn new(catalog: Catalog, model: Box<dyn PredictionModel>, kind: ModelKind, data_quality: f64) -> Self {
        Self {
            catalog,
            model,
            kind,
            data_quality,
        }
    }

    /// Build catalog and model from `records`.
    pub fn from_records(
        records: &[HealthRecord],
        kind: ModelKind,
        data_quality: f64,
    ) -> Result<Self, PolicySimError> {
        let catalog = Catalog::from_records(records, data_quality);
        let model = build_model(kind, records)?;
        info!(
            countries = catalog.len(),
            model = model.version(),
            "Simulation service initialised"
        );
        Ok(Self::new(catalog, model, kind, data_quality))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn model_info(&self) -> ModelInfo {
        self.model.info()
    }

    /// Rebuild catalog and model from fresh records. On failure the current
    /// state is left untouched.
    pub fn retrain(&mut self, records: &[HealthRecord]) -> Result<ModelMetrics, PolicySimError> {
        let model = build_model(self.kind, records)?;
        self.catalog = Catalog::from_records(records, self.data_quality);
        self.model = model;
        info!(countries = self.catalog.len(), "Simulation service retrained");
        Ok(self.model.metrics())
    }

    /// Run one simulation.
    pub fn run(&self, request: &SimulationRequest) -> Result<SimulationResult, PolicySimError> {
        let started = Instant::now();

        let country: &Country = self
            .catalog
            .get(&request.country)
            .ok_or_else(|| PolicySimError::CountryNotFound(request.country.clone()))?;
        request.parameters.validate(&country.baseline)?;

        let baseline = Baseline {
            life_expectancy: country.life_expectancy_for(request.gender),
            ..country.baseline
        };

        let prediction = self
            .model
            .predict(&baseline, &request.parameters, request.gender)?;

        let result = SimulationResult {
            simulation_id: Uuid::new_v4().to_string(),
            country: country.code.clone(),
            timestamp: Utc::now().to_rfc3339(),
            baseline,
            parameters: request.parameters,
            prediction,
            model_metrics: self.model.metrics(),
            metadata: SimulationMetadata {
                model_version: self.model.version().to_string(),
                execution_time: started.elapsed().as_secs_f64(),
                data_quality: self.data_quality,
            },
        };

        debug!(
            country = %result.country,
            gender = %request.gender,
            change = format!("{:+.2}", result.prediction.change),
            "Simulation complete"
        );
        Ok(result)
    }
}

#[async_trait]
impl CountrySource for SimulationService {
    async fn fetch_countries(&self) -> Result<Vec<Country>> {
        Ok(self.catalog.countries().to_vec())
    }
}

#[async_trait]
impl SimulationRunner for SimulationService {
    async fn run_simulation(&self, request: &SimulationRequest) -> Result<SimulationResult> {
        Ok(self.run(request)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::builtin;
    use crate::types::{Gender, ParameterSet};

    fn service() -> SimulationService {
        SimulationService::from_records(&builtin::records(), ModelKind::Coefficient, 98.4).unwrap()
    }

    fn request_for(service: &SimulationService, code: &str) -> SimulationRequest {
        let country = service.catalog().get(code).unwrap();
        SimulationRequest {
            country: code.to_string(),
            parameters: ParameterSet::from_baseline(&country.baseline),
            gender: Gender::Both,
        }
    }

    #[test]
    fn test_run_at_baseline() {
        let service = service();
        let result = service.run(&request_for(&service, "PRT")).unwrap();
        assert_eq!(result.country, "PRT");
        assert!(result.prediction.change.abs() < 1e-12);
        assert_eq!(result.metadata.model_version, "v1.0-coefficient");
        assert!((result.metadata.data_quality - 98.4).abs() < 1e-12);
        assert!(result.metadata.execution_time >= 0.0);
        assert!(Uuid::parse_str(&result.simulation_id).is_ok());
        assert!(chrono::DateTime::parse_from_rfc3339(&result.timestamp).is_ok());
    }

    #[test]
    fn test_run_lowercase_code_normalised() {
        let service = service();
        let mut request = request_for(&service, "ESP");
        request.country = "esp".to_string();
        let result = service.run(&request).unwrap();
        assert_eq!(result.country, "ESP");
    }

    #[test]
    fn test_ids_unique() {
        let service = service();
        let request = request_for(&service, "SWE");
        let a = service.run(&request).unwrap();
        let b = service.run(&request).unwrap();
        assert_ne!(a.simulation_id, b.simulation_id);
    }

    #[test]
    fn test_unknown_country() {
        let service = service();
        let mut request = request_for(&service, "PRT");
        request.country = "XYZ".to_string();
        assert!(matches!(
            service.run(&request),
            Err(PolicySimError::CountryNotFound(code)) if code == "XYZ"
        ));
    }

    #[test]
    fn test_invalid_parameters() {
        let service = service();
        let mut request = request_for(&service, "PRT");
        request.parameters.nurse_density = 25.0;
        assert!(matches!(
            service.run(&request),
            Err(PolicySimError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_gendered_baseline() {
        let service = service();
        let mut request = request_for(&service, "ESP");
        request.gender = Gender::Female;
        let result = service.run(&request).unwrap();
        assert!((result.baseline.life_expectancy - 85.9).abs() < 1e-12);
        assert!((result.prediction.confidence_interval.margin_of_error - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_baseline_run_above_default_range() {
        let records = vec![HealthRecord::new("USA", 2022, 77.5, 2.7, 12.0, 16.8)];
        let service = SimulationService::from_records(&records, ModelKind::Coefficient, 98.4).unwrap();
        let result = service.run(&request_for(&service, "USA")).unwrap();
        assert_eq!(result.parameters.health_spending, 16.8);
        assert!(result.prediction.change.abs() < 1e-12);
    }

    #[test]
    fn test_gendered_run_uses_loaded_data_only() {
        let records = vec![HealthRecord::new("ESP", 2022, 70.0, 4.6, 6.3, 7.3)];
        let service = SimulationService::from_records(&records, ModelKind::Coefficient, 98.4).unwrap();
        let mut request = request_for(&service, "ESP");
        request.gender = Gender::Male;
        let result = service.run(&request).unwrap();
        assert_eq!(result.baseline.life_expectancy, 70.0);
    }

    #[test]
    fn test_regression_service() {
        let service =
            SimulationService::from_records(&builtin::records(), ModelKind::Regression, 98.4)
                .unwrap();
        let result = service.run(&request_for(&service, "DEU")).unwrap();
        assert_eq!(result.metadata.model_version, "v1.0");
        assert_eq!(result.model_metrics.training_samples, 32);
        assert_eq!(service.model_info().model_type, "LinearRegression");
    }

    #[test]
    fn test_retrain_failure_keeps_state() {
        let mut service =
            SimulationService::from_records(&builtin::records(), ModelKind::Regression, 98.4)
                .unwrap();
        let few: Vec<_> = builtin::records().into_iter().take(3).collect();
        assert!(service.retrain(&few).is_err());
        assert_eq!(service.catalog().len(), 10);
    }

    #[test]
    fn test_retrain_replaces_catalog() {
        let mut service = service();
        let spain_only: Vec<_> = builtin::records()
            .into_iter()
            .filter(|r| r.country == "ESP")
            .collect();
        service.retrain(&spain_only).unwrap();
        assert_eq!(service.catalog().len(), 1);
        assert!(service.catalog().get("PRT").is_none());
    }

    #[tokio::test]
    async fn test_service_as_runner() {
        let service = service();
        let request = request_for(&service, "ITA");
        let result = service.run_simulation(&request).await.unwrap();
        assert_eq!(result.country, "ITA");
        assert_eq!(service.fetch_countries().await.unwrap().len(), 10);
    }
}
