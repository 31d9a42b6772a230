//! Mock simulation backend for integration testing.
//!
//! Provides deterministic `CountrySource` and `SimulationRunner`
//! implementations that serve a fixed country list, record every request,
//! and can be forced to fail. All state is in-memory.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use policysim::client::{CountrySource, SimulationRunner};
use policysim::types::*;

pub struct MockBackend {
    countries: Vec<Country>,
    requests: Arc<Mutex<Vec<SimulationRequest>>>,
    /// If set, all operations will return this error.
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockBackend {
    pub fn new(countries: Vec<Country>) -> Self {
        Self {
            countries,
            requests: Arc::new(Mutex::new(Vec::new())),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Portugal and Spain with round-number baselines.
    pub fn with_defaults() -> Self {
        Self::new(vec![
            country("PRT", "Portugal", 81.2, 2.5, 5.8, 6.2),
            country("ESP", "Spain", 83.2, 4.6, 6.3, 7.3),
        ])
    }

    pub fn set_error(&self, message: Option<&str>) {
        *self.force_error.lock().unwrap() = message.map(str::to_string);
    }

    pub fn requests(&self) -> Vec<SimulationRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn check_error(&self) -> Result<()> {
        match self.force_error.lock().unwrap().as_deref() {
            Some(message) => Err(anyhow!(message.to_string())),
            None => Ok(()),
        }
    }
}

pub fn country(code: &str, name: &str, le: f64, doctors: f64, nurses: f64, spending: f64) -> Country {
    Country {
        code: code.to_string(),
        name: name.to_string(),
        baseline: Baseline {
            life_expectancy: le,
            doctor_density: doctors,
            nurse_density: nurses,
            health_spending: spending,
            year: 2022,
        },
        data_quality: 98.4,
        gender_life_expectancy: None,
    }
}

#[async_trait]
impl CountrySource for MockBackend {
    async fn fetch_countries(&self) -> Result<Vec<Country>> {
        self.check_error()?;
        Ok(self.countries.clone())
    }
}

#[async_trait]
impl SimulationRunner for MockBackend {
    /// Every request predicts exactly one extra year.
    async fn run_simulation(&self, request: &SimulationRequest) -> Result<SimulationResult> {
        self.check_error()?;
        self.requests.lock().unwrap().push(request.clone());

        let country = self
            .countries
            .iter()
            .find(|c| c.code == request.country)
            .ok_or_else(|| anyhow!("Country {} not found in baseline data", request.country))?;
        let base = country.baseline.life_expectancy;

        Ok(SimulationResult {
            simulation_id: format!("mock-{}", self.requests.lock().unwrap().len()),
            country: country.code.clone(),
            timestamp: "2024-01-01T00:00:00+00:00".to_string(),
            baseline: country.baseline,
            parameters: request.parameters,
            prediction: Prediction {
                life_expectancy: base + 1.0,
                change: 1.0,
                change_percentage: 100.0 / base,
                confidence_interval: ConfidenceInterval {
                    lower: base + 0.3,
                    upper: base + 1.7,
                    margin_of_error: 0.7,
                },
                feature_contributions: FeatureContributions {
                    doctor_density: 0.5,
                    nurse_density: 0.25,
                    health_spending: 0.25,
                    intercept: 0.0,
                },
            },
            model_metrics: ModelMetrics {
                r2_score: 0.78,
                mse: 0.5,
                rmse: 0.7,
                training_samples: 100,
                test_samples: 25,
            },
            metadata: SimulationMetadata {
                model_version: "mock".to_string(),
                execution_time: 0.0,
                data_quality: country.data_quality,
            },
        })
    }
}
