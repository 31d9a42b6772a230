//! Simulation engine: prediction models and the service that turns a
//! run request into a `SimulationResult`.

pub mod benchmark;
pub mod coefficient;
pub mod narrative;
pub mod regression;
pub mod service;

use crate::types::{Baseline, Gender, ModelInfo, ModelMetrics, ParameterSet, PolicySimError, Prediction};

/// Feature names in model order.
pub const FEATURES: [&str; 3] = ["doctor_density", "nurse_density", "health_spending"];
/// Predicted quantity.
pub const TARGET: &str = "life_expectancy";

/// Abstraction over life-expectancy prediction models.
///
/// `baseline.life_expectancy` is already adjusted for the requested gender;
/// models only use `gender` for their own coefficient tweaks.
pub trait PredictionModel: Send + Sync {
    /// Predict the outcome of moving from `baseline` to `parameters`.
    fn predict(
        &self,
        baseline: &Baseline,
        parameters: &ParameterSet,
        gender: Gender,
    ) -> Result<Prediction, PolicySimError>;

    /// Quality metrics reported alongside each prediction.
    fn metrics(&self) -> ModelMetrics;

    /// Version string stamped into simulation metadata.
    fn version(&self) -> &str;

    /// Description for `GET /api/simulations/model/info`.
    fn info(&self) -> ModelInfo;
}

/// Change as a percentage of baseline; 0 when the baseline is not positive.
pub fn change_percentage(change: f64, baseline_life_expectancy: f64) -> f64 {
    if baseline_life_expectancy > 0.0 {
        change / baseline_life_expectancy * 100.0
    } else {
        0.0
    }
}
