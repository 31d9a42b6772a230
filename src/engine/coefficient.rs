//! Baseline-relative coefficient model.
//!
//! Each lever contributes `(value − baseline) × coefficient` years of life
//! expectancy, with per-gender multipliers. Quality metrics are fixed
//! values from the offline calibration run.

use std::collections::BTreeMap;

use super::{change_percentage, PredictionModel, FEATURES, TARGET};
use crate::types::{
    Baseline, ConfidenceInterval, FeatureContributions, Gender, ModelInfo, ModelMetrics,
    ParameterSet, PolicySimError, Prediction,
};

/// Years of life expectancy per unit change of each lever.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub doctor_density: f64,
    pub nurse_density: f64,
    pub health_spending: f64,
}

impl Default for Coefficients {
    fn default() -> Self {
        Self {
            doctor_density: 0.12,
            nurse_density: 0.06,
            health_spending: 0.18,
        }
    }
}

impl Coefficients {
    /// Multipliers applied per gender.
    fn gender_multipliers(gender: Gender) -> (f64, f64, f64) {
        match gender {
            Gender::Male => (1.2, 1.0, 1.1),
            Gender::Female => (0.8, 1.0, 0.9),
            Gender::Both => (1.0, 1.0, 1.0),
        }
    }

    /// Coefficients adjusted for `gender`.
    pub fn for_gender(&self, gender: Gender) -> Self {
        let (d, n, s) = Self::gender_multipliers(gender);
        Self {
            doctor_density: self.doctor_density * d,
            nurse_density: self.nurse_density * n,
            health_spending: self.health_spending * s,
        }
    }
}

const MARGIN_BOTH: f64 = 0.7;
const MARGIN_GENDERED: f64 = 0.8;

const MODEL_VERSION: &str = "v1.0-coefficient";

const CALIBRATION_METRICS: ModelMetrics = ModelMetrics {
    r2_score: 0.78,
    mse: 0.5,
    rmse: 0.7,
    training_samples: 100,
    test_samples: 25,
};

/// The default prediction model.
#[derive(Debug, Clone, Default)]
pub struct CoefficientModel {
    coefficients: Coefficients,
}

impl CoefficientModel {
    pub fn new(coefficients: Coefficients) -> Self {
        Self { coefficients }
    }
}

impl PredictionModel for CoefficientModel {
    fn predict(
        &self,
        baseline: &Baseline,
        parameters: &ParameterSet,
        gender: Gender,
    ) -> Result<Prediction, PolicySimError> {
        let coef = self.coefficients.for_gender(gender);

        let contributions = FeatureContributions {
            doctor_density: (parameters.doctor_density - baseline.doctor_density)
                * coef.doctor_density,
            nurse_density: (parameters.nurse_density - baseline.nurse_density)
                * coef.nurse_density,
            health_spending: (parameters.health_spending - baseline.health_spending)
                * coef.health_spending,
            intercept: 0.0,
        };

        let change = contributions.doctor_density
            + contributions.nurse_density
            + contributions.health_spending;
        let life_expectancy = baseline.life_expectancy + change;

        let margin = if gender == Gender::Both {
            MARGIN_BOTH
        } else {
            MARGIN_GENDERED
        };

        Ok(Prediction {
            life_expectancy,
            change,
            change_percentage: change_percentage(change, baseline.life_expectancy),
            confidence_interval: ConfidenceInterval {
                lower: life_expectancy - margin,
                upper: life_expectancy + margin,
                margin_of_error: margin,
            },
            feature_contributions: contributions,
        })
    }

    fn metrics(&self) -> ModelMetrics {
        CALIBRATION_METRICS
    }

    fn version(&self) -> &str {
        MODEL_VERSION
    }

    fn info(&self) -> ModelInfo {
        let c = self.coefficients;
        let feature_importance: BTreeMap<String, f64> = FEATURES
            .iter()
            .zip([c.doctor_density, c.nurse_density, c.health_spending])
            .map(|(name, value)| (name.to_string(), value))
            .collect();

        ModelInfo {
            status: "trained".to_string(),
            model_type: "BaselineRelativeCoefficients".to_string(),
            model_version: MODEL_VERSION.to_string(),
            features: FEATURES.iter().map(|f| f.to_string()).collect(),
            target: TARGET.to_string(),
            feature_importance,
            metrics: CALIBRATION_METRICS,
        }
    }
}
