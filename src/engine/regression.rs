//! Fitted linear regression model.
//!
//! Ordinary least squares on `[doctor_density, nurse_density,
//! health_spending] → life_expectancy` with an intercept, solved through
//! the normal equations. Every fifth record (in country/year order) is
//! held out to compute test-set metrics.

use std::collections::BTreeMap;

use tracing::info;

use super::{change_percentage, PredictionModel, FEATURES, TARGET};
use crate::data::HealthRecord;
use crate::types::{
    Baseline, ConfidenceInterval, FeatureContributions, Gender, ModelInfo, ModelMetrics,
    ParameterSet, PolicySimError, Prediction,
};

/// Minimum complete records required to fit.
pub const MIN_TRAINING_RECORDS: usize = 10;

/// One record in every `HOLDOUT_STRIDE` goes to the test set (20%).
const HOLDOUT_STRIDE: usize = 5;

/// z-score for a 95% interval.
const Z_95: f64 = 1.96;

const MODEL_VERSION: &str = "v1.0";

/// Dimension of the design matrix (three features plus intercept).
const DIM: usize = 4;

/// A trained OLS model.
#[derive(Debug, Clone)]
pub struct RegressionModel {
    intercept: f64,
    coefficients: [f64; 3],
    metrics: ModelMetrics,
}

impl RegressionModel {
    /// Fit on `records`. Incomplete records are dropped first.
    pub fn fit(records: &[HealthRecord]) -> Result<Self, PolicySimError> {
        let mut clean: Vec<&HealthRecord> = records.iter().filter(|r| r.is_complete()).collect();
        if clean.len() < MIN_TRAINING_RECORDS {
            return Err(PolicySimError::InsufficientData {
                needed: MIN_TRAINING_RECORDS,
                available: clean.len(),
            });
        }
        clean.sort_by(|a, b| a.country.cmp(&b.country).then(a.year.cmp(&b.year)));

        let (test, train): (Vec<_>, Vec<_>) = clean
            .iter()
            .enumerate()
            .partition(|(i, _)| i % HOLDOUT_STRIDE == HOLDOUT_STRIDE - 1);
        let train: Vec<&HealthRecord> = train.into_iter().map(|(_, r)| *r).collect();
        let test: Vec<&HealthRecord> = test.into_iter().map(|(_, r)| *r).collect();

        let beta = solve_least_squares(&train)?;
        let mut model = Self {
            intercept: beta[0],
            coefficients: [beta[1], beta[2], beta[3]],
            metrics: ModelMetrics {
                r2_score: 0.0,
                mse: 0.0,
                rmse: 0.0,
                training_samples: train.len() as u32,
                test_samples: test.len() as u32,
            },
        };

        let (r2, mse) = model.evaluate(&test);
        model.metrics.r2_score = r2;
        model.metrics.mse = mse;
        model.metrics.rmse = mse.sqrt();

        info!(
            r2 = format!("{r2:.3}"),
            rmse = format!("{:.3}", model.metrics.rmse),
            train = train.len(),
            test = test.len(),
            "Regression model trained"
        );
        Ok(model)
    }

    /// Raw prediction for a feature vector.
    pub fn predict_value(&self, features: [f64; 3]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> [f64; 3] {
        self.coefficients
    }

    /// (R², MSE) over `records`.
    fn evaluate(&self, records: &[&HealthRecord]) -> (f64, f64) {
        if records.is_empty() {
            return (0.0, 0.0);
        }
        let n = records.len() as f64;
        let mean = records.iter().map(|r| r.life_expectancy).sum::<f64>() / n;

        let mut ss_res = 0.0;
        let mut ss_tot = 0.0;
        for r in records {
            let residual = r.life_expectancy - self.predict_value(r.features());
            ss_res += residual * residual;
            ss_tot += (r.life_expectancy - mean).powi(2);
        }

        let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };
        (r2, ss_res / n)
    }
}

impl PredictionModel for RegressionModel {
    fn predict(
        &self,
        baseline: &Baseline,
        parameters: &ParameterSet,
        _gender: Gender,
    ) -> Result<Prediction, PolicySimError> {
        let features = [
            parameters.doctor_density,
            parameters.nurse_density,
            parameters.health_spending,
        ];
        let life_expectancy = self.predict_value(features);
        let change = life_expectancy - baseline.life_expectancy;
        let margin = Z_95 * self.metrics.rmse;

        let [cd, cn, cs] = self.coefficients;
        Ok(Prediction {
            life_expectancy,
            change,
            change_percentage: change_percentage(change, baseline.life_expectancy),
            confidence_interval: ConfidenceInterval {
                lower: (life_expectancy - margin).max(0.0),
                upper: life_expectancy + margin,
                margin_of_error: margin,
            },
            feature_contributions: FeatureContributions {
                doctor_density: cd * parameters.doctor_density,
                nurse_density: cn * parameters.nurse_density,
                health_spending: cs * parameters.health_spending,
                intercept: self.intercept,
            },
        })
    }

    fn metrics(&self) -> ModelMetrics {
        self.metrics
    }

    fn version(&self) -> &str {
        MODEL_VERSION
    }

    fn info(&self) -> ModelInfo {
        let feature_importance: BTreeMap<String, f64> = FEATURES
            .iter()
            .zip(self.coefficients)
            .map(|(name, coef)| (name.to_string(), coef))
            .collect();

        ModelInfo {
            status: "trained".to_string(),
            model_type: "LinearRegression".to_string(),
            model_version: MODEL_VERSION.to_string(),
            features: FEATURES.iter().map(|f| f.to_string()).collect(),
            target: TARGET.to_string(),
            feature_importance,
            metrics: self.metrics,
        }
    }
}

/// Solve `(XᵀX) β = Xᵀy` with `X = [1, features]`.
fn solve_least_squares(records: &[&HealthRecord]) -> Result<[f64; DIM], PolicySimError> {
    let mut xtx = [[0.0; DIM]; DIM];
    let mut xty = [0.0; DIM];

    for r in records {
        let [d, n, s] = r.features();
        let row = [1.0, d, n, s];
        for i in 0..DIM {
            xty[i] += row[i] * r.life_expectancy;
            for j in 0..DIM {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }

    gaussian_solve(xtx, xty)
}

/// Pivots smaller than this fraction of their column's largest original
/// entry mark the system as singular.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Gaussian elimination with partial pivoting.
fn gaussian_solve(
    mut a: [[f64; DIM]; DIM],
    mut b: [f64; DIM],
) -> Result<[f64; DIM], PolicySimError> {
    let mut scale = [0.0_f64; DIM];
    for (col, s) in scale.iter_mut().enumerate() {
        *s = (0..DIM).map(|row| a[row][col].abs()).fold(0.0, f64::max);
    }

    for col in 0..DIM {
        let pivot = (col..DIM)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if scale[col] == 0.0 || a[pivot][col].abs() < PIVOT_TOLERANCE * scale[col] {
            return Err(PolicySimError::Model(
                "training data is collinear; cannot fit regression".to_string(),
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..DIM {
            let factor = a[row][col] / a[col][col];
            for k in col..DIM {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0; DIM];
    for row in (0..DIM).rev() {
        let tail: f64 = ((row + 1)..DIM).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}
