//! Shared types for the policy simulation assistant.
//!
//! These types form the data model exchanged between the simulation
//! backend, the HTTP API, and the presentation layer. Field names match
//! the JSON wire format exactly.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Country & baseline
// ---------------------------------------------------------------------------

/// A country's current (pre-policy-change) health statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    /// Life expectancy at birth, in years.
    pub life_expectancy: f64,
    /// Doctors per 1,000 population.
    pub doctor_density: f64,
    /// Nurses and midwives per 1,000 population.
    pub nurse_density: f64,
    /// Government health spending as % of GDP.
    pub health_spending: f64,
    /// Year the statistics were recorded.
    pub year: i32,
}

impl Baseline {
    /// Current value of one policy lever.
    pub fn value(&self, field: ParameterField) -> f64 {
        match field {
            ParameterField::DoctorDensity => self.doctor_density,
            ParameterField::NurseDensity => self.nurse_density,
            ParameterField::HealthSpending => self.health_spending,
        }
    }
}

impl fmt::Display for Baseline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LE {:.1}y | doctors {:.1} | nurses {:.1} | spending {:.1}% ({})",
            self.life_expectancy,
            self.doctor_density,
            self.nurse_density,
            self.health_spending,
            self.year,
        )
    }
}

/// Life expectancy split by sex, when the data source provides it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenderLifeExpectancy {
    pub male: f64,
    pub female: f64,
}

/// A country available for simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    /// ISO3 code, e.g. "ESP".
    pub code: String,
    pub name: String,
    pub baseline: Baseline,
    /// Data quality score on a 0–100 scale.
    pub data_quality: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender_life_expectancy: Option<GenderLifeExpectancy>,
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) {}", self.name, self.code, self.baseline)
    }
}

impl Country {
    /// Baseline life expectancy for the requested gender, falling back to
    /// the combined figure when no split is available.
    pub fn life_expectancy_for(&self, gender: Gender) -> f64 {
        match (gender, self.gender_life_expectancy) {
            (Gender::Male, Some(g)) => g.male,
            (Gender::Female, Some(g)) => g.female,
            _ => self.baseline.life_expectancy,
        }
    }

    #[cfg(test)]
    pub fn sample(code: &str, doctor_density: f64) -> Self {
        Country {
            code: code.to_string(),
            name: format!("Country {code}"),
            baseline: Baseline {
                life_expectancy: 81.5,
                doctor_density,
                nurse_density: 6.0,
                health_spending: 7.2,
                year: 2022,
            },
            data_quality: 98.4,
            gender_life_expectancy: None,
        }
    }
}

/// Body of `GET /api/simulations/countries`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountriesResponse {
    pub countries: Vec<Country>,
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Room left above a baseline that exceeds the default slider maximum.
const RANGE_HEADROOM: f64 = 1.5;

/// One of the three adjustable policy levers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterField {
    DoctorDensity,
    NurseDensity,
    HealthSpending,
}

impl ParameterField {
    pub const ALL: &'static [ParameterField] = &[
        ParameterField::DoctorDensity,
        ParameterField::NurseDensity,
        ParameterField::HealthSpending,
    ];

    /// Wire/field name.
    pub fn key(&self) -> &'static str {
        match self {
            ParameterField::DoctorDensity => "doctor_density",
            ParameterField::NurseDensity => "nurse_density",
            ParameterField::HealthSpending => "health_spending",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ParameterField::DoctorDensity => "Doctor Density",
            ParameterField::NurseDensity => "Nurse Density",
            ParameterField::HealthSpending => "Health Spending",
        }
    }

    /// Default inclusive slider range `(min, max)`.
    pub fn range(&self) -> (f64, f64) {
        match self {
            ParameterField::DoctorDensity => (0.0, 10.0),
            ParameterField::NurseDensity => (0.0, 20.0),
            ParameterField::HealthSpending => (0.0, 15.0),
        }
    }

    /// Slider range for a country: the default range, widened so the
    /// country's own baseline value always lies inside it.
    pub fn range_for(&self, baseline: &Baseline) -> (f64, f64) {
        let (min, max) = self.range();
        let current = baseline.value(*self);
        if !current.is_finite() {
            return (min, max);
        }
        let min = if current < min { current.floor() } else { min };
        let max = if current > max {
            (current * RANGE_HEADROOM).ceil()
        } else {
            max
        };
        (min, max)
    }

    /// Slider step.
    pub fn step(&self) -> f64 {
        0.1
    }

    /// Whether the field is a percentage (spending) rather than a density.
    pub fn is_percentage(&self) -> bool {
        matches!(self, ParameterField::HealthSpending)
    }
}

impl fmt::Display for ParameterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The three policy levers a user adjusts before running a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterSet {
    pub doctor_density: f64,
    pub nurse_density: f64,
    pub health_spending: f64,
}

impl ParameterSet {
    /// Seed a parameter set from a country's baseline.
    pub fn from_baseline(baseline: &Baseline) -> Self {
        Self {
            doctor_density: baseline.doctor_density,
            nurse_density: baseline.nurse_density,
            health_spending: baseline.health_spending,
        }
    }

    pub fn get(&self, field: ParameterField) -> f64 {
        match field {
            ParameterField::DoctorDensity => self.doctor_density,
            ParameterField::NurseDensity => self.nurse_density,
            ParameterField::HealthSpending => self.health_spending,
        }
    }

    pub fn set(&mut self, field: ParameterField, value: f64) {
        match field {
            ParameterField::DoctorDensity => self.doctor_density = value,
            ParameterField::NurseDensity => self.nurse_density = value,
            ParameterField::HealthSpending => self.health_spending = value,
        }
    }

    /// Reject non-finite values and values outside the country's slider
    /// range (see [`ParameterField::range_for`]).
    pub fn validate(&self, baseline: &Baseline) -> Result<(), PolicySimError> {
        for &field in ParameterField::ALL {
            let value = self.get(field);
            let (min, max) = field.range_for(baseline);
            if !value.is_finite() || value < min || value > max {
                return Err(PolicySimError::InvalidParameter {
                    field: field.key().to_string(),
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "doctors={:.1} nurses={:.1} spending={:.1}%",
            self.doctor_density, self.nurse_density, self.health_spending,
        )
    }
}

/// Population subgroup a simulation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    #[default]
    Both,
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Both => write!(f, "BOTH"),
            Gender::Male => write!(f, "MALE"),
            Gender::Female => write!(f, "FEMALE"),
        }
    }
}

/// Body of `POST /api/simulations/run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub country: String,
    pub parameters: ParameterSet,
    #[serde(default)]
    pub gender: Gender,
}

// ---------------------------------------------------------------------------
// Simulation result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub margin_of_error: f64,
}

/// Portion of the predicted outcome attributable to each lever.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureContributions {
    pub doctor_density: f64,
    pub nurse_density: f64,
    pub health_spending: f64,
    pub intercept: f64,
}

impl FeatureContributions {
    pub fn get(&self, field: ParameterField) -> f64 {
        match field {
            ParameterField::DoctorDensity => self.doctor_density,
            ParameterField::NurseDensity => self.nurse_density,
            ParameterField::HealthSpending => self.health_spending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub life_expectancy: f64,
    pub change: f64,
    pub change_percentage: f64,
    pub confidence_interval: ConfidenceInterval,
    pub feature_contributions: FeatureContributions,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub r2_score: f64,
    pub mse: f64,
    pub rmse: f64,
    pub training_samples: u32,
    pub test_samples: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationMetadata {
    pub model_version: String,
    /// Seconds.
    pub execution_time: f64,
    /// 0–100.
    pub data_quality: f64,
}

/// A completed policy simulation. Read-only once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub simulation_id: String,
    pub country: String,
    pub timestamp: String,
    pub baseline: Baseline,
    pub parameters: ParameterSet,
    pub prediction: Prediction,
    pub model_metrics: ModelMetrics,
    pub metadata: SimulationMetadata,
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {:.1} -> {:.1} years ({:+.2}) R²={:.3}",
            self.simulation_id,
            self.country,
            self.baseline.life_expectancy,
            self.prediction.life_expectancy,
            self.prediction.change,
            self.model_metrics.r2_score,
        )
    }
}

impl SimulationResult {
    /// A fully-populated result for tests.
    #[cfg(test)]
    pub fn sample() -> Self {
        SimulationResult {
            simulation_id: "sim-001".to_string(),
            country: "PRT".to_string(),
            timestamp: "2026-10-16T12:00:00+00:00".to_string(),
            baseline: Baseline {
                life_expectancy: 81.2,
                doctor_density: 2.5,
                nurse_density: 5.8,
                health_spending: 6.2,
                year: 2022,
            },
            parameters: ParameterSet {
                doctor_density: 3.0,
                nurse_density: 6.5,
                health_spending: 7.0,
            },
            prediction: Prediction {
                life_expectancy: 82.1,
                change: 0.9,
                change_percentage: 1.1,
                confidence_interval: ConfidenceInterval {
                    lower: 81.4,
                    upper: 82.8,
                    margin_of_error: 0.7,
                },
                feature_contributions: FeatureContributions {
                    doctor_density: 0.3,
                    nurse_density: 0.2,
                    health_spending: 0.4,
                    intercept: 80.0,
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
                model_version: "v1.0".to_string(),
                execution_time: 0.1,
                data_quality: 98.4,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Export format tag emitted by the results presenter's export buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Csv,
    Image,
}

impl ExportFormat {
    pub const ALL: &'static [ExportFormat] =
        &[ExportFormat::Pdf, ExportFormat::Csv, ExportFormat::Image];

    /// Literal tag handed to export handlers.
    pub fn tag(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Csv => "csv",
            ExportFormat::Image => "image",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = PolicySimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "csv" => Ok(ExportFormat::Csv),
            "image" | "png" => Ok(ExportFormat::Image),
            other => Err(PolicySimError::UnsupportedExport(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Model info
// ---------------------------------------------------------------------------

/// Description of the active prediction model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub status: String,
    pub model_type: String,
    pub model_version: String,
    pub features: Vec<String>,
    pub target: String,
    /// Coefficient per feature.
    pub feature_importance: std::collections::BTreeMap<String, f64>,
    pub metrics: ModelMetrics,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum PolicySimError {
    #[error("Country {0} not found in baseline data")]
    CountryNotFound(String),

    #[error("Invalid {field}: {value} outside [{min}, {max}]")]
    InvalidParameter {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Insufficient data for training: need {needed} records, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("Model error: {0}")]
    Model(String),

    #[error("Simulation {0} not found")]
    SimulationNotFound(String),

    #[error("Unsupported export format: {0}")]
    UnsupportedExport(String),

    #[error("Export format {0} is generated client-side")]
    ExportNotAvailable(ExportFormat),

    #[error("Unknown benchmark metric: {0}")]
    UnknownMetric(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
