//! Health-indicator data.
//!
//! Defines the `HealthRecord` observation used to train models and derive
//! country baselines, the built-in dataset, and the country catalog.

pub mod builtin;
pub mod catalog;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::info;

/// One country-year observation of the four health indicators.
///
/// Missing or `null` indicators load as NaN, which marks the record
/// incomplete; it is then skipped by the catalog and the regression fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    /// ISO3 code, upper-case.
    pub country: String,
    pub year: i32,
    #[serde(default = "missing", deserialize_with = "nullable_f64")]
    pub life_expectancy: f64,
    #[serde(default = "missing", deserialize_with = "nullable_f64")]
    pub doctor_density: f64,
    #[serde(default = "missing", deserialize_with = "nullable_f64")]
    pub nurse_density: f64,
    #[serde(default = "missing", deserialize_with = "nullable_f64")]
    pub health_spending: f64,
    /// Male life expectancy, when the source splits it by sex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub male_life_expectancy: Option<f64>,
    /// Female life expectancy, when the source splits it by sex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub female_life_expectancy: Option<f64>,
}

fn missing() -> f64 {
    f64::NAN
}

fn nullable_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl HealthRecord {
    pub fn new(
        country: &str,
        year: i32,
        life_expectancy: f64,
        doctor_density: f64,
        nurse_density: f64,
        health_spending: f64,
    ) -> Self {
        Self {
            country: country.to_ascii_uppercase(),
            year,
            life_expectancy,
            doctor_density,
            nurse_density,
            health_spending,
            male_life_expectancy: None,
            female_life_expectancy: None,
        }
    }

    /// Attach a life-expectancy split by sex.
    pub fn with_gender_split(mut self, male: f64, female: f64) -> Self {
        self.male_life_expectancy = Some(male);
        self.female_life_expectancy = Some(female);
        self
    }

    /// The sex split, when both halves are present and finite.
    pub fn gender_split(&self) -> Option<(f64, f64)> {
        match (self.male_life_expectancy, self.female_life_expectancy) {
            (Some(male), Some(female)) if male.is_finite() && female.is_finite() => {
                Some((male, female))
            }
            _ => None,
        }
    }

    /// Whether every indicator is a finite number.
    pub fn is_complete(&self) -> bool {
        [
            self.life_expectancy,
            self.doctor_density,
            self.nurse_density,
            self.health_spending,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    /// The three model features, in fixed order.
    pub fn features(&self) -> [f64; 3] {
        [self.doctor_density, self.nurse_density, self.health_spending]
    }
}

/// Load health records from a JSON array file.
pub fn load_records(path: &Path) -> Result<Vec<HealthRecord>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read health records from {}", path.display()))?;
    let mut records: Vec<HealthRecord> = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse health records from {}", path.display()))?;
    for record in &mut records {
        record.country = record.country.trim().to_ascii_uppercase();
    }

    info!(path = %path.display(), count = records.len(), "Health records loaded");
    Ok(records)
}

/// Records from `path` when given, otherwise the built-in dataset.
pub fn records_or_builtin(path: Option<&str>) -> Result<Vec<HealthRecord>> {
    match path {
        Some(p) => load_records(Path::new(p)),
        None => Ok(builtin::records()),
    }
}
