//! Country catalog.
//!
//! Derives each country's baseline from its most recent health record and
//! serves the list the selector populates its dropdown from.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use super::builtin;
use super::HealthRecord;
use crate::client::CountrySource;
use crate::types::{Baseline, Country, GenderLifeExpectancy};

/// Immutable set of countries available for simulation, sorted by code.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    countries: Vec<Country>,
}

impl Catalog {
    /// Build a catalog from health records. Incomplete records are skipped;
    /// each country's baseline is its latest complete year.
    pub fn from_records(records: &[HealthRecord], data_quality: f64) -> Self {
        let mut latest: BTreeMap<&str, &HealthRecord> = BTreeMap::new();
        for record in records.iter().filter(|r| r.is_complete()) {
            latest
                .entry(record.country.as_str())
                .and_modify(|current| {
                    if record.year > current.year {
                        *current = record;
                    }
                })
                .or_insert(record);
        }

        let countries: Vec<Country> = latest
            .into_values()
            .map(|r| Country {
                code: r.country.clone(),
                name: builtin::country_name(&r.country)
                    .map(str::to_string)
                    .unwrap_or_else(|| r.country.clone()),
                baseline: Baseline {
                    life_expectancy: r.life_expectancy,
                    doctor_density: r.doctor_density,
                    nurse_density: r.nurse_density,
                    health_spending: r.health_spending,
                    year: r.year,
                },
                data_quality,
                gender_life_expectancy: r
                    .gender_split()
                    .map(|(male, female)| GenderLifeExpectancy { male, female }),
            })
            .collect();

        debug!(count = countries.len(), "Catalog built");
        Self { countries }
    }

    /// Catalog over the built-in dataset.
    pub fn builtin(data_quality: f64) -> Self {
        Self::from_records(&builtin::records(), data_quality)
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    /// Case-insensitive lookup by ISO3 code.
    pub fn get(&self, code: &str) -> Option<&Country> {
        self.countries
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code.trim()))
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

#[async_trait]
impl CountrySource for Catalog {
    async fn fetch_countries(&self) -> Result<Vec<Country>> {
        Ok(self.countries.clone())
    }
}
