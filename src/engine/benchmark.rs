//! Cross-country benchmarking.
//!
//! Ranks countries on each health indicator against the whole catalog,
//! then orders the compared countries by their mean percentile.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::catalog::Catalog;
use crate::types::{Baseline, Country, ParameterField, PolicySimError};
use crate::ui::format;

/// An indicator countries are ranked on. Higher values rank better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    LifeExpectancy,
    DoctorDensity,
    NurseDensity,
    HealthSpending,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::LifeExpectancy,
        Metric::DoctorDensity,
        Metric::NurseDensity,
        Metric::HealthSpending,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Metric::LifeExpectancy => "life_expectancy",
            Metric::DoctorDensity => ParameterField::DoctorDensity.key(),
            Metric::NurseDensity => ParameterField::NurseDensity.key(),
            Metric::HealthSpending => ParameterField::HealthSpending.key(),
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::LifeExpectancy => "years",
            Metric::DoctorDensity | Metric::NurseDensity => "per 1,000 population",
            Metric::HealthSpending => "% of GDP",
        }
    }

    pub fn value(&self, baseline: &Baseline) -> f64 {
        match self {
            Metric::LifeExpectancy => baseline.life_expectancy,
            Metric::DoctorDensity => baseline.value(ParameterField::DoctorDensity),
            Metric::NurseDensity => baseline.value(ParameterField::NurseDensity),
            Metric::HealthSpending => baseline.value(ParameterField::HealthSpending),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Metric {
    type Err = PolicySimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Metric::ALL
            .into_iter()
            .find(|m| m.key() == key)
            .ok_or_else(|| PolicySimError::UnknownMetric(s.to_string()))
    }
}

/// `POST /api/benchmarks/compare` body. Empty `countries` compares the
/// whole catalog; missing `metrics` uses all four.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonRequest {
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub metrics: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetric {
    pub name: String,
    pub value: f64,
    pub unit: String,
    /// Competition rank across the catalog (ties share a rank).
    pub rank: usize,
    pub percentile: f64,
    pub baseline_year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRanking {
    pub country_code: String,
    pub country_name: String,
    pub overall_rank: usize,
    pub metrics: Vec<HealthMetric>,
    /// Mean metric percentile scaled to 0..=1.
    pub total_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub total_countries: usize,
    pub best_performer: Option<String>,
    pub worst_performer: Option<String>,
    pub average_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub countries: Vec<String>,
    pub metrics: Vec<String>,
    /// Catalog size the per-metric ranks are taken over.
    pub ranked_against: usize,
    pub rankings: Vec<CountryRanking>,
    pub summary: BenchmarkSummary,
    pub generated_at: String,
}

/// Code/name pair for `GET /api/benchmarks/countries`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkCountry {
    pub code: String,
    pub name: String,
}

pub fn countries(catalog: &Catalog) -> Vec<BenchmarkCountry> {
    catalog
        .countries()
        .iter()
        .map(|c| BenchmarkCountry {
            code: c.code.clone(),
            name: c.name.clone(),
        })
        .collect()
}

/// Rank `value` among `population`: one plus the number strictly above it.
fn competition_rank(value: f64, population: &[f64]) -> usize {
    1 + population.iter().filter(|v| **v > value).count()
}

fn percentile(rank: usize, n: usize) -> f64 {
    if n <= 1 {
        100.0
    } else {
        (n - rank) as f64 / (n - 1) as f64 * 100.0
    }
}

/// Compare countries from `catalog` on the requested metrics.
pub fn compare(catalog: &Catalog, request: &ComparisonRequest) -> Result<Comparison, PolicySimError> {
    let metrics: Vec<Metric> = match &request.metrics {
        Some(names) if !names.is_empty() => {
            let mut parsed = Vec::with_capacity(names.len());
            for name in names {
                let metric: Metric = name.parse()?;
                if !parsed.contains(&metric) {
                    parsed.push(metric);
                }
            }
            parsed
        }
        _ => Metric::ALL.to_vec(),
    };

    let selected: Vec<&Country> = if request.countries.is_empty() {
        catalog.countries().iter().collect()
    } else {
        let mut selected: Vec<&Country> = Vec::with_capacity(request.countries.len());
        for code in &request.countries {
            let country = catalog
                .get(code)
                .ok_or_else(|| PolicySimError::CountryNotFound(code.trim().to_string()))?;
            if !selected.iter().any(|c| c.code == country.code) {
                selected.push(country);
            }
        }
        selected
    };

    let n = catalog.len();
    let populations: Vec<Vec<f64>> = metrics
        .iter()
        .map(|m| catalog.countries().iter().map(|c| m.value(&c.baseline)).collect())
        .collect();

    let mut rankings: Vec<CountryRanking> = selected
        .iter()
        .map(|country| {
            let scored: Vec<HealthMetric> = metrics
                .iter()
                .zip(&populations)
                .map(|(metric, population)| {
                    let value = metric.value(&country.baseline);
                    let rank = competition_rank(value, population);
                    HealthMetric {
                        name: metric.key().to_string(),
                        value,
                        unit: metric.unit().to_string(),
                        rank,
                        percentile: percentile(rank, n),
                        baseline_year: country.baseline.year,
                    }
                })
                .collect();
            let total_score = if scored.is_empty() {
                0.0
            } else {
                scored.iter().map(|m| m.percentile).sum::<f64>() / scored.len() as f64 / 100.0
            };
            CountryRanking {
                country_code: country.code.clone(),
                country_name: country.name.clone(),
                overall_rank: 0,
                metrics: scored,
                total_score,
            }
        })
        .collect();

    let scores: Vec<f64> = rankings.iter().map(|r| r.total_score).collect();
    for ranking in &mut rankings {
        ranking.overall_rank = competition_rank(ranking.total_score, &scores);
    }
    rankings.sort_by(|a, b| {
        a.overall_rank
            .cmp(&b.overall_rank)
            .then_with(|| a.country_code.cmp(&b.country_code))
    });

    let average_score = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };
    let summary = BenchmarkSummary {
        total_countries: rankings.len(),
        best_performer: rankings.first().map(|r| r.country_name.clone()),
        worst_performer: rankings.last().map(|r| r.country_name.clone()),
        average_score,
    };
    debug!(countries = rankings.len(), metrics = metrics.len(), "Benchmark computed");

    Ok(Comparison {
        countries: rankings.iter().map(|r| r.country_code.clone()).collect(),
        metrics: metrics.iter().map(|m| m.key().to_string()).collect(),
        ranked_against: n,
        rankings,
        summary,
        generated_at: Utc::now().to_rfc3339(),
    })
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Health Benchmarks: {} countries ranked against {}",
            self.summary.total_countries, self.ranked_against
        )?;
        for ranking in &self.rankings {
            writeln!(f)?;
            writeln!(
                f,
                "{}. {} ({})  score {}",
                ranking.overall_rank,
                ranking.country_name,
                ranking.country_code,
                format::fixed(ranking.total_score, 2)
            )?;
            for metric in &ranking.metrics {
                writeln!(
                    f,
                    "   {}: {} {} (rank {}/{}, percentile {})",
                    metric.name,
                    format::fixed(metric.value, 1),
                    metric.unit,
                    metric.rank,
                    self.ranked_against,
                    format::fixed(metric.percentile, 0)
                )?;
            }
        }
        if let (Some(best), Some(worst)) = (&self.summary.best_performer, &self.summary.worst_performer) {
            writeln!(f)?;
            write!(
                f,
                "Best: {best}  Worst: {worst}  Average score: {}",
                format::fixed(self.summary.average_score, 2)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::builtin(98.4)
    }

    fn request(countries: &[&str], metrics: Option<&[&str]>) -> ComparisonRequest {
        ComparisonRequest {
            countries: countries.iter().map(|c| c.to_string()).collect(),
            metrics: metrics.map(|m| m.iter().map(|s| s.to_string()).collect()),
        }
    }

    #[test]
    fn test_ranks_against_whole_catalog() {
        let cmp = compare(
            &catalog(),
            &request(&["prt", "ESP"], Some(&["life_expectancy", "doctor_density"])),
        )
        .unwrap();
        assert_eq!(cmp.ranked_against, 10);
        assert_eq!(cmp.countries, vec!["ESP", "PRT"]);

        let spain = &cmp.rankings[0];
        assert_eq!(spain.overall_rank, 1);
        assert_eq!(spain.metrics[0].rank, 1);
        assert_eq!(spain.metrics[0].percentile, 100.0);
        assert_eq!(spain.metrics[1].rank, 3);
        assert!((spain.total_score - (100.0 + 700.0 / 9.0) / 200.0).abs() < 1e-10);

        let portugal = &cmp.rankings[1];
        assert_eq!(portugal.overall_rank, 2);
        assert_eq!(portugal.metrics[0].rank, 5);
        assert_eq!(portugal.metrics[1].rank, 2);
        assert_eq!(portugal.metrics[1].unit, "per 1,000 population");

        assert_eq!(cmp.summary.best_performer.as_deref(), Some("Spain"));
        assert_eq!(cmp.summary.worst_performer.as_deref(), Some("Portugal"));
    }

    #[test]
    fn test_ties_share_rank() {
        let cmp = compare(&catalog(), &request(&["DEU", "GBR", "GRC", "USA"], Some(&["life_expectancy"])))
            .unwrap();
        for ranking in &cmp.rankings[..3] {
            assert_eq!(ranking.metrics[0].rank, 7);
            assert!((ranking.metrics[0].percentile - 100.0 / 3.0).abs() < 1e-10);
            assert_eq!(ranking.overall_rank, 1);
        }
        assert_eq!(cmp.rankings[3].country_code, "USA");
        assert_eq!(cmp.rankings[3].metrics[0].rank, 10);
        assert_eq!(cmp.rankings[3].metrics[0].percentile, 0.0);
        assert_eq!(cmp.rankings[3].overall_rank, 4);
    }

    #[test]
    fn test_empty_request_compares_all() {
        let cmp = compare(&catalog(), &ComparisonRequest::default()).unwrap();
        assert_eq!(cmp.rankings.len(), 10);
        assert_eq!(cmp.metrics.len(), 4);
        assert!(cmp.rankings.windows(2).all(|w| w[0].total_score >= w[1].total_score));
    }

    #[test]
    fn test_unknown_inputs_rejected() {
        assert!(matches!(
            compare(&catalog(), &request(&["XYZ"], None)),
            Err(PolicySimError::CountryNotFound(code)) if code == "XYZ"
        ));
        assert!(matches!(
            compare(&catalog(), &request(&[], Some(&["gdp"]))),
            Err(PolicySimError::UnknownMetric(_))
        ));
    }

    #[test]
    fn test_single_country_catalog() {
        let catalog = Catalog::from_records(
            &[crate::data::HealthRecord::new("PRT", 2022, 81.7, 5.6, 7.4, 6.5)],
            98.4,
        );
        let cmp = compare(&catalog, &ComparisonRequest::default()).unwrap();
        assert_eq!(cmp.rankings[0].total_score, 1.0);
    }

    #[test]
    fn test_display_table() {
        let cmp = compare(&catalog(), &request(&["ESP"], Some(&["health_spending"]))).unwrap();
        let text = cmp.to_string();
        assert!(text.starts_with("Health Benchmarks: 1 countries ranked against 10"));
        assert!(text.contains("1. Spain (ESP)"));
        assert!(text.contains("health_spending: 7.3 % of GDP (rank 7/10"));
    }
}
