//! Results presenter.
//!
//! Stateless: renders a `SimulationResult` (or the empty state when there
//! is none) into a `ResultsView`. Export buttons only forward a format tag
//! to the caller's handler; generating the file is someone else's job.

use std::fmt;

use super::format;
use crate::types::{ExportFormat, ParameterField, SimulationResult};

pub const EMPTY_STATE: &str =
    "No simulation results yet. Select a country, adjust the parameters, and run a simulation to see predictions.";

/// Rendered results panel.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    Empty { message: String },
    Populated(Box<ResultsPanel>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsPanel {
    pub country: String,
    /// One decimal.
    pub baseline_life_expectancy: String,
    /// One decimal.
    pub predicted_life_expectancy: String,
    /// `"+0.90 years"`.
    pub change: String,
    /// `"+1.10%"`.
    pub change_percentage: String,
    /// `"81.4 - 82.8 years"`.
    pub confidence_range: String,
    /// `"(±0.7 years)"`.
    pub confidence_margin: String,
    pub parameter_changes: Vec<LabeledValue>,
    pub contributions: Vec<LabeledValue>,
    pub metrics: MetricsSection,
    pub exports: Vec<ExportButton>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledValue {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSection {
    /// Three decimals.
    pub r2_score: String,
    pub rmse: String,
    pub training_samples: String,
    /// `"0.10s"`.
    pub execution_time: String,
    /// `"98.4/100"`.
    pub data_quality: String,
    pub model_version: String,
    /// `"Model Confidence: 78.0%"`.
    pub model_confidence: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportButton {
    pub format: ExportFormat,
    pub label: &'static str,
}

impl ExportButton {
    pub const ALL: [ExportButton; 3] = [
        ExportButton {
            format: ExportFormat::Pdf,
            label: "Export PDF",
        },
        ExportButton {
            format: ExportFormat::Csv,
            label: "Export CSV",
        },
        ExportButton {
            format: ExportFormat::Image,
            label: "Export Image",
        },
    ];

    /// Click: invoke the handler with this button's tag and nothing else.
    pub fn click<F: FnOnce(ExportFormat)>(&self, on_export: F) {
        on_export(self.format);
    }
}

/// Render `results`.
pub fn present(results: Option<&SimulationResult>) -> ResultsView {
    let Some(r) = results else {
        return ResultsView::Empty {
            message: EMPTY_STATE.to_string(),
        };
    };
    let p = &r.prediction;
    let ci = &p.confidence_interval;

    let parameter_changes = ParameterField::ALL
        .iter()
        .map(|&field| {
            let before = format::plain(r.baseline.value(field));
            let after = format::plain(r.parameters.get(field));
            let value = if field.is_percentage() {
                format!("{before}% → {after}%")
            } else {
                format!("{before} → {after}")
            };
            LabeledValue {
                label: field.label().to_string(),
                value,
            }
        })
        .collect();

    let mut contributions: Vec<LabeledValue> = ParameterField::ALL
        .iter()
        .map(|&field| LabeledValue {
            label: field.label().to_string(),
            value: format::signed_years(p.feature_contributions.get(field), 3),
        })
        .collect();
    contributions.push(LabeledValue {
        label: "Intercept".to_string(),
        value: format::years(p.feature_contributions.intercept, 3),
    });

    let m = &r.model_metrics;
    ResultsView::Populated(Box::new(ResultsPanel {
        country: r.country.clone(),
        baseline_life_expectancy: format::fixed(r.baseline.life_expectancy, 1),
        predicted_life_expectancy: format::fixed(p.life_expectancy, 1),
        change: format::signed_years(p.change, 2),
        change_percentage: format!("{}%", format::signed(p.change_percentage, 2)),
        confidence_range: format!(
            "{} - {} years",
            format::fixed(ci.lower, 1),
            format::fixed(ci.upper, 1)
        ),
        confidence_margin: format!("(±{} years)", format::fixed(ci.margin_of_error, 1)),
        parameter_changes,
        contributions,
        metrics: MetricsSection {
            r2_score: format::fixed(m.r2_score, 3),
            rmse: format::fixed(m.rmse, 3),
            training_samples: m.training_samples.to_string(),
            execution_time: format!("{}s", format::fixed(r.metadata.execution_time, 2)),
            data_quality: format!("{}/100", format::plain(r.metadata.data_quality)),
            model_version: r.metadata.model_version.clone(),
            model_confidence: format!(
                "Model Confidence: {}%",
                format::fixed(m.r2_score * 100.0, 1)
            ),
        },
        exports: ExportButton::ALL.to_vec(),
    }))
}

impl ResultsView {
    pub fn is_empty(&self) -> bool {
        matches!(self, ResultsView::Empty { .. })
    }

    /// Export buttons; none in the empty state.
    pub fn exports(&self) -> &[ExportButton] {
        match self {
            ResultsView::Empty { .. } => &[],
            ResultsView::Populated(panel) => panel.exports.as_slice(),
        }
    }
}

impl fmt::Display for ResultsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let panel = match self {
            ResultsView::Empty { message } => return write!(f, "{message}"),
            ResultsView::Populated(panel) => panel,
        };

        writeln!(f, "Simulation Results: {}", panel.country)?;
        writeln!(f, "Baseline Life Expectancy: {}", panel.baseline_life_expectancy)?;
        writeln!(f, "Predicted Life Expectancy: {}", panel.predicted_life_expectancy)?;
        writeln!(f, "Change: {} ({})", panel.change, panel.change_percentage)?;
        writeln!(
            f,
            "95% Confidence Interval: {} {}",
            panel.confidence_range, panel.confidence_margin
        )?;

        writeln!(f, "Parameter Changes")?;
        for row in &panel.parameter_changes {
            writeln!(f, "  {}: {}", row.label, row.value)?;
        }
        writeln!(f, "Feature Contributions")?;
        for row in &panel.contributions {
            writeln!(f, "  {}: {}", row.label, row.value)?;
        }

        let m = &panel.metrics;
        writeln!(f, "Model Metrics")?;
        writeln!(f, "  R² Score: {}", m.r2_score)?;
        writeln!(f, "  RMSE: {}", m.rmse)?;
        writeln!(f, "  Training Samples: {}", m.training_samples)?;
        writeln!(f, "  Execution Time: {}", m.execution_time)?;
        writeln!(f, "  Data Quality: {}", m.data_quality)?;
        writeln!(f, "  Model Version: {}", m.model_version)?;
        writeln!(f, "{}", m.model_confidence)?;

        let buttons: Vec<String> = panel.exports.iter().map(|b| format!("[{}]", b.label)).collect();
        write!(f, "{}", buttons.join(" "))
    }
}
