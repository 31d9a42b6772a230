//! Plain-language policy narratives for simulation results.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{ParameterField, SimulationResult};
use crate::ui::format;

/// Changes smaller than this are treated as "unchanged".
const CHANGE_EPSILON: f64 = 1e-9;

const DISCLAIMERS: &[&str] = &[
    "This analysis is based on statistical models and historical data correlations",
    "Results should be interpreted as directional indicators, not precise predictions",
    "Actual outcomes may vary due to factors not included in this model",
];

/// `POST /api/narratives/generate` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeRequest {
    pub simulation_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub narrative_id: String,
    pub simulation_id: String,
    pub country: String,
    pub narrative: String,
    pub disclaimers: Vec<String>,
    pub word_count: usize,
    pub generated_at: String,
}

impl fmt::Display for Narrative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.narrative)?;
        writeln!(f)?;
        write!(f, "Notes:")?;
        for d in &self.disclaimers {
            write!(f, "\n- {d}")?;
        }
        Ok(())
    }
}

fn direction(change: f64) -> &'static str {
    if change > CHANGE_EPSILON {
        "positive"
    } else if change < -CHANGE_EPSILON {
        "negative"
    } else {
        "neutral"
    }
}

fn lever_line(field: ParameterField, delta: f64) -> String {
    let unit = if field.is_percentage() {
        "% of GDP"
    } else {
        " per 1,000 population"
    };
    format!("- {} change: {}{unit}", field.label(), format::signed(delta, 1))
}

/// Policy-insight narrative for one result.
pub fn generate(result: &SimulationResult) -> Narrative {
    let p = &result.prediction;
    let mut text = format!(
        "Based on the simulation analysis for {}, the proposed policy changes are \
         predicted to have a {} impact on life expectancy.\n\n\
         Current Status:\n\
         - Current life expectancy: {}\n\
         - Predicted change: {}\n\
         - Projected life expectancy: {}\n\n\
         Policy Implications:\n",
        result.country,
        direction(p.change),
        format::years(result.baseline.life_expectancy, 1),
        format::signed_years(p.change, 1),
        format::years(p.life_expectancy, 1),
    );

    let levers: Vec<String> = ParameterField::ALL
        .iter()
        .filter_map(|&field| {
            let delta = result.parameters.get(field) - result.baseline.value(field);
            (delta.abs() > CHANGE_EPSILON).then(|| lever_line(field, delta))
        })
        .collect();
    if levers.is_empty() {
        text.push_str("- No changes from the current baseline\n");
    } else {
        text.push_str(&levers.join("\n"));
        text.push('\n');
    }

    text.push_str(&format!(
        "\nRecommendations:\n\
         - Monitor implementation of proposed changes\n\
         - Track health outcomes over time\n\
         - Validate results with local health data\n\n\
         Confidence: 95% interval {} to {}.",
        format::years(p.confidence_interval.lower, 1),
        format::years(p.confidence_interval.upper, 1),
    ));

    Narrative {
        narrative_id: Uuid::new_v4().to_string(),
        simulation_id: result.simulation_id.clone(),
        country: result.country.clone(),
        word_count: text.split_whitespace().count(),
        narrative: text,
        disclaimers: DISCLAIMERS.iter().map(|d| d.to_string()).collect(),
        generated_at: Utc::now().to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_insight_text() {
        let n = generate(&SimulationResult::sample());
        assert_eq!(n.simulation_id, "sim-001");
        assert_eq!(n.country, "PRT");
        assert!(n.narrative.starts_with(
            "Based on the simulation analysis for PRT, the proposed policy changes are predicted to have a positive impact"
        ));
        assert!(n.narrative.contains("- Current life expectancy: 81.2 years"));
        assert!(n.narrative.contains("- Predicted change: +0.9 years"));
        assert!(n.narrative.contains("- Projected life expectancy: 82.1 years"));
        assert!(n.narrative.contains("- Doctor Density change: +0.5 per 1,000 population"));
        assert!(n.narrative.contains("- Nurse Density change: +0.7 per 1,000 population"));
        assert!(n.narrative.contains("- Health Spending change: +0.8% of GDP"));
        assert!(n.narrative.contains("95% interval 81.4 years to 82.8 years."));
        assert_eq!(n.word_count, n.narrative.split_whitespace().count());
    }

    #[test]
    fn test_unchanged_levers() {
        let mut result = SimulationResult::sample();
        result.parameters = crate::types::ParameterSet::from_baseline(&result.baseline);
        result.prediction.change = 0.0;
        let n = generate(&result);
        assert!(n.narrative.contains("have a neutral impact"));
        assert!(n.narrative.contains("- No changes from the current baseline"));
        assert!(!n.narrative.contains("Doctor Density change"));
    }

    #[test]
    fn test_negative_direction_and_display() {
        let mut result = SimulationResult::sample();
        result.prediction.change = -0.4;
        result.parameters.health_spending = 5.2;
        let n = generate(&result);
        assert!(n.narrative.contains("have a negative impact"));
        assert!(n.narrative.contains("- Health Spending change: -1.0% of GDP"));
        let text = n.to_string();
        assert!(text.contains("Notes:\n- This analysis is based on"));
    }
}
