//! CSV export of a simulation result.

use crate::types::SimulationResult;

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render `result` as a `section,metric,value` CSV document.
pub fn to_csv(result: &SimulationResult) -> String {
    let p = &result.prediction;
    let ci = &p.confidence_interval;
    let fc = &p.feature_contributions;
    let m = &result.model_metrics;

    let rows: Vec<(&str, &str, String)> = vec![
        ("simulation", "simulation_id", result.simulation_id.clone()),
        ("simulation", "country", result.country.clone()),
        ("simulation", "timestamp", result.timestamp.clone()),
        ("baseline", "life_expectancy", result.baseline.life_expectancy.to_string()),
        ("baseline", "doctor_density", result.baseline.doctor_density.to_string()),
        ("baseline", "nurse_density", result.baseline.nurse_density.to_string()),
        ("baseline", "health_spending", result.baseline.health_spending.to_string()),
        ("baseline", "year", result.baseline.year.to_string()),
        ("parameters", "doctor_density", result.parameters.doctor_density.to_string()),
        ("parameters", "nurse_density", result.parameters.nurse_density.to_string()),
        ("parameters", "health_spending", result.parameters.health_spending.to_string()),
        ("prediction", "life_expectancy", p.life_expectancy.to_string()),
        ("prediction", "change", p.change.to_string()),
        ("prediction", "change_percentage", p.change_percentage.to_string()),
        ("confidence_interval", "lower", ci.lower.to_string()),
        ("confidence_interval", "upper", ci.upper.to_string()),
        ("confidence_interval", "margin_of_error", ci.margin_of_error.to_string()),
        ("feature_contributions", "doctor_density", fc.doctor_density.to_string()),
        ("feature_contributions", "nurse_density", fc.nurse_density.to_string()),
        ("feature_contributions", "health_spending", fc.health_spending.to_string()),
        ("feature_contributions", "intercept", fc.intercept.to_string()),
        ("model_metrics", "r2_score", m.r2_score.to_string()),
        ("model_metrics", "mse", m.mse.to_string()),
        ("model_metrics", "rmse", m.rmse.to_string()),
        ("model_metrics", "training_samples", m.training_samples.to_string()),
        ("model_metrics", "test_samples", m.test_samples.to_string()),
        ("metadata", "model_version", result.metadata.model_version.clone()),
        ("metadata", "execution_time", result.metadata.execution_time.to_string()),
        ("metadata", "data_quality", result.metadata.data_quality.to_string()),
    ];

    let mut out = String::from("section,metric,value\n");
    for (section, metric, value) in rows {
        out.push_str(&format!("{section},{metric},{}\n", escape(&value)));
    }
    out
}
