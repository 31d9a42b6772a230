//! Persistence layer.
//!
//! Saves and loads simulation history to/from a JSON file.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

use crate::types::SimulationResult;

/// Default history file path.
pub const DEFAULT_HISTORY_FILE: &str = "simulation_history.json";

/// Save simulation history to a JSON file.
pub fn save_history(history: &[SimulationResult], path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_HISTORY_FILE);
    let json = serde_json::to_string_pretty(history)
        .context("Failed to serialise simulation history")?;

    std::fs::write(path, &json)
        .with_context(|| format!("Failed to write history to {path}"))?;

    debug!(path, entries = history.len(), "History saved");
    Ok(())
}

/// Load simulation history from a JSON file.
/// Returns an empty history if the file doesn't exist.
pub fn load_history(path: Option<&str>) -> Result<Vec<SimulationResult>> {
    let path = path.unwrap_or(DEFAULT_HISTORY_FILE);

    if !Path::new(path).exists() {
        info!(path, "No saved history found, starting fresh");
        return Ok(Vec::new());
    }

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history from {path}"))?;

    let history: Vec<SimulationResult> = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse history from {path}"))?;

    info!(path, entries = history.len(), "History loaded from disk");
    Ok(history)
}

/// Delete the history file.
pub fn delete_history(path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_HISTORY_FILE);
    if Path::new(path).exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to delete history file {path}"))?;
    }
    Ok(())
}

/// Drop the oldest entries beyond `limit`.
pub fn trim_to_limit(history: &mut Vec<SimulationResult>, limit: usize) {
    if history.len() > limit {
        let excess = history.len() - limit;
        history.drain(..excess);
    }
}

/// Append `result`, dropping the oldest entries beyond `limit`.
pub fn push_bounded(history: &mut Vec<SimulationResult>, result: SimulationResult, limit: usize) {
    history.push(result);
    trim_to_limit(history, limit);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
