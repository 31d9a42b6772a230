//! Configuration loading from TOML with environment variable overrides.
//!
//! Reads `config.toml` (or the file named by `POLICYSIM_CONFIG`) and
//! deserializes into strongly-typed structs. Every section has defaults,
//! so a partial file is valid.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::str::FromStr;

use crate::types::PolicySimError;

/// Env var naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "POLICYSIM_CONFIG";
/// Env var overriding `server.port`.
pub const PORT_ENV: &str = "POLICYSIM_PORT";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
    pub environment: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: "Policy Simulation Assistant".to_string(),
            environment: "development".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
        }
    }
}

/// Which prediction model backs the simulation service.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    #[default]
    Coefficient,
    Regression,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::Coefficient => write!(f, "coefficient"),
            ModelKind::Regression => write!(f, "regression"),
        }
    }
}

impl FromStr for ModelKind {
    type Err = PolicySimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "coefficient" => Ok(ModelKind::Coefficient),
            "regression" => Ok(ModelKind::Regression),
            other => Err(PolicySimError::Config(format!("unknown model kind: {other}"))),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulationConfig {
    #[serde(default)]
    pub model: ModelKind,
    pub data_quality: f64,
    /// Where run history is persisted. `None` keeps history in memory only.
    #[serde(default)]
    pub history_path: Option<String>,
    pub history_limit: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::Coefficient,
            data_quality: 98.4,
            history_path: None,
            history_limit: 500,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DataConfig {
    /// JSON file of health records. The built-in dataset is used when unset.
    #[serde(default)]
    pub records_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            timeout_secs: 15,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `POLICYSIM_CONFIG` (default `config.toml`), then apply
    /// env overrides. A missing default file yields the built-in defaults.
    pub fn load_from_env() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(&path)?,
            Err(_) if std::path::Path::new("config.toml").exists() => Self::load("config.toml")?,
            Err(_) => Self::default(),
        };

        if let Ok(port) = std::env::var(PORT_ENV) {
            config.server.port = port
                .parse()
                .with_context(|| format!("{PORT_ENV} is not a valid port: {port}"))?;
        }
        Ok(config)
    }

    fn validate(&self) -> Result<(), PolicySimError> {
        if !(0.0..=100.0).contains(&self.simulation.data_quality) {
            return Err(PolicySimError::Config(format!(
                "simulation.data_quality must be within 0-100, got {}",
                self.simulation.data_quality
            )));
        }
        if self.simulation.history_limit == 0 {
            return Err(PolicySimError::Config(
                "simulation.history_limit must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
