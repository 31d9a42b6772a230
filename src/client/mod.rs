//! Simulation API clients.
//!
//! Defines the seams the presentation layer talks through:
//! - `CountrySource`: where the selector gets its country list
//! - `SimulationRunner`: what the page calls when the user clicks "Run"
//!
//! `ApiClient` implements both over HTTP; the in-process
//! `SimulationService` and `Catalog` implement them locally.

pub mod http;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{Country, SimulationRequest, SimulationResult};

pub use http::ApiClient;

/// Provider of the country list shown by the selector.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CountrySource: Send + Sync {
    /// Fetch all countries available for simulation.
    async fn fetch_countries(&self) -> Result<Vec<Country>>;
}

/// Backend that executes a simulation request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SimulationRunner: Send + Sync {
    async fn run_simulation(&self, request: &SimulationRequest) -> Result<SimulationResult>;
}
