//! HTTP client for the simulation API.
//!
//! Base URL defaults to `http://localhost:8000`.
//! Endpoints:
//! - `GET  /api/simulations/countries`
//! - `POST /api/simulations/run`
//! - `GET  /api/simulations/history`
//! - `GET  /api/simulations/model/info`
//! - `POST /api/benchmarks/compare`
//! - `POST /api/narratives/generate`

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{CountrySource, SimulationRunner};
use crate::config::ClientConfig;
use crate::engine::benchmark::{Comparison, ComparisonRequest};
use crate::engine::narrative::{Narrative, NarrativeRequest};
use crate::types::{
    CountriesResponse, Country, ModelInfo, PolicySimError, SimulationRequest, SimulationResult,
};

/// Error body returned by the API (`{"detail": "..."}`).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Simulation API client.
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("policysim/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client for simulation API")?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Map non-2xx responses to `PolicySimError::Api` and decode the body.
    async fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.detail)
                .unwrap_or(body);
            return Err(PolicySimError::Api {
                status: status.as_u16(),
                message,
            }
            .into());
        }
        resp.json()
            .await
            .with_context(|| format!("Failed to parse {what} response"))
    }

    /// `GET /api/simulations/countries`
    pub async fn countries(&self) -> Result<Vec<Country>> {
        let url = self.url("/api/simulations/countries");
        debug!(url = %url, "Fetching countries");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("Countries request failed")?;
        let body: CountriesResponse = Self::decode(resp, "countries").await?;
        Ok(body.countries)
    }

    /// `POST /api/simulations/run`
    pub async fn run(&self, request: &SimulationRequest) -> Result<SimulationResult> {
        let url = self.url("/api/simulations/run");
        debug!(url = %url, country = %request.country, "Running simulation");

        let resp = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .context("Simulation request failed")?;
        Self::decode(resp, "simulation").await
    }

    /// `GET /api/simulations/history`
    pub async fn history(
        &self,
        country: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SimulationResult>> {
        let mut url = self.url(&format!(
            "/api/simulations/history?limit={limit}&offset={offset}"
        ));
        if let Some(code) = country {
            url.push_str(&format!("&country={}", urlencoding::encode(code)));
        }
        debug!(url = %url, "Fetching simulation history");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("History request failed")?;
        Self::decode(resp, "history").await
    }

    /// `GET /api/simulations/model/info`
    pub async fn model_info(&self) -> Result<ModelInfo> {
        let resp = self
            .http
            .get(self.url("/api/simulations/model/info"))
            .send()
            .await
            .context("Model info request failed")?;
        Self::decode(resp, "model info").await
    }

    /// `POST /api/benchmarks/compare`
    pub async fn compare(&self, request: &ComparisonRequest) -> Result<Comparison> {
        let resp = self
            .http
            .post(self.url("/api/benchmarks/compare"))
            .json(request)
            .send()
            .await
            .context("Benchmark request failed")?;
        Self::decode(resp, "benchmark").await
    }

    /// `POST /api/narratives/generate`
    pub async fn narrative(&self, simulation_id: &str) -> Result<Narrative> {
        let request = NarrativeRequest {
            simulation_id: simulation_id.to_string(),
        };
        let resp = self
            .http
            .post(self.url("/api/narratives/generate"))
            .json(&request)
            .send()
            .await
            .context("Narrative request failed")?;
        Self::decode(resp, "narrative").await
    }
}

#[async_trait]
impl CountrySource for ApiClient {
    async fn fetch_countries(&self) -> Result<Vec<Country>> {
        self.countries().await
    }
}

#[async_trait]
impl SimulationRunner for ApiClient {
    async fn run_simulation(&self, request: &SimulationRequest) -> Result<SimulationResult> {
        self.run(request).await
    }
}
