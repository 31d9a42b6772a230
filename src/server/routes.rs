//! API and page route handlers.
//!
//! API endpoints return JSON; errors carry `{"detail": "..."}`. State is
//! shared via `Arc<ServerState>`.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::export;
use crate::config::AppConfig;
use crate::data;
use crate::engine::benchmark::{self, BenchmarkCountry, Comparison, ComparisonRequest};
use crate::engine::narrative::{self, Narrative, NarrativeRequest};
use crate::engine::service::SimulationService;
use crate::storage;
use crate::types::{
    CountriesResponse, ExportFormat, ModelInfo, ModelMetrics, PolicySimError, SimulationRequest,
    SimulationResult,
};
use crate::ui::{self, CountrySelector, Page};

/// The embedded page shell (compiled into the binary).
const PAGE_HTML: &str = include_str!("templates/page.html");

/// Default and maximum page sizes for the history endpoint.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const MAX_HISTORY_LIMIT: usize = 500;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct ServerState {
    pub service: RwLock<SimulationService>,
    pub history: RwLock<Vec<SimulationResult>>,
    pub history_path: Option<String>,
    pub history_limit: usize,
    pub records_path: Option<String>,
    pub app_name: String,
}

impl ServerState {
    pub fn new(service: SimulationService, history: Vec<SimulationResult>, config: &AppConfig) -> Self {
        Self {
            service: RwLock::new(service),
            history: RwLock::new(history),
            history_path: config.simulation.history_path.clone(),
            history_limit: config.simulation.history_limit,
            records_path: config.data.records_path.clone(),
            app_name: config.app.name.clone(),
        }
    }
}

pub type AppState = Arc<ServerState>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

/// Error returned by API handlers.
#[derive(Debug)]
pub enum ApiError {
    Domain(PolicySimError),
    Internal(anyhow::Error),
}

impl From<PolicySimError> for ApiError {
    fn from(e: PolicySimError) -> Self {
        ApiError::Domain(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Domain(e) => match e {
                PolicySimError::CountryNotFound(_) | PolicySimError::SimulationNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                PolicySimError::InvalidParameter { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                PolicySimError::UnsupportedExport(_) | PolicySimError::UnknownMetric(_) => {
                    StatusCode::BAD_REQUEST
                }
                PolicySimError::ExportNotAvailable(_) => StatusCode::NOT_IMPLEMENTED,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            ApiError::Domain(e) => e.to_string(),
            ApiError::Internal(e) => format!("{e:#}"),
        };
        if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
            error!(status = status.as_u16(), detail = %detail, "Request failed");
        }
        (status, Json(ErrorBody { detail })).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub country: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrainResponse {
    pub status: String,
    pub model_metrics: ModelMetrics,
    pub countries_loaded: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub countries: usize,
    pub model_version: String,
}

// ---------------------------------------------------------------------------
// API handlers
// ---------------------------------------------------------------------------

/// GET /api/simulations/countries
pub async fn get_countries(State(state): State<AppState>) -> Json<CountriesResponse> {
    let service = state.service.read().await;
    Json(CountriesResponse {
        countries: service.catalog().countries().to_vec(),
    })
}

/// POST /api/simulations/run
pub async fn run_simulation(
    State(state): State<AppState>,
    Json(request): Json<SimulationRequest>,
) -> Result<Json<SimulationResult>, ApiError> {
    let result = state.service.read().await.run(&request)?;
    info!(
        simulation_id = %result.simulation_id,
        country = %result.country,
        change = format!("{:+.2}", result.prediction.change),
        "Simulation served"
    );

    let snapshot = {
        let mut history = state.history.write().await;
        storage::push_bounded(&mut history, result.clone(), state.history_limit);
        state.history_path.as_ref().map(|_| history.clone())
    };
    if let (Some(path), Some(snapshot)) = (state.history_path.clone(), snapshot) {
        persist_history(snapshot, path).await;
    }

    Ok(Json(result))
}

/// Write a history snapshot off the async runtime. Failures are logged.
async fn persist_history(snapshot: Vec<SimulationResult>, path: String) {
    let target = path.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        storage::save_history(&snapshot, Some(target.as_str()))
    })
    .await;
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, path = %path, "Failed to persist simulation history"),
        Err(e) => warn!(error = %e, path = %path, "History persistence task failed"),
    }
}

/// GET /api/simulations/history
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<SimulationResult>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);
    let offset = query.offset.unwrap_or(0);
    let country = query.country.map(|c| c.trim().to_ascii_uppercase());

    let history = state.history.read().await;
    let page = history
        .iter()
        .rev()
        .filter(|r| country.as_deref().map_or(true, |c| r.country == c))
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();
    Json(page)
}

/// GET /api/simulations/model/info
pub async fn get_model_info(State(state): State<AppState>) -> Json<ModelInfo> {
    Json(state.service.read().await.model_info())
}

/// POST /api/simulations/model/retrain
pub async fn retrain_model(State(state): State<AppState>) -> Result<Json<RetrainResponse>, ApiError> {
    let records = data::records_or_builtin(state.records_path.as_deref())?;
    let mut service = state.service.write().await;
    let model_metrics = service.retrain(&records)?;
    let countries_loaded = service.catalog().len();
    info!(countries_loaded, r2 = model_metrics.r2_score, "Model retrained");

    Ok(Json(RetrainResponse {
        status: "success".to_string(),
        model_metrics,
        countries_loaded,
    }))
}

/// GET /api/simulations/:id/export/:format
pub async fn export_simulation(
    State(state): State<AppState>,
    Path((id, format)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let format: ExportFormat = format.parse()?;

    let history = state.history.read().await;
    let result = history
        .iter()
        .find(|r| r.simulation_id == id)
        .ok_or_else(|| PolicySimError::SimulationNotFound(id.clone()))?;

    match format {
        ExportFormat::Csv => {
            let disposition = format!("attachment; filename=\"simulation_{id}.csv\"");
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                export::to_csv(result),
            )
                .into_response())
        }
        other => Err(PolicySimError::ExportNotAvailable(other).into()),
    }
}

/// GET /api/benchmarks/countries
pub async fn get_benchmark_countries(State(state): State<AppState>) -> Json<Vec<BenchmarkCountry>> {
    Json(benchmark::countries(state.service.read().await.catalog()))
}

/// POST /api/benchmarks/compare
pub async fn compare_countries(
    State(state): State<AppState>,
    Json(request): Json<ComparisonRequest>,
) -> Result<Json<Comparison>, ApiError> {
    let comparison = benchmark::compare(state.service.read().await.catalog(), &request)?;
    Ok(Json(comparison))
}

/// POST /api/narratives/generate
pub async fn generate_narrative(
    State(state): State<AppState>,
    Json(request): Json<NarrativeRequest>,
) -> Result<Json<Narrative>, ApiError> {
    let history = state.history.read().await;
    let result = history
        .iter()
        .find(|r| r.simulation_id == request.simulation_id)
        .ok_or_else(|| PolicySimError::SimulationNotFound(request.simulation_id.clone()))?;
    let narrative = narrative::generate(result);
    info!(
        simulation_id = %narrative.simulation_id,
        words = narrative.word_count,
        "Narrative generated"
    );
    Ok(Json(narrative))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let service = state.service.read().await;
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            countries: service.catalog().len(),
            model_version: service.model_info().model_version,
        }),
    )
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// Fallback for every non-API path: resolve against the route table and
/// render the page shell.
pub async fn serve_page(State(state): State<AppState>, uri: Uri) -> (StatusCode, Html<String>) {
    let page = Page::resolve(uri.path());
    let body = match page {
        Page::Simulation => simulation_body(&state).await,
        Page::Benchmark => benchmark_body(&state).await,
        Page::Narrative => narrative_body(&state).await,
        Page::Home => home_body(),
        Page::About | Page::NotFound => String::new(),
    };
    let status = if page == Page::NotFound {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    (status, Html(render_shell(&state.app_name, page, &body)))
}

fn render_shell(app_name: &str, page: Page, body: &str) -> String {
    let title = escape_html(page.title());
    let app_name = escape_html(app_name);
    let nav = nav(page);
    let summary = escape_html(page.summary());
    fill_template(PAGE_HTML, |key| match key {
        "title" => Some(title.as_str()),
        "app_name" => Some(app_name.as_str()),
        "nav" => Some(nav.as_str()),
        "summary" => Some(summary.as_str()),
        "body" => Some(body),
        _ => None,
    })
}

/// Substitute `{{key}}` placeholders in one pass. Inserted values are
/// never rescanned; unknown keys are left as-is.
fn fill_template<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        match lookup(key) {
            Some(value) => out.push_str(value),
            None => {
                out.push_str("{{");
                out.push_str(key);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn nav(current: Page) -> String {
    ui::pages::ROUTES
        .iter()
        .map(|(path, page)| {
            let class = if *page == current { " class=\"active\"" } else { "" };
            format!("<a href=\"{path}\"{class}>{}</a>", escape_html(page.title()))
        })
        .collect::<Vec<_>>()
        .join("")
}

fn home_body() -> String {
    let links: String = ui::pages::ROUTES
        .iter()
        .filter(|(_, page)| *page != Page::Home)
        .map(|(path, page)| {
            format!(
                "<li><a href=\"{path}\">{}</a>: {}</li>",
                escape_html(page.title()),
                escape_html(page.summary())
            )
        })
        .collect();
    format!("<section><ul>{links}</ul></section>")
}

/// Selector seeded from the catalog plus the most recent result.
async fn simulation_body(state: &ServerState) -> String {
    let countries = state.service.read().await.catalog().countries().to_vec();
    let selector = CountrySelector::with_countries(countries);
    let history = state.history.read().await;
    let results = ui::present(history.last());

    format!(
        "<section><pre>{}</pre></section>\n    <section><pre>{}</pre></section>",
        escape_html(&selector.view().to_string()),
        escape_html(&results.to_string())
    )
}

/// Every catalog country ranked on all four indicators.
async fn benchmark_body(state: &ServerState) -> String {
    let service = state.service.read().await;
    match benchmark::compare(service.catalog(), &ComparisonRequest::default()) {
        Ok(comparison) => format!(
            "<section><pre>{}</pre></section>",
            escape_html(&comparison.to_string())
        ),
        Err(e) => {
            warn!(error = %e, "Benchmark page failed");
            "<section><p>Benchmarks are unavailable.</p></section>".to_string()
        }
    }
}

/// Narrative for the most recent result.
async fn narrative_body(state: &ServerState) -> String {
    let history = state.history.read().await;
    let text = match history.last() {
        Some(result) => narrative::generate(result).to_string(),
        None => "No simulation results yet. Run a simulation to generate a narrative.".to_string(),
    };
    format!("<section><pre>{}</pre></section>", escape_html(&text))
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
