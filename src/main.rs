//! POLICYSIM: Policy Simulation Assistant
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the simulation service from health records, restores run
//! history from disk, and serves the API and pages until Ctrl+C.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use policysim::config::AppConfig;
use policysim::data;
use policysim::engine::service::SimulationService;
use policysim::server::{self, ServerState};
use policysim::storage;

const BANNER: &str = r#"
 ____       _ _            ____  _
|  _ \ ___ | (_) ___ _   _/ ___|(_)_ __ ___
| |_) / _ \| | |/ __| | | \___ \| | '_ ` _ \
|  __/ (_) | | | (__| |_| |___) | | | | | | |
|_|   \___/|_|_|\___|\__, |____/|_|_| |_| |_|
                     |___/
  Policy Simulation Assistant
"#;

/// Env var switching log output to JSON.
const LOG_JSON_ENV: &str = "POLICYSIM_LOG_JSON";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load_from_env()?;

    init_logging();

    println!("{BANNER}");
    info!(
        app_name = %cfg.app.name,
        environment = %cfg.app.environment,
        model = %cfg.simulation.model,
        port = cfg.server.port,
        "POLICYSIM starting up"
    );

    // -- Build the simulation service ------------------------------------

    let records = data::records_or_builtin(cfg.data.records_path.as_deref())?;
    let service = SimulationService::from_records(
        &records,
        cfg.simulation.model,
        cfg.simulation.data_quality,
    )
    .context("Failed to initialise simulation service")?;

    // -- Restore history -------------------------------------------------

    let mut history = match cfg.simulation.history_path.as_deref() {
        Some(path) => storage::load_history(Some(path))?,
        None => Vec::new(),
    };
    storage::trim_to_limit(&mut history, cfg.simulation.history_limit);
    info!(entries = history.len(), "History restored");

    // -- Serve -----------------------------------------------------------

    let state = Arc::new(ServerState::new(service, history, &cfg));
    server::serve(state, &cfg.server).await?;

    info!("POLICYSIM shut down cleanly");
    Ok(())
}

/// Initialise the tracing subscriber.
///
/// Uses `RUST_LOG` when set, otherwise `policysim=info`. Setting
/// `POLICYSIM_LOG_JSON` switches to JSON lines.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("policysim=info"));

    if std::env::var(LOG_JSON_ENV).is_ok() {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
