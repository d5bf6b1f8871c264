//! TPI backtest server
//!
//! Serves the backtest API over HTTP. Configuration comes from `TPI_*` environment
//! variables (or a `.env` file).
//!
//! Run: RUST_LOG=info cargo run --release --bin backtest_server

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tpi_backtest::config::AppConfig;
use tpi_backtest::server::{router, AppState};
use tpi_backtest::Result;

async fn serve() -> Result<()> {
    let config = AppConfig::from_env()?;
    let state = Arc::new(AppState::from_config(&config)?);
    let app = router(state);

    info!(addr = %config.bind_addr, dataset = %config.dataset, "TPI backtest server listening");
    info!("  GET  /api/fields    - backtestable return series");
    info!("  GET  /api/metrics   - metric labels and explanations");
    info!("  POST /api/backtest  - run a backtest on an uploaded signal CSV");
    info!("  POST /api/requests  - forward an indicator request link");

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match serve().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server stopped");
            ExitCode::FAILURE
        }
    }
}
