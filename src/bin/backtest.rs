//! TPI backtest CLI
//!
//! Usage: backtest <signals.csv> [--field btc] [--long-threshold 0.1] [--short-threshold -0.1]
//!                 [--returns-file returns.json] [--no-long-only] [--json]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use tpi_backtest::backtest::run_backtest_with_source;
use tpi_backtest::config::AppConfig;
use tpi_backtest::provider::{HttpReturnsSource, JsonFileReturnsSource, ReturnsSource};
use tpi_backtest::{BacktestConfig, ReturnField, Result, SignalTable, SimulationConfig};

#[derive(Parser, Debug)]
#[command(name = "backtest", about = "Backtest a TPI signal CSV against daily returns")]
struct Args {
    /// CSV with `date` and `tpi` columns
    signals: PathBuf,

    /// Return series to trade
    #[arg(long, default_value = "btc")]
    field: ReturnField,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    long_threshold: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    short_threshold: f64,

    /// Read returns from a local JSON document instead of the remote endpoint
    #[arg(long)]
    returns_file: Option<PathBuf>,

    /// Dataset (sheet) name; defaults to TPI_DATASET
    #[arg(long)]
    dataset: Option<String>,

    #[arg(long)]
    no_long_only: bool,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

async fn run(args: Args) -> Result<()> {
    let app_config = AppConfig::from_env()?;
    let table = SignalTable::from_csv_path(&args.signals)?;

    let source: Box<dyn ReturnsSource> = match &args.returns_file {
        Some(path) => Box::new(JsonFileReturnsSource::new(path)),
        None => Box::new(HttpReturnsSource::new(
            app_config.data_url.clone(),
            app_config.http_timeout,
        )?),
    };

    let config = BacktestConfig {
        simulation: SimulationConfig {
            long_threshold: args.long_threshold,
            short_threshold: args.short_threshold,
            track_long_only: !args.no_long_only,
        },
        metrics: app_config.metrics,
    };
    let dataset = args.dataset.as_deref().unwrap_or(&app_config.dataset);

    let report =
        run_backtest_with_source(source.as_ref(), dataset, args.field, &table, &config).await?;

    if args.json {
        println!("{}", report.to_json_pretty()?);
    } else {
        println!("Backtest for {} ({} signals)\n", args.field, table.len());
        print!("{}", report.table);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "backtest failed");
            ExitCode::FAILURE
        }
    }
}
