//! CLI entry point for the Va y Ven transit service.
//!
//! `serve` runs the HTTP/WebSocket API; `analyze` and `stats` run the same
//! analyses once against the data directory and print JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use vayven::analyzers::{analyze_coverage, stats::system_stats};
use vayven::config::{DEFAULT_BIND, DEFAULT_SEND_TIMEOUT_MS, DataPaths, ServiceConfig};
use vayven::output::print_json;
use vayven::server::{self, AppContext};
use vayven::store::StaticDataStore;

#[derive(Parser)]
#[command(name = "vayven")]
#[command(about = "Transit API for the Va y Ven system", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API and the route-status WebSocket
    Serve {
        /// Directory holding aforo.geojson, paradas.geojson and gtfs/
        #[arg(short, long, env = "VAYVEN_DATA_DIR", default_value = "data")]
        data_dir: PathBuf,

        /// Address to listen on
        #[arg(short, long, env = "VAYVEN_BIND", default_value = DEFAULT_BIND)]
        bind: SocketAddr,

        /// Per-connection timeout for broadcast delivery, in milliseconds
        #[arg(
            long,
            env = "VAYVEN_SEND_TIMEOUT_MS",
            default_value_t = DEFAULT_SEND_TIMEOUT_MS
        )]
        send_timeout_ms: u64,
    },
    /// Print the coverage analysis for one AGEB
    Analyze {
        /// AGEB key (CVE_AGEB)
        #[arg(value_name = "AGEB")]
        ageb: String,

        #[arg(short, long, env = "VAYVEN_DATA_DIR", default_value = "data")]
        data_dir: PathBuf,
    },
    /// Print system-wide statistics
    Stats {
        #[arg(short, long, env = "VAYVEN_DATA_DIR", default_value = "data")]
        data_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/vayven.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("vayven.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            data_dir,
            bind,
            send_timeout_ms,
        } => {
            let config = ServiceConfig::new(bind, data_dir, send_timeout_ms);
            run_server(config).await?;
        }
        Commands::Analyze { ageb, data_dir } => {
            let store = load_store(&DataPaths::from_dir(data_dir))?;
            let analysis = analyze_coverage(store.ridership()?, &ageb)?;
            print_json(&analysis)?;
        }
        Commands::Stats { data_dir } => {
            let store = load_store(&DataPaths::from_dir(data_dir))?;
            print_json(&system_stats(&store))?;
        }
    }

    Ok(())
}

fn load_store(paths: &DataPaths) -> Result<StaticDataStore> {
    StaticDataStore::load(paths)
        .with_context(|| format!("Failed to load data from {}", paths.root.display()))
}

/// Loads the data directory, binds and serves until Ctrl+C.
#[tracing::instrument(skip_all, fields(bind = %config.bind))]
async fn run_server(config: ServiceConfig) -> Result<()> {
    let store = load_store(&config.data)?;
    info!(
        routes = store.routes().len(),
        send_timeout_ms = config.send_timeout.as_millis() as u64,
        "Data loaded"
    );

    let ctx = AppContext::new(store, config.send_timeout);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    server::serve(listener, ctx, shutdown_signal()).await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C"),
    }
}
