//! Cloud Texture API Server
//!
//! Serves GFS cloud cover as run-length encoded JSON.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use cloud_api::build_router;
use cloud_api::config::ServiceConfig;
use cloud_api::state::AppState;

/// Cloud Texture API Server
#[derive(Parser, Debug)]
#[command(name = "cloud-api")]
#[command(about = "Run-length encoded GFS cloud cover over HTTP")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8080", env = "CLOUD_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "CLOUD_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config/cloud.yaml", env = "CLOUD_CONFIG")]
    config: PathBuf,

    /// Override the upstream filter URL from the config file
    #[arg(long, env = "CLOUD_UPSTREAM_URL")]
    upstream_url: Option<String>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!("Prometheus metrics exporter initialized");
    info!("Starting cloud texture server");

    let mut config = ServiceConfig::load(&args.config)?;
    if let Some(url) = args.upstream_url {
        config.upstream.base_url = url;
        config.validate()?;
    }

    info!(
        upstream = %config.upstream.base_url,
        boundary = ?config.encoding.grid_boundary,
        shape = ?config.encoding.default_shape,
        "Loaded configuration"
    );

    let state = AppState::from_config(config)
        .context("Failed to initialize application state")?
        .with_prometheus(prometheus_handle);

    let app = build_router(Arc::new(state));

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    info!("Cloud texture API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
