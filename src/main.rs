//! proxy-mux node
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ listener ──▶ tower-http layers ──▶ ProxyMux
//!                                  (request id, trace,      │
//!                                   timeout)                ▼
//!                                               exact target in route table?
//!                                                 yes │            │ no
//!                                                     ▼            ▼
//!                                               route handler   fallback
//!                                                               (redirect to
//!                                                                upstream tier)
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use proxy_mux::lifecycle::startup;
use proxy_mux::observability::{logging, metrics};
use proxy_mux::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "proxy-mux")]
#[command(about = "Cluster-aware HTTP request multiplexer", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration and run the startup self-check, then exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = startup::load(cli.config.as_deref())?;
    logging::init(&config.observability)?;

    match cli.config.as_deref() {
        Some(path) => tracing::info!(path = %path.display(), "Configuration loaded"),
        None => tracing::info!("No configuration file given, using defaults"),
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        cluster_enabled = config.cluster.enabled(),
        role = %config.cluster.role(),
        load_policy = %config.cluster.load_policy(),
        "proxy-mux starting"
    );

    let mux = startup::prepare(&config)?;

    if cli.check {
        tracing::info!(routes = ?mux.routes(), "Configuration OK");
        return Ok(());
    }

    if config.observability.metrics_enabled {
        // Validated by the loader.
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, mux);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
