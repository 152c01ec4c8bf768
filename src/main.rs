//! research-lens server
//!
//! Takes a research topic, finds recent papers, measures the citation trend
//! and asks a language model for gaps, questions and methods.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ http (router, middleware) ──▶ handlers
//!                                                 │
//!                    ┌────────────────────────────┼──────────────────────┐
//!                    ▼                            ▼                      ▼
//!             cache (reports,            scholar client            llm analyzer
//!             papers; 24h TTL)         (rate limiter + retry)      (retry)
//!                                                 │                      │
//!                                                 ▼                      ▼
//!                                         paper search API      generation API
//!
//!     Cross-cutting: config, observability (tracing, metrics), lifecycle
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use research_lens::config::load_config;
use research_lens::lifecycle::signals::wait_for_signal;
use research_lens::observability::{logging, metrics};
use research_lens::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "research-lens", version, about = "Research topic analysis service")]
struct Args {
    /// Path to a TOML config file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // A missing .env is normal outside development.
    let dotenv = dotenvy::dotenv();

    let config = load_config(args.config.as_deref())?;
    logging::init_logging(&config.observability);

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env"),
        Err(e) => tracing::debug!(error = %e, "No .env loaded"),
    }
    tracing::info!("research-lens v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        cache_ttl_secs = config.cache.ttl_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.trigger();
    });

    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
