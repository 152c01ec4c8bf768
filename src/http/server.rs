//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build every subsystem from `LensConfig` (the composition root)
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, request ID, timeout, body limit, CORS, metrics)
//! - Serve until shutdown, with the optional cache sweeper alongside

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::map_response_body::MapResponseBodyLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::cache::{CacheSweeper, ExpiringCache};
use crate::config::{ApiConfig, LensConfig};
use crate::http::handlers;
use crate::http::middleware::track_metrics;
use crate::http::request::{request_id, MakeRequestUuid};
use crate::lifecycle::{Shutdown, StartupError};
use crate::llm::{Analyzer, LlmClient};
use crate::report::AnalysisReport;
use crate::resilience::{RateLimiter, RetryPolicy};
use crate::scholar::{Paper, ScholarClient};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub scholar: Arc<ScholarClient>,
    pub analyzer: Arc<Analyzer>,
    /// Finished reports by topic.
    pub reports: ExpiringCache<AnalysisReport>,
    /// Papers behind the latest analysis of a topic, reused for proposals.
    pub papers: ExpiringCache<Vec<Paper>>,
    pub api: ApiConfig,
}

impl AppState {
    pub fn from_config(config: &LensConfig) -> Result<Self, StartupError> {
        let scholar_limiter = Arc::new(RateLimiter::new(Duration::from_millis(
            config.scholar.min_interval_ms,
        )));
        let llm_limiter = (config.llm.min_interval_ms > 0)
            .then(|| Arc::new(RateLimiter::new(Duration::from_millis(config.llm.min_interval_ms))));

        let scholar = ScholarClient::new(
            &config.scholar,
            &config.timeouts,
            RetryPolicy::from(&config.retries.scholar),
            scholar_limiter,
        )?;

        let llm = LlmClient::new(&config.llm, &config.timeouts, llm_limiter)?;
        let analyzer = Analyzer::new(llm, RetryPolicy::from(&config.retries.llm), &config.llm);

        let ttl = Duration::from_secs(config.cache.ttl_secs);

        Ok(Self {
            scholar: Arc::new(scholar),
            analyzer: Arc::new(analyzer),
            reports: ExpiringCache::new("reports", ttl),
            papers: ExpiringCache::new("papers", ttl),
            api: config.api.clone(),
        })
    }
}

/// HTTP server for the research API.
pub struct HttpServer {
    router: Router,
    state: AppState,
    config: LensConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: LensConfig) -> Result<Self, StartupError> {
        let state = AppState::from_config(&config)?;
        Ok(Self::with_state(config, state))
    }

    /// Create a server around prebuilt state.
    pub fn with_state(config: LensConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            state,
            config,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &LensConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/analyze", post(handlers::analyze))
            .route("/generate-proposal", post(handlers::generate_proposal))
            .route("/health", get(handlers::health))
            .route("/cache/clear", post(handlers::clear_cache))
            .route("/cache/sweep", post(handlers::sweep_cache))
            .route_layer(middleware::from_fn(track_metrics))
            .with_state(state);

        if config.api.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        // Outermost first: the request id must exist before the trace span
        // is created.
        let layers = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request),
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            // Re-box the limited body so the timeout layer gets a `Default` body type.
            .layer(MapResponseBodyLayer::new(Body::new))
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_size));

        router.layer(layers)
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if self.config.cache.sweep_interval_secs > 0 {
            let sweeper = CacheSweeper::new(Duration::from_secs(self.config.cache.sweep_interval_secs))
                .watch(self.state.reports.clone())
                .watch(self.state.papers.clone());
            tokio::spawn(sweeper.run(shutdown.subscribe()));
        }

        let mut server_shutdown = shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = server_shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}
