//! # VC Data Fetcher Server
//!
//! HTTP front-end of the contributor and commit aggregation pipeline.
//!
//! Users register the access token obtained from the OAuth exchange, then
//! validate repositories and fetch contributor data either synchronously or as
//! a background analysis job that reports back through a callback URL.

use axum::{
    routing::{get, post},
    Router,
};
use std::{env, sync::Arc};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{debug, error, info};
use vc_data_fetcher_core::{tokens::InMemoryTokenStore, ContributionAnalyzer};
use vc_data_fetcher_developer_platforms::github::{create_http_client, GitHubProvider};

mod config;
use config::ServerConfig;

mod errors;
use errors::ServerError;

mod handlers;

mod jobs;

mod telemetry;

/// Base path of all API routes
pub const API_BASE_PATH: &str = "/api/v1.0.0";

/// The analyzer type used by the service
pub type Analyzer = ContributionAnalyzer<GitHubProvider, Arc<InMemoryTokenStore>>;

/// State shared by all request handlers.
pub struct AppState {
    pub analyzer: Analyzer,
    pub tokens: Arc<InMemoryTokenStore>,
    pub callback_client: reqwest::Client,
    /// Root token of the process. Every run uses a child of it.
    pub shutdown: CancellationToken,
    pub jobs: TaskTracker,
}

impl AppState {
    /// Builds the state from the service configuration.
    pub fn new(config: &ServerConfig, shutdown: CancellationToken) -> Result<Self, ServerError> {
        let provider = GitHubProvider::from_config(config.github.clone())?;
        let callback_client = create_http_client(&config.github)?;
        let tokens = Arc::new(InMemoryTokenStore::new());
        let analyzer =
            ContributionAnalyzer::with_config(provider, tokens.clone(), config.analysis.clone());

        Ok(Self {
            analyzer,
            tokens,
            callback_client,
            shutdown,
            jobs: TaskTracker::new(),
        })
    }
}

/// Builds the router with all API routes.
pub fn app(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/repo-validate", post(handlers::validate_repository))
        .route("/repo-data", post(handlers::repository_data))
        .route("/contributors", post(handlers::contributors))
        .route("/commits", post(handlers::commits))
        .route(
            "/users/{user_id}/token",
            get(handlers::token_status).put(handlers::store_token),
        )
        .route("/analyses", post(handlers::start_analysis))
        .route("/health", get(handlers::health));

    Router::new()
        .nest(API_BASE_PATH, api)
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Waits for Ctrl-C or SIGTERM, then cancels the root token.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = e.to_string(), "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = e.to_string(), "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown requested. Cancelling in-flight analyses");
    shutdown.cancel();
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let otlp_endpoint = env::var(telemetry::OTLP_ENDPOINT_ENV).ok();
    let tracer_provider = telemetry::init_telemetry(otlp_endpoint.as_deref())?;

    info!("Starting application");

    debug!("Loading configuration ...");
    let config = ServerConfig::from_env()?;

    let shutdown = CancellationToken::new();
    let state = Arc::new(AppState::new(&config, shutdown.clone())?);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;

    info!("Listening on {}", addr);
    axum::serve(listener, app(state.clone()))
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    state.jobs.close();
    state.jobs.wait().await;
    info!("All analysis jobs finished");

    if let Some(provider) = tracer_provider {
        if let Err(e) = provider.shutdown() {
            error!(error = e.to_string(), "Failed to flush telemetry");
        }
    }

    Ok(())
}
