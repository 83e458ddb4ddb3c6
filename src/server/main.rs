//! HTTP server for radius map requests.
//!
//! Accepts a JSON body on `POST /`, runs the map pipeline and answers with
//! the published document's link and the selected region names.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use georadius::config::Config;
use georadius::models::RawMapRequest;
use georadius::{MapError, MapResponse, MapService};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Radius map server")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides the config file
    #[arg(short, long)]
    listen: Option<String>,

    /// Region dataset, overrides the config file
    #[arg(long)]
    dataset: Option<PathBuf>,
}

/// Application state shared across handlers
struct AppState {
    service: Arc<MapService>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }
    if let Some(dataset) = args.dataset {
        config.dataset.path = dataset;
    }

    let listen = config.server.listen.clone();
    let service = tokio::task::spawn_blocking(move || MapService::from_config(config))
        .await?
        .context("Failed to initialize map service")?;
    info!("Indexed {} regions", service.region_count());

    let state = Arc::new(AppState {
        service: Arc::new(service),
    });
    let app = router(state);

    info!("Starting server on {}", listen);
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(map_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    regions: usize,
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        regions: state.service.region_count(),
    })
}

/// Generate and publish one map
async fn map_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawMapRequest>, JsonRejection>,
) -> Result<Json<MapResponse>, MapError> {
    let Json(raw) = payload.map_err(|rejection| MapError::Validation(rejection.body_text()))?;
    let response = state.service.handle(raw).await?;
    Ok(Json(response))
}
