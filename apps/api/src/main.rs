mod analysis;
mod clients;
mod config;
mod errors;
mod hash;
mod llm_client;
mod models;
mod performance;
mod routes;
mod settings;
mod state;
mod storage;
mod users;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{JsonFileStore, Repository};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Adlens API v{}", env!("CARGO_PKG_VERSION"));

    // Open the key/value store and wrap it in the typed repository
    let store = JsonFileStore::open(config.data_dir.join("adlens-store.json"))?;
    let repo = Repository::new(Arc::new(store));
    info!("Store opened at {}", config.data_dir.display());

    // Initialize the Gemini client. A missing key is not fatal: analysis
    // requests answer with a configuration-error result instead.
    let llm = Arc::new(GeminiClient::new(config.gemini_api_key.clone()));
    if llm.is_configured() {
        info!("Gemini client initialized (model: {})", llm_client::MODEL);
    } else {
        info!("GEMINI_API_KEY not set; analysis will report a configuration error");
    }

    // Build app state
    let state = AppState { repo, llm };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // local dashboard, no auth surface

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
