mod config;
mod dictionary;
mod game;
mod routes;
mod store;
mod websocket;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use config::Config;
use dictionary::{DictionaryLookup, HttpDictionary};
use store::{FileHighScoreStore, HighScoreStore};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub dictionary: Arc<dyn DictionaryLookup>,
    pub high_scores: Arc<dyn HighScoreStore>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "letter_dash_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Letter Dash backend server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Open (or create) the high score file
    let high_scores = FileHighScoreStore::open(&config.storage.high_score_path)
        .await
        .with_context(|| {
            format!(
                "Failed to open high score file {}",
                config.storage.high_score_path.display()
            )
        })?;
    tracing::info!("High score store ready at {}", high_scores.path().display());

    // Create shared HTTP client for reusing connections
    let http_client = reqwest::Client::builder()
        .timeout(config.dictionary_timeout())
        .build()?;
    let dictionary = HttpDictionary::new(http_client, config.dictionary.api_url.clone());
    tracing::info!("Dictionary client initialized for {}", config.dictionary.api_url);

    // Create application state
    let state = Arc::new(AppState {
        config: config.clone(),
        dictionary: Arc::new(dictionary),
        high_scores: Arc::new(high_scores),
    });

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Serve the single-page client
    let frontend_service = ServeDir::new(&config.server.frontend_dir);

    // Build router
    let app = Router::new()
        // WebSocket endpoint
        .route("/ws", get(websocket::handle_websocket))
        // API routes
        .merge(routes::create_routes())
        .fallback_service(frontend_service)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("WebSocket endpoint: ws://{}/ws", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("Game frontend: http://{}/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
