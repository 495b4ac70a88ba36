//! Main Entrypoint for the GYAN API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing the provider fallback chain.
//! 3. Constructing the Axum router and applying middleware.
//! 4. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use gyan_api::{
    config::Config,
    router::create_router,
    state::AppState,
    ws::upstream::GeminiLiveConnector,
};
use gyan_core::{
    FallbackClient, GeminiClient, OpenRouterClient,
    llm::{LlmClient, ProviderKind},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
}

/// Builds the provider chain in fixed preference order: the preferred
/// provider first, then whatever else has a key configured.
fn build_llm_chain(config: &Config) -> FallbackClient {
    let mut providers: Vec<(ProviderKind, Arc<dyn LlmClient>)> = Vec::new();

    let gemini = config.gemini_api_key.as_ref().map(|key| {
        (
            ProviderKind::Gemini,
            Arc::new(GeminiClient::new(key, config.gemini_model.clone())) as Arc<dyn LlmClient>,
        )
    });
    let openrouter = config.openrouter_api_key.as_ref().map(|key| {
        (
            ProviderKind::OpenRouter,
            Arc::new(OpenRouterClient::new(key, config.openrouter_model.clone()))
                as Arc<dyn LlmClient>,
        )
    });

    match config.preferred_provider {
        ProviderKind::Gemini => providers.extend(gemini.into_iter().chain(openrouter)),
        ProviderKind::OpenRouter => providers.extend(openrouter.into_iter().chain(gemini)),
    }
    FallbackClient::new(providers)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize Shared Services ---
    let llm_chain = build_llm_chain(&config);
    if llm_chain.is_empty() {
        warn!("No provider API keys configured; /generate and /chat will fail until one is set.");
    } else {
        info!(order = ?llm_chain.order(), "Provider fallback chain assembled");
    }

    let app_state = Arc::new(AppState {
        llm: Arc::new(llm_chain),
        connector: Arc::new(GeminiLiveConnector),
        config: Arc::new(config.clone()),
    });

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 5. Start Server ---
    info!(
        provider = %config.preferred_provider,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
