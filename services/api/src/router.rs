//! Axum Router Configuration
//!
//! The complete HTTP routing for the service: REST endpoints, the realtime
//! WebSocket proxy, and the OpenAPI documentation UI.

use crate::{
    handlers,
    models::{
        ChatRequest, CompletionResponse, ErrorResponse, GenerateRequest, HealthResponse,
        MindmapEdge, MindmapGraph, MindmapNode, Position, ProviderStatus, StatusResponse,
        TextMindmapRequest, UsageResponse,
    },
    state::AppState,
    ws::gemini_stream_handler,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::status,
        handlers::generate,
        handlers::chat,
        handlers::generate_mindmap,
        handlers::generate_mindmap_from_text,
    ),
    components(
        schemas(
            HealthResponse, StatusResponse, ProviderStatus, GenerateRequest, ChatRequest,
            CompletionResponse, UsageResponse, TextMindmapRequest, MindmapGraph, MindmapNode,
            MindmapEdge, Position, ErrorResponse
        )
    ),
    tags(
        (name = "GYAN AI", description = "LLM relay and realtime tutoring proxy")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/health", get(handlers::health))
        .route("/status", get(handlers::status))
        .route("/generate", post(handlers::generate))
        .route("/chat", post(handlers::chat))
        .route("/generate-mindmap", post(handlers::generate_mindmap))
        .route(
            "/generate-mindmap-from-text",
            post(handlers::generate_mindmap_from_text),
        )
        .route("/gemini-stream", get(gemini_stream_handler))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
