//! Axum Handlers for the REST API
//!
//! Thin request/response glue around the provider layer: single-shot
//! generation, chat, provider status and file-to-mindmap extraction. The
//! realtime proxy lives in `ws`, not here.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use gyan_core::llm::GenerateOptions;
use std::sync::Arc;
use tracing::error;

use crate::{
    extract::extract_text,
    mindmap,
    models::{
        ChatRequest, CompletionResponse, ErrorResponse, GenerateRequest, HealthResponse,
        MindmapGraph, ProviderStatus, StatusResponse, TextMindmapRequest,
    },
    state::AppState,
};

pub enum ApiError {
    BadRequest(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = err.to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalServerError(err.into())
    }
}

/// Service liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "gyan-api",
    })
}

/// Reports which providers are configured and their default models.
#[utoipa::path(
    get,
    path = "/status",
    responses((status = 200, description = "Provider configuration report", body = StatusResponse))
)]
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let config = &state.config;
    Json(StatusResponse {
        provider: config.preferred_provider.to_string(),
        openrouter: ProviderStatus {
            configured: config.openrouter_api_key.is_some(),
            default_model: config.openrouter_model.clone(),
        },
        gemini: ProviderStatus {
            configured: config.gemini_api_key.is_some(),
            default_model: config.gemini_model.clone(),
        },
    })
}

/// Single-shot text generation with provider fallback.
#[utoipa::path(
    post,
    path = "/generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated text", body = CompletionResponse),
        (status = 500, description = "All configured providers failed", body = ErrorResponse)
    )
)]
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<CompletionResponse>, ApiError> {
    let completion = state.llm.generate(&payload.prompt, &payload.options).await?;
    Ok(Json(completion.into()))
}

/// Multi-turn chat with provider fallback.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Chat reply", body = CompletionResponse),
        (status = 500, description = "All configured providers failed", body = ErrorResponse)
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<CompletionResponse>, ApiError> {
    let completion = state.llm.chat(&payload.messages, &payload.options).await?;
    Ok(Json(completion.into()))
}

/// Generates a mindmap graph from an uploaded PDF, TXT or DOCX file.
#[utoipa::path(
    post,
    path = "/generate-mindmap",
    responses(
        (status = 200, description = "Mindmap graph", body = MindmapGraph),
        (status = 400, description = "Unsupported or empty file", body = ErrorResponse),
        (status = 500, description = "Generation failed", body = ErrorResponse)
    )
)]
pub async fn generate_mindmap(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<MindmapGraph>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field
                .file_name()
                .ok_or_else(|| ApiError::BadRequest("Uploaded file has no name".to_string()))?
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            upload = Some((filename, bytes.to_vec()));
            break;
        }
    }
    let (filename, content) =
        upload.ok_or_else(|| ApiError::BadRequest("Missing 'file' field".to_string()))?;

    let text = extract_text(&filename, &content).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if text.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Could not extract any text from the file.".to_string(),
        ));
    }

    generate_graph(&state, &mindmap::text_prompt(&text)).await
}

/// Generates a mindmap graph from a topic name or raw text.
#[utoipa::path(
    post,
    path = "/generate-mindmap-from-text",
    request_body = TextMindmapRequest,
    responses(
        (status = 200, description = "Mindmap graph", body = MindmapGraph),
        (status = 400, description = "Neither 'topic' nor 'text' was provided", body = ErrorResponse),
        (status = 500, description = "Generation failed", body = ErrorResponse)
    )
)]
pub async fn generate_mindmap_from_text(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TextMindmapRequest>,
) -> Result<Json<MindmapGraph>, ApiError> {
    let prompt = if let Some(topic) = payload.topic.as_deref().filter(|t| !t.is_empty()) {
        mindmap::topic_prompt(topic)
    } else if let Some(text) = payload.text.as_deref().filter(|t| !t.is_empty()) {
        mindmap::text_prompt(text)
    } else {
        return Err(ApiError::BadRequest(
            "Please provide either 'topic' or 'text' in the request body.".to_string(),
        ));
    };
    generate_graph(&state, &prompt).await
}

async fn generate_graph(state: &AppState, prompt: &str) -> Result<Json<MindmapGraph>, ApiError> {
    let options = GenerateOptions {
        json: true,
        ..Default::default()
    };
    let completion = state.llm.generate(prompt, &options).await?;
    let graph = mindmap::parse_graph(&completion.text)?;
    Ok(Json(graph))
}
