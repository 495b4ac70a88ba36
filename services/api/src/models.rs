//! API Request/Response Models
//!
//! Wire types for the REST surface, annotated for OpenAPI generation with
//! `utoipa`. Provider-layer types live in `gyan-core`; the response models
//! here are the stable external shape.

use gyan_core::llm::{ChatMessage, Completion, GenerateOptions, TokenUsage};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// Which providers are configured and what they default to.
#[derive(Serialize, ToSchema, Debug)]
pub struct StatusResponse {
    pub provider: String,
    pub openrouter: ProviderStatus,
    pub gemini: ProviderStatus,
}

#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub configured: bool,
    pub default_model: String,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub options: GenerateOptions,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct ChatRequest {
    #[schema(value_type = Vec<Object>)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub options: GenerateOptions,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct CompletionResponse {
    pub text: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageResponse>,
    pub provider: String,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct UsageResponse {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl From<TokenUsage> for UsageResponse {
    fn from(usage: TokenUsage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

impl From<Completion> for CompletionResponse {
    fn from(completion: Completion) -> Self {
        Self {
            text: completion.text,
            model: completion.model,
            usage: completion.usage.map(UsageResponse::from),
            provider: completion.provider.to_string(),
        }
    }
}

/// Body for mindmap generation from raw text or a bare topic name.
#[derive(Deserialize, ToSchema, Debug, Default)]
pub struct TextMindmapRequest {
    pub topic: Option<String>,
    pub text: Option<String>,
}

/// The node/edge graph handed to the frontend for layout.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct MindmapGraph {
    pub nodes: Vec<MindmapNode>,
    pub edges: Vec<MindmapEdge>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct MindmapNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub position: Position,
}

/// Positions are zeroed on purpose; the frontend computes the layout.
#[derive(Serialize, Deserialize, ToSchema, Debug, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct MindmapEdge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mindmap_graph_accepts_model_output_shape() {
        let raw = r#"{
            "nodes": [
                {"id": "root", "label": "Central Concept", "type": "input", "position": {"x": 0, "y": 0}},
                {"id": "1", "label": "Subtopic A"}
            ],
            "edges": [
                {"id": "e1", "source": "root", "target": "1"},
                {"source": "1", "target": "root", "label": "back"}
            ]
        }"#;
        let graph: MindmapGraph = serde_json::from_str(raw).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[0].kind.as_deref(), Some("input"));
        assert_eq!(graph.nodes[1].position.x, 0.0);
        assert_eq!(graph.edges[1].label.as_deref(), Some("back"));
    }

    #[test]
    fn completion_response_flattens_provider_and_usage() {
        let completion = Completion {
            text: "hello".into(),
            model: "gemini-flash-latest".into(),
            usage: Some(TokenUsage {
                prompt_tokens: 1,
                completion_tokens: 2,
                total_tokens: 3,
            }),
            provider: gyan_core::llm::ProviderKind::Gemini,
        };
        let response = CompletionResponse::from(completion);
        assert_eq!(response.provider, "gemini");
        assert_eq!(response.usage.unwrap().total_tokens, 3);
    }
}
