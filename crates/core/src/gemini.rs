//! Gemini REST client built on the `generateContent` API.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::llm::{ChatMessage, Completion, GenerateOptions, LlmClient, ProviderKind, TokenUsage};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-flash-latest";

/// A client for Gemini's request/response text-generation endpoint.
pub struct GeminiClient {
    http: Client,
    api_key: String,
    default_model: String,
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiUsage {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u32,
    #[serde(rename = "totalTokenCount", default)]
    total_token_count: u32,
}

impl GeminiClient {
    pub fn new(api_key: &str, default_model: String) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.to_string(),
            default_model,
        }
    }

    fn generation_config(options: &GenerateOptions) -> Option<GeminiGenerationConfig> {
        if options.temperature.is_none() && options.max_tokens.is_none() && !options.json {
            return None;
        }
        Some(GeminiGenerationConfig {
            temperature: options.temperature,
            max_output_tokens: options.max_tokens,
            response_mime_type: options.json.then(|| "application/json".to_string()),
        })
    }

    async fn generate_content(
        &self,
        contents: Vec<GeminiContent>,
        options: &GenerateOptions,
    ) -> Result<Completion> {
        let model = options
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone());
        let url = format!("{}/{}:generateContent?key={}", GEMINI_API_BASE, model, self.api_key);

        let request = GeminiRequest {
            contents,
            generation_config: Self::generation_config(options),
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to reach the Gemini API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini API error ({}): {}", status, body));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .context("Failed to decode Gemini response")?;
        let text = parsed
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow!("Gemini response contained no candidates"))?;

        Ok(Completion {
            text,
            model,
            usage: parsed.usage_metadata.map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            }),
            provider: ProviderKind::Gemini,
        })
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<Completion> {
        let contents = vec![GeminiContent {
            role: "user".to_string(),
            parts: vec![GeminiPart {
                text: prompt.to_string(),
            }],
        }];
        self.generate_content(contents, options).await
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &GenerateOptions,
    ) -> Result<Completion> {
        // Gemini labels the assistant side "model" rather than "assistant".
        let contents = messages
            .iter()
            .map(|msg| GeminiContent {
                role: match msg.normalized_role() {
                    "assistant" => "model".to_string(),
                    _ => "user".to_string(),
                },
                parts: vec![GeminiPart {
                    text: msg.content.clone(),
                }],
            })
            .collect();
        self.generate_content(contents, options).await
    }
}
