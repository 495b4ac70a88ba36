//! Common types and the client trait shared by all text-generation providers.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The text-generation providers this backend can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenRouter,
    Gemini,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::OpenRouter => write!(f, "openrouter"),
            ProviderKind::Gemini => write!(f, "gemini"),
        }
    }
}

/// Per-request generation options. All fields are optional; providers apply
/// their own defaults for anything unset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateOptions {
    /// Overrides the provider's default model identifier.
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Ask the provider for a structured JSON response where supported.
    pub json: bool,
}

/// Token accounting as reported by the provider, when available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A normalized completion from any provider.
#[derive(Debug, Clone, Serialize)]
pub struct Completion {
    pub text: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    pub provider: ProviderKind,
}

/// One turn of a chat conversation as submitted by the client.
///
/// Clients are loose about field names (`text` vs `content`) and role labels
/// (`ai`/`model` vs `assistant`); [`ChatMessage::normalized_role`] smooths the
/// roles over before a request is built.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(alias = "text", default)]
    pub content: String,
}

fn default_role() -> String {
    "user".to_string()
}

impl ChatMessage {
    /// Maps provider-specific role labels onto the OpenAI-style triple.
    pub fn normalized_role(&self) -> &str {
        match self.role.as_str() {
            "ai" | "model" | "assistant" => "assistant",
            "system" => "system",
            _ => "user",
        }
    }
}

/// A client for one text-generation provider (or a chain of them).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single-shot prompt completion.
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<Completion>;

    /// Multi-turn chat completion over a normalized message history.
    async fn chat(&self, messages: &[ChatMessage], options: &GenerateOptions)
    -> Result<Completion>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_normalization_maps_ai_and_model_to_assistant() {
        for role in ["ai", "model", "assistant"] {
            let msg = ChatMessage {
                role: role.to_string(),
                content: "hi".to_string(),
            };
            assert_eq!(msg.normalized_role(), "assistant");
        }
        let user = ChatMessage {
            role: "user".to_string(),
            content: "hi".to_string(),
        };
        assert_eq!(user.normalized_role(), "user");
        let unknown = ChatMessage {
            role: "narrator".to_string(),
            content: "hi".to_string(),
        };
        assert_eq!(unknown.normalized_role(), "user");
    }

    #[test]
    fn chat_message_accepts_text_alias_and_defaults_role() {
        let msg: ChatMessage = serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
        assert_eq!(msg.role, "user");
        assert_eq!(msg.content, "hello");

        let msg: ChatMessage =
            serde_json::from_str(r#"{"role": "ai", "content": "hi there"}"#).unwrap();
        assert_eq!(msg.normalized_role(), "assistant");
    }

    #[test]
    fn generate_options_accept_camel_case_and_default_empty() {
        let opts: GenerateOptions =
            serde_json::from_str(r#"{"maxTokens": 512, "temperature": 0.2}"#).unwrap();
        assert_eq!(opts.max_tokens, Some(512));
        assert_eq!(opts.temperature, Some(0.2));
        assert!(opts.model.is_none());
        assert!(!opts.json);

        let opts: GenerateOptions = serde_json::from_str("{}").unwrap();
        assert!(opts.max_tokens.is_none());
    }
}
