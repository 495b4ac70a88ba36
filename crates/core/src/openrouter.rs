//! OpenRouter client, driven through the OpenAI-compatible chat API.

use anyhow::{Result, anyhow};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;

use crate::llm::{ChatMessage, Completion, GenerateOptions, LlmClient, ProviderKind, TokenUsage};

pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
pub const OPENROUTER_DEFAULT_MODEL: &str = "google/gemini-2.0-flash-lite-preview-02-05:free";

const DEFAULT_MAX_TOKENS: u32 = 4096;

/// A client for OpenRouter's chat-completions endpoint.
///
/// OpenRouter speaks the OpenAI wire protocol, so this reuses the
/// `async-openai` client pointed at the OpenRouter base URL.
pub struct OpenRouterClient {
    client: Client<OpenAIConfig>,
    default_model: String,
}

impl OpenRouterClient {
    pub fn new(api_key: &str, default_model: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(OPENROUTER_API_BASE);
        Self {
            client: Client::with_config(config),
            default_model,
        }
    }

    async fn complete(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        options: &GenerateOptions,
    ) -> Result<Completion> {
        let model = options
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone());

        let mut request = CreateChatCompletionRequestArgs::default();
        request
            .model(&model)
            .messages(messages)
            .max_tokens(options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS));
        if let Some(temperature) = options.temperature {
            request.temperature(temperature);
        }

        let response = self.client.chat().create(request.build()?).await?;
        let text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow!("OpenRouter response contained no message content"))?;

        Ok(Completion {
            text,
            model: response.model,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            provider: ProviderKind::OpenRouter,
        })
    }
}

/// Converts a normalized chat history into OpenAI request messages.
fn to_request_messages(messages: &[ChatMessage]) -> Result<Vec<ChatCompletionRequestMessage>> {
    messages
        .iter()
        .map(|msg| {
            let message = match msg.normalized_role() {
                "assistant" => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(msg.content.as_str())
                    .build()?
                    .into(),
                "system" => ChatCompletionRequestSystemMessageArgs::default()
                    .content(msg.content.as_str())
                    .build()?
                    .into(),
                _ => ChatCompletionRequestUserMessageArgs::default()
                    .content(msg.content.as_str())
                    .build()?
                    .into(),
            };
            Ok(message)
        })
        .collect()
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<Completion> {
        let messages = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into(),
        ];
        self.complete(messages, options).await
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &GenerateOptions,
    ) -> Result<Completion> {
        self.complete(to_request_messages(messages)?, options).await
    }
}
