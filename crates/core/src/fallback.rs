//! Fixed-order provider fallback.
//!
//! The preference order is decided once at startup from configuration; requests
//! try each configured provider in turn and return the first success. This is a
//! sequential retry policy, not a scheduler.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::llm::{ChatMessage, Completion, GenerateOptions, LlmClient, ProviderKind};

/// An [`LlmClient`] that delegates to a preference-ordered list of providers.
pub struct FallbackClient {
    providers: Vec<(ProviderKind, Arc<dyn LlmClient>)>,
}

impl FallbackClient {
    pub fn new(providers: Vec<(ProviderKind, Arc<dyn LlmClient>)>) -> Self {
        Self { providers }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// The provider kinds in the order they will be tried.
    pub fn order(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|(kind, _)| *kind).collect()
    }

    fn not_configured() -> anyhow::Error {
        anyhow!("No AI provider configured. Set OPENROUTER_API_KEY or GEMINI_API_KEY")
    }

    fn exhausted(primary: Option<(ProviderKind, anyhow::Error)>) -> anyhow::Error {
        match primary {
            Some((kind, error)) => anyhow!("Primary AI ({}) failed: {}", kind, error),
            None => Self::not_configured(),
        }
    }
}

#[async_trait]
impl LlmClient for FallbackClient {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<Completion> {
        if self.providers.is_empty() {
            return Err(Self::not_configured());
        }
        let mut primary_error = None;
        for (kind, client) in &self.providers {
            match client.generate(prompt, options).await {
                Ok(completion) => return Ok(completion),
                Err(error) => {
                    warn!(provider = %kind, error = ?error, "generate failed, trying next provider");
                    if primary_error.is_none() {
                        primary_error = Some((*kind, error));
                    }
                }
            }
        }
        Err(Self::exhausted(primary_error))
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &GenerateOptions,
    ) -> Result<Completion> {
        if self.providers.is_empty() {
            return Err(Self::not_configured());
        }
        let mut primary_error = None;
        for (kind, client) in &self.providers {
            match client.chat(messages, options).await {
                Ok(completion) => return Ok(completion),
                Err(error) => {
                    warn!(provider = %kind, error = ?error, "chat failed, trying next provider");
                    if primary_error.is_none() {
                        primary_error = Some((*kind, error));
                    }
                }
            }
        }
        Err(Self::exhausted(primary_error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    fn completion(provider: ProviderKind) -> Completion {
        Completion {
            text: "ok".to_string(),
            model: "test-model".to_string(),
            usage: None,
            provider,
        }
    }

    #[tokio::test]
    async fn empty_chain_reports_missing_configuration() {
        let chain = FallbackClient::new(vec![]);
        let err = chain
            .generate("hello", &GenerateOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No AI provider configured"));
    }

    #[tokio::test]
    async fn first_provider_success_short_circuits() {
        let mut first = MockLlmClient::new();
        first
            .expect_generate()
            .times(1)
            .returning(|_, _| Ok(completion(ProviderKind::Gemini)));
        let mut second = MockLlmClient::new();
        second.expect_generate().times(0);

        let chain = FallbackClient::new(vec![
            (ProviderKind::Gemini, Arc::new(first) as _),
            (ProviderKind::OpenRouter, Arc::new(second) as _),
        ]);
        let completion = chain
            .generate("hello", &GenerateOptions::default())
            .await
            .unwrap();
        assert_eq!(completion.provider, ProviderKind::Gemini);
    }

    #[tokio::test]
    async fn falls_back_to_secondary_on_primary_failure() {
        let mut first = MockLlmClient::new();
        first
            .expect_generate()
            .times(1)
            .returning(|_, _| Err(anyhow!("503 overloaded")));
        let mut second = MockLlmClient::new();
        second
            .expect_generate()
            .times(1)
            .returning(|_, _| Ok(completion(ProviderKind::OpenRouter)));

        let chain = FallbackClient::new(vec![
            (ProviderKind::Gemini, Arc::new(first) as _),
            (ProviderKind::OpenRouter, Arc::new(second) as _),
        ]);
        let completion = chain
            .generate("hello", &GenerateOptions::default())
            .await
            .unwrap();
        assert_eq!(completion.provider, ProviderKind::OpenRouter);
    }

    #[tokio::test]
    async fn all_failures_surface_the_primary_error() {
        let mut first = MockLlmClient::new();
        first
            .expect_chat()
            .times(1)
            .returning(|_, _| Err(anyhow!("quota exceeded")));
        let mut second = MockLlmClient::new();
        second
            .expect_chat()
            .times(1)
            .returning(|_, _| Err(anyhow!("bad gateway")));

        let chain = FallbackClient::new(vec![
            (ProviderKind::OpenRouter, Arc::new(first) as _),
            (ProviderKind::Gemini, Arc::new(second) as _),
        ]);
        let err = chain
            .chat(&[], &GenerateOptions::default())
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Primary AI (openrouter) failed"));
        assert!(message.contains("quota exceeded"));
    }

    #[test]
    fn order_reflects_construction_order() {
        let chain = FallbackClient::new(vec![
            (ProviderKind::Gemini, Arc::new(MockLlmClient::new()) as _),
            (ProviderKind::OpenRouter, Arc::new(MockLlmClient::new()) as _),
        ]);
        assert_eq!(
            chain.order(),
            vec![ProviderKind::Gemini, ProviderKind::OpenRouter]
        );
    }
}
