//! Provider-agnostic LLM client layer for the GYAN backend.
//!
//! This crate knows how to talk to the supported text-generation providers
//! (OpenRouter and Gemini) behind a single [`llm::LlmClient`] trait, and how
//! to chain them into a fixed-order fallback via [`fallback::FallbackClient`].
//! It contains no HTTP server or WebSocket logic; the `gyan-api` service
//! composes these clients at startup.

pub mod fallback;
pub mod gemini;
pub mod llm;
pub mod openrouter;

pub use fallback::FallbackClient;
pub use gemini::GeminiClient;
pub use llm::{ChatMessage, Completion, GenerateOptions, LlmClient, ProviderKind, TokenUsage};
pub use openrouter::OpenRouterClient;
