use gyan_core::llm::ProviderKind;
use gyan_core::{gemini::GEMINI_DEFAULT_MODEL, openrouter::OPENROUTER_DEFAULT_MODEL};
use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
///
/// Provider keys are optional here: requests against an unconfigured provider
/// fail with a descriptive error instead of preventing startup, and the
/// realtime proxy resolves its own key per session (see
/// [`resolve_realtime_api_key`]).
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub preferred_provider: ProviderKind,
    pub openrouter_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub openrouter_model: String,
    pub gemini_model: String,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let provider_str = std::env::var("AI_PROVIDER").unwrap_or_else(|_| "gemini".to_string());
        let preferred_provider = match provider_str.to_lowercase().as_str() {
            "openrouter" => ProviderKind::OpenRouter,
            _ => ProviderKind::Gemini,
        };

        let openrouter_api_key = std::env::var("OPENROUTER_API_KEY").ok();
        let gemini_api_key = std::env::var("GEMINI_API_KEY").ok();

        let openrouter_model = std::env::var("OPENROUTER_DEFAULT_MODEL")
            .unwrap_or_else(|_| OPENROUTER_DEFAULT_MODEL.to_string());
        let gemini_model = std::env::var("GEMINI_DEFAULT_MODEL")
            .unwrap_or_else(|_| GEMINI_DEFAULT_MODEL.to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            preferred_provider,
            openrouter_api_key,
            gemini_api_key,
            openrouter_model,
            gemini_model,
            log_level,
        })
    }
}

/// Resolves the realtime-session API key from the environment.
///
/// Read at session start rather than cached in [`Config`] so rotating
/// `GEMINI_AUDIO_API_KEY` takes effect for new sessions without a restart.
/// The audio-specific key wins; the general key is the fallback.
pub fn resolve_realtime_api_key() -> Option<String> {
    std::env::var("GEMINI_AUDIO_API_KEY")
        .ok()
        .filter(|key| !key.is_empty())
        .or_else(|| {
            std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|key| !key.is_empty())
        })
}
