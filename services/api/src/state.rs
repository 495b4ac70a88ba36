//! Shared Application State
//!
//! `AppState` holds the shared, clonable resources every handler needs: the
//! LLM fallback chain, the realtime upstream connector and the loaded
//! configuration.

use crate::{config::Config, ws::upstream::UpstreamConnector};
use gyan_core::llm::LlmClient;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn LlmClient>,
    pub connector: Arc<dyn UpstreamConnector>,
    pub config: Arc<Config>,
}
