//! Realtime Tutoring Proxy
//!
//! This module implements the bidirectional streaming proxy between a browser
//! client and the Gemini Live API:
//!
//! - `setup`: builds the provider session-configuration payload.
//! - `upstream`: dials the outbound realtime connection.
//! - `relay`: the concurrency core pumping frames in both directions.
//! - `session`: the client-facing WebSocket endpoint tying it together.

pub mod relay;
pub mod session;
pub mod setup;
pub mod upstream;

pub use session::gemini_stream_handler;
