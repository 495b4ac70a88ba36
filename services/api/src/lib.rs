//! GYAN API Library Crate
//!
//! All core logic for the GYAN relay service: configuration, application
//! state, REST handlers, document extraction, routing, and the realtime
//! WebSocket proxy. The `api` binary is a thin wrapper around this library.

pub mod config;
pub mod extract;
pub mod handlers;
pub mod mindmap;
pub mod models;
pub mod router;
pub mod state;
pub mod ws;
