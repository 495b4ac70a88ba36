//! The client-facing `/gemini-stream` WebSocket endpoint.
//!
//! Each accepted connection gets exactly one upstream session. The handler
//! extracts the tutoring parameters from the query string, dials upstream,
//! and hands both connections to the relay coordinator.

use super::{
    relay::{FrameDuplex, FrameSink, FrameStream, Relay, RelayFrame},
    setup::{SessionParams, build_setup_message},
};
use crate::{config, state::AppState};
use axum::{
    extract::{
        Query, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{Instrument, error, info};

/// Query parameters carried on the upgrade request.
#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    grade: Option<String>,
    subject: Option<String>,
}

impl From<SessionQuery> for SessionParams {
    fn from(query: SessionQuery) -> Self {
        SessionParams::new(query.grade, query.subject)
    }
}

/// Axum handler for the realtime tutoring proxy.
///
/// The API key check happens before the 101 handshake completes, so a
/// misconfigured deployment rejects the client immediately instead of
/// accepting and silently hanging. The upstream connector is never dialed
/// on that path.
pub async fn gemini_stream_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<SessionQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(api_key) = config::resolve_realtime_api_key() else {
        error!("Rejecting realtime session: no GEMINI_AUDIO_API_KEY or GEMINI_API_KEY set");
        return (StatusCode::SERVICE_UNAVAILABLE, "Missing GEMINI_API_KEY").into_response();
    };

    let params: SessionParams = query.into();
    let session_id: u32 = rand::random();
    let span = tracing::info_span!(
        "gemini_stream",
        %session_id,
        grade = %params.grade,
        subject = %params.subject,
    );
    ws.on_upgrade(move |socket| {
        handle_socket(socket, state, params, api_key).instrument(span)
    })
}

/// Runs one proxied session from handshake to teardown.
async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    params: SessionParams,
    api_key: String,
) {
    info!("Client connected. Establishing upstream session...");

    let setup = build_setup_message(&params);
    let upstream = match state.connector.connect(&api_key, &setup).await {
        Ok(duplex) => duplex,
        Err(upstream_error) => {
            error!(error = %upstream_error, "Upstream connection failed; closing client");
            let mut socket = socket;
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::ERROR,
                    reason: "Upstream Error".into(),
                })))
                .await;
            return;
        }
    };

    let report = Relay::new().run(client_duplex(socket), upstream).await;
    info!(
        trigger = ?report.trigger,
        inbound = report.inbound_frames,
        outbound = report.outbound_frames,
        "Session closed"
    );
}

/// Adapts the accepted axum socket to the relay's frame types.
fn client_duplex(socket: WebSocket) -> FrameDuplex {
    let (tx, rx) = socket.split();
    let tx: FrameSink = Box::pin(tx.sink_map_err(anyhow::Error::from).with(
        |frame: RelayFrame| {
            std::future::ready(Ok::<_, anyhow::Error>(match frame {
                RelayFrame::Text(text) => Message::Text(text.into()),
                RelayFrame::Binary(data) => Message::Binary(data),
            }))
        },
    ));
    let rx: FrameStream = Box::pin(rx.filter_map(|message| async move {
        match message {
            Ok(Message::Text(text)) => Some(Ok(RelayFrame::Text(text.to_string()))),
            Ok(Message::Binary(data)) => Some(Ok(RelayFrame::Binary(data))),
            // Ping/pong are transport concerns; a close frame ends the stream.
            Ok(Message::Ping(_) | Message::Pong(_)) => None,
            Ok(Message::Close(_)) => None,
            Err(error) => Some(Err(anyhow::Error::from(error))),
        }
    }));
    FrameDuplex { tx, rx }
}
