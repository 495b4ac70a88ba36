//! The outbound realtime connection to the Gemini Live endpoint.

use super::relay::{FrameDuplex, FrameSink, FrameStream, RelayFrame};
use super::setup::SetupMessage;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, protocol::Message as WsMessage},
};
use tracing::info;

pub const REALTIME_HOST: &str = "generativelanguage.googleapis.com";
pub const REALTIME_SERVICE_PATH: &str =
    "/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

/// Failure to bring up an upstream session. These surface before a session
/// ever becomes active; the caller decides how to reject the client. No
/// automatic retrying happens at this layer.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("failed to encode session setup: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to reach the realtime endpoint: {0}")]
    Connect(#[source] tungstenite::Error),
    #[error("failed to send session setup: {0}")]
    Setup(#[source] tungstenite::Error),
}

/// Dials one realtime session. Abstracted behind a trait so tests can stand
/// in a fake upstream and count dials.
#[async_trait]
pub trait UpstreamConnector: Send + Sync {
    /// Opens the duplex connection and sends `setup` as the first message.
    async fn connect(
        &self,
        api_key: &str,
        setup: &SetupMessage,
    ) -> Result<FrameDuplex, UpstreamError>;
}

/// The production connector for the Gemini `BidiGenerateContent` service.
pub struct GeminiLiveConnector;

#[async_trait]
impl UpstreamConnector for GeminiLiveConnector {
    async fn connect(
        &self,
        api_key: &str,
        setup: &SetupMessage,
    ) -> Result<FrameDuplex, UpstreamError> {
        let payload = setup.to_json()?;
        let url = format!("wss://{REALTIME_HOST}{REALTIME_SERVICE_PATH}?key={api_key}");

        let (stream, _) = connect_async(&url).await.map_err(UpstreamError::Connect)?;
        info!("Connected to the Gemini Live endpoint");

        let (mut tx, rx) = stream.split();
        // The setup payload must go out before any client frame is forwarded.
        tx.send(WsMessage::Text(payload.into()))
            .await
            .map_err(UpstreamError::Setup)?;

        Ok(into_duplex(tx, rx))
    }
}

type UpstreamSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Adapts the split tungstenite halves to the relay's frame types.
fn into_duplex(
    tx: futures_util::stream::SplitSink<UpstreamSocket, WsMessage>,
    rx: futures_util::stream::SplitStream<UpstreamSocket>,
) -> FrameDuplex {
    let tx: FrameSink = Box::pin(tx.sink_map_err(anyhow::Error::from).with(
        |frame: RelayFrame| {
            std::future::ready(Ok::<_, anyhow::Error>(match frame {
                RelayFrame::Text(text) => WsMessage::Text(text.into()),
                RelayFrame::Binary(data) => WsMessage::Binary(data),
            }))
        },
    ));
    let rx: FrameStream = Box::pin(rx.filter_map(|message| async move {
        match message {
            Ok(WsMessage::Text(text)) => Some(Ok(RelayFrame::Text(text.to_string()))),
            Ok(WsMessage::Binary(data)) => Some(Ok(RelayFrame::Binary(data))),
            // Control frames are handled by the transport; a close frame means
            // the stream is about to end and carries nothing to forward.
            Ok(_) => None,
            Err(tungstenite::Error::ConnectionClosed) => None,
            Err(error) => Some(Err(anyhow::Error::from(error))),
        }
    }));
    FrameDuplex { tx, rx }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dial_url_embeds_host_path_and_key() {
        let url = format!("wss://{REALTIME_HOST}{REALTIME_SERVICE_PATH}?key=test-key");
        assert_eq!(
            url,
            "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent?key=test-key"
        );
    }
}
