//! The relay coordinator: pumps frames between the client and upstream
//! sockets until either side ends, then cancels the survivor.
//!
//! The coordinator is deliberately transport-agnostic. Both connections are
//! handed in as a [`FrameDuplex`] of boxed sink/stream halves, which keeps the
//! state machine testable against channel-backed fakes.

use anyhow::Result;
use bytes::Bytes;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

/// One unit of relayed data. Frames are forwarded verbatim; the relay never
/// parses their contents, and binary/text framing is preserved end to end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayFrame {
    Text(String),
    Binary(Bytes),
}

pub type FrameStream = Pin<Box<dyn Stream<Item = Result<RelayFrame>> + Send>>;
pub type FrameSink = Pin<Box<dyn Sink<RelayFrame, Error = anyhow::Error> + Send>>;

/// The two halves of one WebSocket connection, adapted to [`RelayFrame`]s.
pub struct FrameDuplex {
    pub tx: FrameSink,
    pub rx: FrameStream,
}

/// Lifecycle of one relayed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Session parameters extracted, upstream not yet pumping.
    Init,
    /// Both pump tasks are running.
    Active,
    /// One pump has finished; the sibling is being cancelled.
    Draining,
    /// Both pumps are done and the connection handles have been released.
    Closed,
}

/// Which side ended the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Client,
    Upstream,
}

/// Final accounting for a completed relay.
#[derive(Debug)]
pub struct RelayReport {
    pub trigger: Trigger,
    /// Frames forwarded client -> upstream.
    pub inbound_frames: u64,
    /// Frames forwarded upstream -> client.
    pub outbound_frames: u64,
}

/// Coordinates the two pump tasks for one session.
pub struct Relay {
    state: watch::Sender<RelayState>,
}

impl Relay {
    pub fn new() -> Self {
        let (state, _) = watch::channel(RelayState::Init);
        Self { state }
    }

    /// A receiver observing the session lifecycle.
    pub fn state(&self) -> watch::Receiver<RelayState> {
        self.state.subscribe()
    }

    /// Runs the session to completion.
    ///
    /// The caller must already have sent the upstream setup payload; this
    /// function starts forwarding immediately. Whichever pump finishes first,
    /// by clean end or by transport error, triggers teardown: the sibling task
    /// is aborted and its outcome discarded. Remaining buffered frames on the
    /// surviving side are dropped, matching the abrupt-teardown contract.
    pub async fn run(self, client: FrameDuplex, upstream: FrameDuplex) -> RelayReport {
        let inbound_count = Arc::new(AtomicU64::new(0));
        let outbound_count = Arc::new(AtomicU64::new(0));

        self.state.send_replace(RelayState::Active);

        let mut inbound = tokio::spawn(pump(
            client.rx,
            upstream.tx,
            inbound_count.clone(),
            "client->upstream",
        ));
        let mut outbound = tokio::spawn(pump(
            upstream.rx,
            client.tx,
            outbound_count.clone(),
            "upstream->client",
        ));

        let trigger = tokio::select! {
            result = &mut inbound => {
                observe_pump_end("client->upstream", result);
                Trigger::Client
            }
            result = &mut outbound => {
                observe_pump_end("upstream->client", result);
                Trigger::Upstream
            }
        };

        self.state.send_replace(RelayState::Draining);
        let sibling: JoinHandle<Result<()>> = match trigger {
            Trigger::Client => outbound,
            Trigger::Upstream => inbound,
        };
        sibling.abort();
        // Cancellation is an expected control path, not a fault.
        let _ = sibling.await;

        self.state.send_replace(RelayState::Closed);
        RelayReport {
            trigger,
            inbound_frames: inbound_count.load(Ordering::Relaxed),
            outbound_frames: outbound_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}

/// Forwards frames from `rx` to `tx` in receipt order until `rx` ends or
/// either side fails.
async fn pump(
    mut rx: FrameStream,
    mut tx: FrameSink,
    forwarded: Arc<AtomicU64>,
    direction: &'static str,
) -> Result<()> {
    while let Some(frame) = rx.next().await {
        let frame = frame?;
        tx.send(frame).await?;
        forwarded.fetch_add(1, Ordering::Relaxed);
    }
    debug!(direction, "Pump source ended cleanly");
    Ok(())
}

fn observe_pump_end(direction: &'static str, result: Result<Result<()>, JoinError>) {
    match result {
        Ok(Ok(())) => debug!(direction, "Pump finished; tearing down session"),
        Ok(Err(error)) => {
            warn!(direction, error = ?error, "Pump failed; tearing down session")
        }
        Err(join_error) => warn!(direction, error = ?join_error, "Pump task panicked"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use futures::channel::mpsc;
    use std::time::Duration;
    use tokio::time::timeout;

    /// One fake connection: the test feeds `feed` to produce received frames
    /// and reads everything the relay sent out of `sent`.
    struct TestConn {
        duplex: FrameDuplex,
        feed: mpsc::UnboundedSender<Result<RelayFrame>>,
        sent: mpsc::UnboundedReceiver<RelayFrame>,
    }

    fn test_conn() -> TestConn {
        let (feed, rx) = mpsc::unbounded::<Result<RelayFrame>>();
        let (tx, sent) = mpsc::unbounded::<RelayFrame>();
        let duplex = FrameDuplex {
            tx: Box::pin(tx.sink_map_err(|e| anyhow!(e))),
            rx: Box::pin(rx),
        };
        TestConn { duplex, feed, sent }
    }

    fn collect(mut rx: mpsc::UnboundedReceiver<RelayFrame>) -> Vec<RelayFrame> {
        let mut frames = Vec::new();
        while let Ok(Some(frame)) = rx.try_next() {
            frames.push(frame);
        }
        frames
    }

    #[tokio::test]
    async fn forwards_client_frames_in_order_preserving_framing() {
        let client = test_conn();
        let upstream = test_conn();

        let sent: Vec<RelayFrame> = (0..8)
            .map(|i| {
                if i % 2 == 0 {
                    RelayFrame::Text(format!("frame-{i}"))
                } else {
                    RelayFrame::Binary(Bytes::from(vec![i as u8; 4]))
                }
            })
            .collect();
        for frame in &sent {
            client.feed.unbounded_send(Ok(frame.clone())).unwrap();
        }
        drop(client.feed);
        let _upstream_feed = upstream.feed;

        let report = timeout(Duration::from_secs(1), Relay::new().run(client.duplex, upstream.duplex))
            .await
            .expect("relay must not hang");

        assert_eq!(report.trigger, Trigger::Client);
        assert_eq!(report.inbound_frames, sent.len() as u64);
        assert_eq!(collect(upstream.sent), sent);
    }

    #[tokio::test]
    async fn upstream_close_cancels_inbound_pump_and_reaches_closed() {
        let client = test_conn();
        let upstream = test_conn();

        // Upstream ends immediately; the client stays open.
        drop(upstream.feed);
        let _client_feed = client.feed;

        let relay = Relay::new();
        let state = relay.state();
        assert_eq!(*state.borrow(), RelayState::Init);

        let report = timeout(
            Duration::from_millis(100),
            relay.run(client.duplex, upstream.duplex),
        )
        .await
        .expect("teardown must be prompt even with the client still open");

        assert_eq!(report.trigger, Trigger::Upstream);
        assert_eq!(report.outbound_frames, 0);
        assert_eq!(*state.borrow(), RelayState::Closed);
    }

    #[tokio::test]
    async fn state_transitions_run_init_active_draining_closed() {
        let client = test_conn();
        let upstream = test_conn();
        drop(upstream.feed);
        let _client_feed = client.feed;

        let relay = Relay::new();
        let mut state = relay.state();
        let observer = tokio::spawn(async move {
            let mut seen = Vec::new();
            while state.changed().await.is_ok() {
                let current = *state.borrow();
                seen.push(current);
                if current == RelayState::Closed {
                    break;
                }
            }
            seen
        });

        relay.run(client.duplex, upstream.duplex).await;
        let seen = timeout(Duration::from_secs(1), observer).await.unwrap().unwrap();
        assert_eq!(
            seen,
            vec![RelayState::Active, RelayState::Draining, RelayState::Closed]
        );
    }

    #[tokio::test]
    async fn mid_stream_upstream_error_tears_down_without_panic() {
        let client = test_conn();
        let upstream = test_conn();

        upstream
            .feed
            .unbounded_send(Err(anyhow!("simulated transport failure")))
            .unwrap();
        let _upstream_feed = upstream.feed;
        let _client_feed = client.feed;

        let report = timeout(
            Duration::from_millis(100),
            Relay::new().run(client.duplex, upstream.duplex),
        )
        .await
        .expect("error teardown must be bounded");

        assert_eq!(report.trigger, Trigger::Upstream);
        assert_eq!(report.inbound_frames, 0);
    }

    #[tokio::test]
    async fn binary_and_text_framing_survive_both_directions() {
        let client = test_conn();
        let mut upstream = test_conn();

        let relay = tokio::spawn(Relay::new().run(client.duplex, upstream.duplex));

        client
            .feed
            .unbounded_send(Ok(RelayFrame::Text("setup-ack".into())))
            .unwrap();
        upstream
            .feed
            .unbounded_send(Ok(RelayFrame::Binary(Bytes::from_static(b"\x00\x01pcm"))))
            .unwrap();

        let mut client_sent = client.sent;
        let to_upstream = timeout(Duration::from_secs(1), upstream.sent.next())
            .await
            .unwrap()
            .unwrap();
        let to_client = timeout(Duration::from_secs(1), client_sent.next())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(to_upstream, RelayFrame::Text("setup-ack".into()));
        assert_eq!(to_client, RelayFrame::Binary(Bytes::from_static(b"\x00\x01pcm")));

        drop(client.feed);
        drop(upstream.feed);
        timeout(Duration::from_secs(1), relay).await.unwrap().unwrap();
    }
}
