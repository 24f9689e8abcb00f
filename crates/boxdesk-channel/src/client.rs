//! WebSocket implementation of [`Channel`].
//!
//! [`WsChannel::connect`] opens the socket, spawns a background task that owns
//! it, and hands back the channel plus a receiver of [`ChannelEvent`]s.
//!
//! ```text
//!   send() ──try_send──▶ cmd queue ──▶ ┌──────────────────────┐ ──▶ socket
//!                                      │ background I/O task  │
//!   events ◀──────────── event queue ◀ └──────────────────────┘ ◀── socket
//! ```
//!
//! Inbound frames are forwarded in arrival order, which keeps per-session
//! terminal output ordered. Lost connections are retried with exponential
//! backoff.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

use boxdesk_core::prelude::*;
use boxdesk_core::{Outbound, WorkspaceKey};

use crate::channel::{Channel, ChannelEvent, ConnectionState};
use crate::codec::{decode_frame, encode_frame};

/// Initial backoff duration for reconnection attempts.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Maximum backoff duration between reconnection attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Maximum number of reconnection attempts before giving up.
const MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Capacity of the outbound command queue.
const CMD_CHANNEL_CAPACITY: usize = 256;

/// Capacity of the inbound event queue.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Characters left unescaped in the workspace path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Internal messages sent from the public API to the background task.
enum ClientCommand {
    /// Write an encoded frame.
    Frame(String),
    /// Gracefully close the WebSocket connection and stop the background task.
    Disconnect,
}

/// Build the socket URL for a workspace: `<endpoint>/<encoded key>`.
///
/// # Errors
///
/// Returns [`Error::ConfigInvalid`] if `endpoint` is not a `ws://` or
/// `wss://` URL.
pub fn endpoint_url(endpoint: &str, key: &WorkspaceKey) -> Result<Url> {
    let mut url = Url::parse(endpoint)
        .map_err(|e| Error::config_invalid(format!("endpoint '{}': {}", endpoint, e)))?;

    if !matches!(url.scheme(), "ws" | "wss") {
        return Err(Error::config_invalid(format!(
            "endpoint '{}' must use ws:// or wss://",
            endpoint
        )));
    }

    let encoded = utf8_percent_encode(key.as_str(), PATH_SEGMENT).to_string();
    let path = format!("{}/{}", url.path().trim_end_matches('/'), encoded);
    url.set_path(&path);
    Ok(url)
}

/// Channel backed by a WebSocket connection.
///
/// Cloning shares the same connection. The background task stops when every
/// clone is dropped or [`WsChannel::disconnect`] is called.
#[derive(Clone)]
pub struct WsChannel {
    cmd_tx: mpsc::Sender<ClientCommand>,
    state: Arc<RwLock<ConnectionState>>,
}

impl std::fmt::Debug for WsChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsChannel")
            .field("connection_state", &self.connection_state())
            .finish()
    }
}

impl WsChannel {
    /// Connect to `url` and return the channel with its event receiver.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the initial connection cannot be
    /// established.
    pub async fn connect(url: &Url) -> Result<(Self, mpsc::Receiver<ChannelEvent>)> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<ClientCommand>(CMD_CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel::<ChannelEvent>(EVENT_CHANNEL_CAPACITY);
        let state = Arc::new(RwLock::new(ConnectionState::Connecting));

        info!("Connecting to workspace channel at {}", url);
        let ws_stream = connect_ws(url.as_str()).await?;
        set_state(&state, ConnectionState::Connected);

        // Receiver is fresh and has capacity; the first event cannot fail.
        let _ = event_tx.send(ChannelEvent::Connected).await;

        tokio::spawn(run_client_task(
            url.to_string(),
            ws_stream,
            cmd_rx,
            event_tx,
            Arc::clone(&state),
        ));

        Ok((Self { cmd_tx, state }, event_rx))
    }

    /// Ask the background task to close the socket and exit.
    pub fn disconnect(&self) {
        if self.cmd_tx.try_send(ClientCommand::Disconnect).is_err() {
            debug!("Channel: disconnect requested after task exit");
        }
    }
}

impl Channel for WsChannel {
    fn send(&self, message: Outbound) -> Result<()> {
        let frame = encode_frame(&message)?;
        trace!("Channel: queueing {}", message.event_name());
        self.cmd_tx
            .try_send(ClientCommand::Frame(frame))
            .map_err(|err| match err {
                TrySendError::Full(_) => Error::channel_send(format!(
                    "outbound queue full, dropped {}",
                    message.event_name()
                )),
                TrySendError::Closed(_) => Error::ChannelClosed,
            })
    }

    fn connection_state(&self) -> ConnectionState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

fn set_state(state: &RwLock<ConnectionState>, next: ConnectionState) {
    let mut guard = state.write().unwrap_or_else(|e| e.into_inner());
    *guard = next;
}

/// How an I/O loop ended.
#[derive(Debug, PartialEq, Eq)]
enum LoopExit {
    /// Connection lost; try again.
    Reconnect,
    /// Disconnect requested or the owner went away.
    Shutdown,
}

async fn run_client_task(
    url: String,
    ws_stream: WsStream,
    mut cmd_rx: mpsc::Receiver<ClientCommand>,
    event_tx: mpsc::Sender<ChannelEvent>,
    state: Arc<RwLock<ConnectionState>>,
) {
    if run_io_loop(ws_stream, &mut cmd_rx, &event_tx).await == LoopExit::Shutdown {
        set_state(&state, ConnectionState::Disconnected);
        let _ = event_tx.send(ChannelEvent::Disconnected).await;
        return;
    }

    let mut attempt: u32 = 1;
    loop {
        if attempt > MAX_RECONNECT_ATTEMPTS {
            error!(
                "Channel: exceeded {} reconnection attempts, giving up",
                MAX_RECONNECT_ATTEMPTS
            );
            break;
        }

        set_state(&state, ConnectionState::Reconnecting { attempt });
        let _ = event_tx.send(ChannelEvent::Reconnecting { attempt }).await;

        let backoff = compute_backoff(attempt);
        warn!(
            "Channel: connection lost, retrying in {:?} (attempt {}/{})",
            backoff, attempt, MAX_RECONNECT_ATTEMPTS
        );
        tokio::time::sleep(backoff).await;

        if cmd_rx.is_closed() || event_tx.is_closed() {
            break;
        }

        match connect_ws(&url).await {
            Ok(ws_stream) => {
                info!("Channel: reconnected (attempt {})", attempt);
                set_state(&state, ConnectionState::Connected);
                if event_tx.send(ChannelEvent::Connected).await.is_err() {
                    break;
                }
                attempt = 1;

                if run_io_loop(ws_stream, &mut cmd_rx, &event_tx).await == LoopExit::Shutdown {
                    break;
                }
            }
            Err(err) => {
                warn!("Channel: reconnection attempt {} failed: {}", attempt, err);
                attempt += 1;
            }
        }
    }

    set_state(&state, ConnectionState::Disconnected);
    let _ = event_tx.send(ChannelEvent::Disconnected).await;
    debug!("Channel background task exiting");
}

async fn run_io_loop(
    ws_stream: WsStream,
    cmd_rx: &mut mpsc::Receiver<ClientCommand>,
    event_tx: &mpsc::Sender<ChannelEvent>,
) -> LoopExit {
    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    loop {
        tokio::select! {
            frame = ws_stream.next() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        if let Some(message) = decode_frame(text.as_str()) {
                            if event_tx.send(ChannelEvent::Message(message)).await.is_err() {
                                debug!("Channel: event receiver dropped, shutting down");
                                send_close(&mut ws_sink).await;
                                return LoopExit::Shutdown;
                            }
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) => {
                        debug!("Channel: received Close frame");
                        return LoopExit::Reconnect;
                    }
                    Some(Ok(_)) => {
                        // Ping/Pong/Binary: nothing to route
                    }
                    Some(Err(err)) => {
                        warn!("Channel: WebSocket read error: {}", err);
                        return LoopExit::Reconnect;
                    }
                    None => {
                        debug!("Channel: WebSocket stream ended");
                        return LoopExit::Reconnect;
                    }
                }
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(ClientCommand::Frame(frame)) => {
                        if let Err(err) = ws_sink.send(WsMessage::Text(frame.into())).await {
                            warn!("Channel: write failed: {}", err);
                            return LoopExit::Reconnect;
                        }
                    }
                    Some(ClientCommand::Disconnect) => {
                        send_close(&mut ws_sink).await;
                        return LoopExit::Shutdown;
                    }
                    None => {
                        debug!("Channel: command queue closed, shutting down");
                        send_close(&mut ws_sink).await;
                        return LoopExit::Shutdown;
                    }
                }
            }
        }
    }
}

/// Establish a new WebSocket connection to `url`.
async fn connect_ws(url: &str) -> Result<WsStream> {
    let (ws_stream, _response) = connect_async(url)
        .await
        .map_err(|err| Error::connection(format!("Failed to connect to {url}: {err}")))?;
    Ok(ws_stream)
}

/// Exponential backoff for reconnection attempt `n`: `1s * 2^(n-1)`, capped.
fn compute_backoff(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1);
    let multiplier: u64 = 1u64.checked_shl(exponent).unwrap_or(u64::MAX);
    let secs = INITIAL_BACKOFF.as_secs().saturating_mul(multiplier);
    Duration::from_secs(secs.min(MAX_BACKOFF.as_secs()))
}

/// Send a WebSocket Close frame, ignoring any write errors.
async fn send_close(ws_sink: &mut SplitSink<WsStream, WsMessage>) {
    let _ = ws_sink.send(WsMessage::Close(None)).await;
    let _ = ws_sink.close().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_then_caps() {
        assert_eq!(compute_backoff(1), Duration::from_secs(1));
        assert_eq!(compute_backoff(2), Duration::from_secs(2));
        assert_eq!(compute_backoff(4), Duration::from_secs(8));
        assert_eq!(compute_backoff(6), Duration::from_secs(30));
        assert_eq!(compute_backoff(200), Duration::from_secs(30));
    }

    #[test]
    fn test_endpoint_url_appends_encoded_key() {
        let url = endpoint_url("ws://localhost:5000/ws", &WorkspaceKey::new("my box")).unwrap();
        assert_eq!(url.as_str(), "ws://localhost:5000/ws/my%20box");

        let url = endpoint_url("wss://example.com/", &WorkspaceKey::new("dev-1")).unwrap();
        assert_eq!(url.as_str(), "wss://example.com/dev-1");
    }

    #[test]
    fn test_endpoint_url_rejects_http() {
        let err = endpoint_url("http://localhost:5000", &WorkspaceKey::new("a")).unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }));
    }

    #[test]
    fn test_endpoint_url_rejects_garbage() {
        assert!(endpoint_url("not a url", &WorkspaceKey::new("a")).is_err());
    }

    #[tokio::test]
    async fn test_connect_refused_is_connection_error() {
        // Port 9 (discard) is essentially never listening for WebSocket.
        let url = Url::parse("ws://127.0.0.1:9/box").unwrap();
        let err = WsChannel::connect(&url).await.unwrap_err();
        assert!(matches!(err, Error::Connection { .. }));
    }
}
