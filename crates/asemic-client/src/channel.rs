//! WebSocket push channel.
//!
//! [`open`] returns a [`PushChannel`] at once and does the handshake on a
//! background task, so the caller never waits on the network. The task
//! reports `Opened` once the handshake completes, forwards text frames in
//! arrival order, stamped on receipt, and ends with exactly one `Closed` or
//! `Error` event. A handshake that fails or outlasts the timeout ends with
//! `Error` and no `Opened`. The relay never expects anything from the console
//! on this channel, so there is no outbound half.

use std::time::Duration;

use asemic_app::ChannelEvent;
use asemic_proto::Endpoint;
use chrono::Utc;
use futures::StreamExt;
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use url::Url;

use crate::TransportError;

const CHANNEL_CAPACITY: usize = 256;

/// How long a handshake may take before the attempt counts as failed.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle to a push channel, open or still handshaking.
pub struct PushChannel {
    /// Events from the relay, in arrival order.
    pub from_server: mpsc::Receiver<ChannelEvent>,
    /// Abort handle to stop the channel task.
    abort_handle: tokio::task::AbortHandle,
}

impl PushChannel {
    /// Stop the handshake or the reader and drop the socket.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

/// Push channel URL for a relay base URL: `http` becomes `ws`, `https`
/// becomes `wss`, and the path is the channel endpoint.
pub fn push_url(base: &Url) -> Result<Url, TransportError> {
    let scheme = match base.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(TransportError::InvalidUrl(format!("unsupported scheme {other}"))),
    };

    let mut url = base
        .join(Endpoint::PUSH_CHANNEL_PATH)
        .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
    url.set_scheme(scheme)
        .map_err(|()| TransportError::InvalidUrl(format!("cannot use {scheme} for {base}")))?;
    Ok(url)
}

/// Start opening a push channel to `url`.
///
/// Must be called inside a tokio runtime.
pub fn open(url: &Url, handshake_timeout: Duration) -> PushChannel {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let handle = tokio::spawn(run_channel(url.clone(), handshake_timeout, tx));

    PushChannel { from_server: rx, abort_handle: handle.abort_handle() }
}

async fn handshake(
    url: &Url,
    handshake_timeout: Duration,
) -> Result<WebSocketStream<MaybeTlsStream<TcpStream>>, TransportError> {
    match tokio::time::timeout(handshake_timeout, connect_async(url.as_str())).await {
        Ok(Ok((stream, _response))) => Ok(stream),
        Ok(Err(e)) => Err(TransportError::Handshake(e.to_string())),
        Err(_) => Err(TransportError::Handshake(format!(
            "timed out after {}ms",
            handshake_timeout.as_millis()
        ))),
    }
}

/// Handshake, then forward frames until the socket ends and report how it
/// ended.
async fn run_channel(url: Url, handshake_timeout: Duration, tx: mpsc::Sender<ChannelEvent>) {
    let mut stream = match handshake(&url, handshake_timeout).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::debug!(%url, error = %e, "push channel handshake failed");
            let _ = tx.send(ChannelEvent::Error { reason: e.to_string() }).await;
            return;
        },
    };
    tracing::debug!(%url, "push channel handshake complete");
    if tx.send(ChannelEvent::Opened).await.is_err() {
        return;
    }

    let terminal = loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                let event = ChannelEvent::Frame {
                    payload: text.as_str().to_owned(),
                    received_at: Utc::now(),
                };
                if tx.send(event).await.is_err() {
                    tracing::debug!("push channel receiver dropped");
                    return;
                }
            },
            Some(Ok(Message::Binary(bytes))) => {
                tracing::warn!(len = bytes.len(), "ignoring binary frame on push channel");
            },
            Some(Ok(Message::Close(frame))) => {
                let reason = frame.map_or_else(
                    || "closed by relay".to_string(),
                    |f| format!("closed by relay ({}): {}", u16::from(f.code), f.reason.as_str()),
                );
                break ChannelEvent::Closed { reason };
            },
            // Ping/pong are answered by the library.
            Some(Ok(_)) => {},
            Some(Err(e)) => break ChannelEvent::Error { reason: e.to_string() },
            None => break ChannelEvent::Closed { reason: "stream ended".to_string() },
        }
    };

    tracing::debug!(?terminal, "push channel finished");
    if tx.send(terminal).await.is_err() {
        tracing::debug!("push channel receiver dropped before close");
    }
}
