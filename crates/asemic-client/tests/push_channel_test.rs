//! Push channel against an in-process WebSocket relay.

use std::time::Duration;

use asemic_app::ChannelEvent;
use asemic_client::{DEFAULT_HANDSHAKE_TIMEOUT, PushChannel, open};
use futures::SinkExt;
use tokio::{
    net::{TcpListener, TcpStream},
    task::JoinHandle,
    time::timeout,
};
use tokio_tungstenite::{WebSocketStream, accept_async, tungstenite::Message};
use url::Url;

/// Start a one-connection relay running `script` against the accepted socket.
async fn relay<F, Fut>(script: F) -> (Url, JoinHandle<()>)
where
    F: FnOnce(WebSocketStream<TcpStream>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = Url::parse(&format!("ws://{}/ws", listener.local_addr().unwrap())).unwrap();
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = accept_async(stream).await.unwrap();
        script(ws).await;
    });
    (url, handle)
}

async fn next(channel: &mut PushChannel) -> Option<ChannelEvent> {
    timeout(Duration::from_secs(5), channel.from_server.recv()).await.unwrap()
}

fn payload(event: Option<ChannelEvent>) -> String {
    match event {
        Some(ChannelEvent::Frame { payload, .. }) => payload,
        other => panic!("expected frame, got {other:?}"),
    }
}

#[tokio::test]
async fn frames_arrive_in_order_then_one_close() {
    let (url, server) = relay(|mut ws| async move {
        ws.send(Message::text(r#"{"event":"KeyUpdate","data":["a"]}"#)).await.unwrap();
        ws.send(Message::binary(vec![1, 2, 3])).await.unwrap();
        ws.send(Message::text(r#"{"event":"KeyUpdate","data":["b"]}"#)).await.unwrap();
        ws.close(None).await.unwrap();
    })
    .await;

    let mut channel = open(&url, DEFAULT_HANDSHAKE_TIMEOUT);

    assert_eq!(next(&mut channel).await, Some(ChannelEvent::Opened));
    assert_eq!(payload(next(&mut channel).await), r#"{"event":"KeyUpdate","data":["a"]}"#);
    assert_eq!(payload(next(&mut channel).await), r#"{"event":"KeyUpdate","data":["b"]}"#);
    assert!(matches!(next(&mut channel).await, Some(ChannelEvent::Closed { .. })));
    assert_eq!(next(&mut channel).await, None);

    server.await.unwrap();
}

#[tokio::test]
async fn abrupt_disconnect_ends_with_one_terminal_event() {
    let (url, server) = relay(|ws| async move {
        drop(ws);
    })
    .await;

    let mut channel = open(&url, DEFAULT_HANDSHAKE_TIMEOUT);
    assert_eq!(next(&mut channel).await, Some(ChannelEvent::Opened));
    server.await.unwrap();

    assert!(matches!(
        next(&mut channel).await,
        Some(ChannelEvent::Closed { .. } | ChannelEvent::Error { .. })
    ));
    assert_eq!(next(&mut channel).await, None);
}

fn error_reason(event: Option<ChannelEvent>) -> String {
    match event {
        Some(ChannelEvent::Error { reason }) => reason,
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn handshake_failure_is_an_error_without_opened() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = Url::parse(&format!("ws://{}/ws", listener.local_addr().unwrap())).unwrap();
    drop(listener);

    let mut channel = open(&url, DEFAULT_HANDSHAKE_TIMEOUT);

    assert!(error_reason(next(&mut channel).await).contains("handshake failed"));
    assert_eq!(next(&mut channel).await, None);
}

#[tokio::test]
async fn open_returns_before_a_stalled_handshake_completes() {
    // Accepts the TCP connection but never answers the upgrade.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = Url::parse(&format!("ws://{}/ws", listener.local_addr().unwrap())).unwrap();
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(socket);
    });

    let mut channel = open(&url, Duration::from_millis(200));
    assert!(channel.from_server.try_recv().is_err(), "nothing reported yet");

    let reason = error_reason(next(&mut channel).await);
    assert!(reason.contains("timed out"), "got {reason}");
    assert_eq!(next(&mut channel).await, None);
    server.abort();
}

#[tokio::test]
async fn wss_is_supported() {
    // Plain TCP where TLS is expected: the TLS handshake itself must run and
    // fail, rather than the connector refusing the scheme.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        drop(socket);
    });

    let base = Url::parse(&format!("https://{addr}/")).unwrap();
    let url = asemic_client::push_url(&base).unwrap();
    assert_eq!(url.scheme(), "wss");

    let mut channel = open(&url, DEFAULT_HANDSHAKE_TIMEOUT);
    let reason = error_reason(next(&mut channel).await);
    assert!(!reason.contains("TLS support not compiled in"), "got {reason}");

    server.await.unwrap();
}
