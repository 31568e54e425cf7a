//! Command path against a mock relay.

use asemic_app::{Command, CommandError};
use asemic_client::{CommandClient, CommandResponse};
use asemic_proto::{NoiseLevel, ObfuscationPattern};
use serde_json::json;
use url::Url;
use uuid::Uuid;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path},
};

async fn client_for(server: &MockServer) -> CommandClient {
    CommandClient::new(Url::parse(&server.uri()).unwrap()).unwrap()
}

fn send_hello() -> Command {
    Command::send_message("10.0.0.2:9000", Some("k"), ObfuscationPattern::Sunshine, "hello", None)
        .unwrap()
}

#[tokio::test]
async fn send_posts_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .and(body_json(json!({
            "target_addr": "10.0.0.2:9000",
            "key": "k",
            "pattern": "Sunshine",
            "content": { "type": "Text", "payload": "hello" }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.execute(&send_hello()).await, Ok(CommandResponse::Accepted));
}

#[tokio::test]
async fn rejection_surfaces_status_and_body_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad key"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.execute(&send_hello()).await.unwrap_err();

    assert_eq!(err, CommandError::Http { status: 400, body: "bad key".into() });
    assert_eq!(err.to_string(), "API error (400): bad key");
}

#[tokio::test]
async fn key_commands_use_post_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/keys"))
        .and(body_json(json!({ "key": "k1" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/keys"))
        .and(body_json(json!({ "key": "a&b" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client.execute(&Command::add_key(" k1 ").unwrap()).await.unwrap();
    client.execute(&Command::remove_key("a&b").unwrap()).await.unwrap();
}

#[tokio::test]
async fn noise_level_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/config/noise"))
        .and(body_json(json!({ "level": "Fast" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let command = Command::SetNoiseLevel { level: NoiseLevel::Fast };
    assert_eq!(client.execute(&command).await, Ok(CommandResponse::Accepted));
}

#[tokio::test]
async fn file_send_carries_base64() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .and(body_json(json!({
            "target_addr": "10.0.0.2:9000",
            "key": "k",
            "pattern": "Starfall",
            "content": { "type": "File", "payload": { "filename": "note.txt", "data": "aGk=" } }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let command = Command::send_message(
        "10.0.0.2:9000",
        Some("k"),
        ObfuscationPattern::Starfall,
        "",
        Some(("note.txt", b"hi")),
    )
    .unwrap();
    client.execute(&command).await.unwrap();
}

#[tokio::test]
async fn download_returns_bytes() {
    let server = MockServer::start().await;
    let id = Uuid::from_u128(0x6f96_19ff_8b86_d011_b42d_00c0_4fc9_64ff);
    Mock::given(method("GET"))
        .and(path(format!("/download/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x00\x01file".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/download/{}", Uuid::nil())))
        .respond_with(ResponseTemplate::new(404).set_body_string("File not found"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.fetch_file(id).await.unwrap(), b"\x00\x01file".to_vec());
    assert_eq!(
        client.fetch_file(Uuid::nil()).await,
        Err(CommandError::Http { status: 404, body: "File not found".into() })
    );
}

#[tokio::test]
async fn unreachable_relay_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = Url::parse(&format!("http://{}/", listener.local_addr().unwrap())).unwrap();
    drop(listener);

    let client = CommandClient::new(base).unwrap();
    let err = client.execute(&Command::add_key("k").unwrap()).await.unwrap_err();
    assert!(matches!(err, CommandError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn truncated_error_body_is_a_transport_error() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Promises 100 bytes of body, sends 7, then hangs up.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = Url::parse(&format!("http://{}/", listener.local_addr().unwrap())).unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = vec![0u8; 4096];
        let _ = socket.read(&mut request).await;
        socket
            .write_all(b"HTTP/1.1 400 Bad Request\r\ncontent-length: 100\r\n\r\nbad key")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    let client = CommandClient::new(base).unwrap();
    let err = client.execute(&Command::add_key("k").unwrap()).await.unwrap_err();

    let CommandError::Transport(message) = err else { panic!("expected transport error, got {err:?}") };
    assert!(message.contains("400"), "got {message}");
}
