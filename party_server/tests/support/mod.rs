// Shared primitives for one-time server bootstrapping across integration tests.
#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::{
    // `Arc` shares data between threads; `OnceLock` writes a value only once.
    sync::{Arc, OnceLock},
    time::Duration,
};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

// Global base URL used by all tests after the server publishes its bound address.
static SERVER_URL: OnceLock<String> = OnceLock::new();
// One-time guard that ensures the server bootstrap path runs only once.
static SERVER_READY: OnceLock<()> = OnceLock::new();

const RECV_TIMEOUT: Duration = Duration::from_secs(3);

// Ensure the test server is running and return the shared base URL.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published_url = Arc::new(OnceLock::<String>::new());
        let published_url_thread = Arc::clone(&published_url);
        // Spawn an OS thread so the server outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // Bind to an ephemeral port to avoid collisions with local services.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_url_thread.set(format!("http://{}", addr));
                party_server::run(listener).await.expect("server failed");
            });
        });
        wait_for_server_url_and_readiness(published_url);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

fn wait_for_server_url_and_readiness(published_url: Arc<OnceLock<String>>) {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    let _ = SERVER_URL.set(base_url.clone());

    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");

    // Retry for a short period to avoid racing server bind/accept.
    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}

/// Opens a websocket to the shared server and consumes the identity message.
/// Returns the socket and the assigned player id.
pub async fn connect_client() -> (Ws, String) {
    let base = ensure_server();
    let url = format!("{}/ws", base.replacen("http://", "ws://", 1));
    let (mut ws, _) = connect_async(url).await.expect("ws connect");
    let identity = recv_type(&mut ws, "Identity").await;
    let id = identity["data"]["player_id"]
        .as_str()
        .expect("player id")
        .to_string();
    (ws, id)
}

pub async fn send_json(ws: &mut Ws, value: Value) {
    ws.send(Message::text(value.to_string()))
        .await
        .expect("ws send");
}

/// Reads messages until one of the given `type` arrives, skipping the rest.
pub async fn recv_type(ws: &mut Ws, ty: &str) -> Value {
    let wanted = ty.to_string();
    tokio::time::timeout(RECV_TIMEOUT, async {
        loop {
            let msg = ws.next().await.expect("stream open").expect("ws recv");
            if let Message::Text(text) = msg {
                let value: Value = serde_json::from_str(text.as_str()).expect("json");
                if value["type"] == wanted.as_str() {
                    return value;
                }
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {ty}"))
}

/// Asserts that no message of the given `type` arrives within `window`.
pub async fn assert_no_type(ws: &mut Ws, ty: &str, window: Duration) {
    let wanted = ty.to_string();
    let result = tokio::time::timeout(window, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    let value: Value = serde_json::from_str(text.as_str()).expect("json");
                    if value["type"] == wanted.as_str() {
                        return value;
                    }
                }
                Some(Ok(_)) => {}
                _ => std::future::pending::<()>().await,
            }
        }
    })
    .await;
    assert!(result.is_err(), "unexpected {ty}: {result:?}");
}
