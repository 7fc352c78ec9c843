// Shared bootstrapping for client integration tests: one in-process broker per
// test binary, plus helpers for reading notices.
#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use game_client::domain::PartyNotice;
use game_client::interface_adapters::{BrokerClient, ChannelCapacity};
use serde_json::{Value, json};
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};

static BROKER_ADDR: OnceLock<String> = OnceLock::new();

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);
const NOTICE_TIMEOUT: Duration = Duration::from_secs(3);

pub const CAPACITY: ChannelCapacity = ChannelCapacity {
    outbound: 64,
    notices: 64,
};

// Ensure the broker is running and return its `host:port`.
pub fn ensure_broker() -> &'static str {
    BROKER_ADDR.get_or_init(|| {
        let published = Arc::new(OnceLock::<String>::new());
        let published_thread = Arc::clone(&published);
        // Own OS thread so the broker outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_thread.set(addr.to_string());
                party_server::run(listener).await.expect("broker failed");
            });
        });

        let addr = loop {
            if let Some(addr) = published.get() {
                break addr.clone();
            }
            std::thread::sleep(Duration::from_millis(10));
        };
        for _ in 0..100 {
            if std::net::TcpStream::connect(&addr).is_ok() {
                return addr;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        panic!("broker did not become ready in time");
    })
}

pub async fn connect() -> (BrokerClient, mpsc::Receiver<PartyNotice>) {
    let url = format!("ws://{}/ws", ensure_broker());
    BrokerClient::connect(&url, REQUEST_TIMEOUT, CAPACITY)
        .await
        .expect("connect to broker")
}

/// Waits for the first notice accepted by `pick`, skipping the rest.
pub async fn next_notice<T>(
    notices: &mut mpsc::Receiver<PartyNotice>,
    mut pick: impl FnMut(PartyNotice) -> Option<T>,
) -> T {
    tokio::time::timeout(NOTICE_TIMEOUT, async {
        loop {
            let notice = notices.recv().await.expect("notice channel open");
            if let Some(found) = pick(notice) {
                return found;
            }
        }
    })
    .await
    .expect("timed out waiting for notice")
}

/// A scripted websocket server: assigns identity "1", sends `pushes`, then
/// answers every request with `RequestFailed { error: "reply to <id>" }`.
/// The first answer is held back for `first_reply_delay`.
pub async fn scripted_broker(pushes: Vec<Value>, first_reply_delay: Duration) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind scripted broker");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let pushes = pushes.clone();
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(stream).await else {
                    return;
                };
                let identity = json!({"type": "Identity", "data": {"player_id": "1"}});
                for msg in std::iter::once(identity).chain(pushes) {
                    if ws.send(Message::text(msg.to_string())).await.is_err() {
                        return;
                    }
                }

                let mut delay = Some(first_reply_delay);
                while let Some(Ok(frame)) = ws.next().await {
                    let Message::Text(text) = frame else {
                        continue;
                    };
                    let Ok(request) = serde_json::from_str::<Value>(text.as_str()) else {
                        continue;
                    };
                    let Some(request_id) = request["data"]["request_id"].as_u64() else {
                        continue;
                    };
                    if let Some(delay) = delay.take() {
                        tokio::time::sleep(delay).await;
                    }
                    let error = format!("reply to {request_id}");
                    let reply = json!({
                        "type": "RequestFailed",
                        "data": {"request_id": request_id, "error": error},
                    });
                    if ws.send(Message::text(reply.to_string())).await.is_err() {
                        return;
                    }
                }
            });
        }
    });
    format!("ws://{addr}/ws")
}
