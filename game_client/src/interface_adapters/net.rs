use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};
use url::Url;

use super::protocol::{ClientMessage, ServerMessage};
use crate::domain::{
    AuthoritativeState, AvatarState, ClientError, PartyLink, PartyNotice, PartyView,
    RemotePlayerView,
};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<ServerMessage>>>>;

/// Capacities of the client-side channels.
#[derive(Debug, Clone, Copy)]
pub struct ChannelCapacity {
    pub outbound: usize,
    pub notices: usize,
}

/// Turns `host:port`, `http(s)://…` or `ws(s)://…` into the broker's
/// websocket endpoint URL.
pub fn normalize_broker_url(raw: &str) -> Result<String, ClientError> {
    let raw = raw.trim();
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("ws://{raw}")
    };
    let mut url =
        Url::parse(&with_scheme).map_err(|err| ClientError::Connect(format!("{raw}: {err}")))?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(ClientError::Connect(format!("unsupported scheme {other}"))),
    };
    url.set_scheme(scheme)
        .map_err(|_| ClientError::Connect(format!("cannot use scheme {scheme}")))?;

    if url.path() == "/" || url.path().is_empty() {
        url.set_path("/ws");
    }
    Ok(url.to_string())
}

/// Websocket client for the party broker. Requests are matched to replies by
/// `request_id` and bounded by the request timeout; pushes go to the notice
/// channel returned from `connect`.
pub struct BrokerClient {
    player_id: String,
    outbound: mpsc::Sender<ClientMessage>,
    pending: Pending,
    next_request: AtomicU64,
    request_timeout: Duration,
}

impl BrokerClient {
    /// Connects, waits for the broker to assign an identity and starts the
    /// reader and writer tasks.
    pub async fn connect(
        url: &str,
        request_timeout: Duration,
        capacity: ChannelCapacity,
    ) -> Result<(Self, mpsc::Receiver<PartyNotice>), ClientError> {
        let (socket, _) = tokio::time::timeout(request_timeout, connect_async(url))
            .await
            .map_err(|_| ClientError::Timeout)?
            .map_err(|err| ClientError::Connect(err.to_string()))?;
        let (sink, mut stream) = socket.split();

        let player_id = tokio::time::timeout(request_timeout, read_identity(&mut stream))
            .await
            .map_err(|_| ClientError::Timeout)??;
        info!(%player_id, url, "connected to broker");

        let (outbound, outbound_rx) = mpsc::channel(capacity.outbound);
        let (notices_tx, notices_rx) = mpsc::channel(capacity.notices);
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));

        tokio::spawn(writer_task(sink, outbound_rx));
        tokio::spawn(reader_task(stream, Arc::clone(&pending), notices_tx));

        let client = Self {
            player_id,
            outbound,
            pending,
            next_request: AtomicU64::new(1),
            request_timeout,
        };
        Ok((client, notices_rx))
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    /// Creates a party with this connection as host. Returns the code and the
    /// initial party record.
    pub async fn create_party(
        &self,
        player_name: &str,
    ) -> Result<(String, PartyView), ClientError> {
        let player_name = player_name.to_string();
        match self
            .request(|request_id| ClientMessage::CreateParty {
                request_id,
                player_name,
            })
            .await?
        {
            ServerMessage::PartyCreated {
                party_code, party, ..
            } => Ok((party_code, party.into())),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn join_party(
        &self,
        party_code: &str,
        player_name: &str,
    ) -> Result<PartyView, ClientError> {
        let party_code = party_code.to_string();
        let player_name = player_name.to_string();
        match self
            .request(|request_id| ClientMessage::JoinParty {
                request_id,
                party_code,
                player_name,
            })
            .await?
        {
            ServerMessage::PartyJoined { party, .. } => Ok(party.into()),
            other => Err(unexpected(&other)),
        }
    }

    /// Host only. The `GameStarted` push follows on the notice channel.
    pub async fn start_game(&self) -> Result<(), ClientError> {
        match self
            .request(|request_id| ClientMessage::StartGame { request_id })
            .await?
        {
            ServerMessage::GameStartAccepted { .. } => Ok(()),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn leave_party(&self) -> Result<(), ClientError> {
        self.outbound
            .send(ClientMessage::LeaveParty)
            .await
            .map_err(|_| ClientError::Closed)
    }

    async fn request(
        &self,
        build: impl FnOnce(u64) -> ClientMessage,
    ) -> Result<ServerMessage, ClientError> {
        let request_id = self.next_request.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = oneshot::channel();
        self.pending.lock().await.insert(request_id, reply_tx);

        if self.outbound.send(build(request_id)).await.is_err() {
            self.pending.lock().await.remove(&request_id);
            return Err(ClientError::Closed);
        }

        match tokio::time::timeout(self.request_timeout, reply_rx).await {
            Ok(Ok(ServerMessage::RequestFailed { error, .. })) => Err(ClientError::Rejected(error)),
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(ClientError::Closed),
            Err(_) => {
                // A reply arriving after this finds no pending entry and is dropped.
                self.pending.lock().await.remove(&request_id);
                warn!(request_id, "broker request timed out");
                Err(ClientError::Timeout)
            }
        }
    }

    /// Fire-and-forget send for periodic updates. A full queue drops the
    /// message; the next update supersedes it.
    fn push(&self, msg: ClientMessage) -> Result<(), ClientError> {
        match self.outbound.try_send(msg) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                debug!("outbound queue full; update dropped");
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(ClientError::Closed),
        }
    }
}

#[async_trait]
impl PartyLink for BrokerClient {
    fn local_id(&self) -> &str {
        &self.player_id
    }

    async fn publish_avatar(&self, state: AvatarState) -> Result<(), ClientError> {
        self.push(ClientMessage::PlayerUpdate(state.into()))
    }

    async fn publish_host_state(&self, state: AuthoritativeState) -> Result<(), ClientError> {
        self.push(ClientMessage::HostGameState(state.into()))
    }

    async fn share_xp(&self, amount: f32) -> Result<(), ClientError> {
        // Lost XP is never made up, so this waits for queue space.
        self.outbound
            .send(ClientMessage::ShareXp { amount })
            .await
            .map_err(|_| ClientError::Closed)
    }

    async fn request_player_states(&self) -> Result<Vec<RemotePlayerView>, ClientError> {
        match self
            .request(|request_id| ClientMessage::RequestPlayerStates { request_id })
            .await?
        {
            ServerMessage::PlayerStates { players, .. } => {
                Ok(players.into_iter().map(Into::into).collect())
            }
            other => Err(unexpected(&other)),
        }
    }
}

fn unexpected(msg: &ServerMessage) -> ClientError {
    ClientError::Protocol(format!("unexpected reply: {msg:?}"))
}

async fn read_identity(stream: &mut SplitStream<Socket>) -> Result<String, ClientError> {
    while let Some(frame) = stream.next().await {
        let frame = frame.map_err(|err| ClientError::Connect(err.to_string()))?;
        let Message::Text(text) = frame else {
            continue;
        };
        return match serde_json::from_str::<ServerMessage>(text.as_str()) {
            Ok(ServerMessage::Identity { player_id }) => Ok(player_id),
            Ok(other) => Err(ClientError::Protocol(format!(
                "expected identity, got {other:?}"
            ))),
            Err(err) => Err(ClientError::Protocol(err.to_string())),
        };
    }
    Err(ClientError::Closed)
}

async fn writer_task(
    mut sink: SplitSink<Socket, Message>,
    mut outbound: mpsc::Receiver<ClientMessage>,
) {
    while let Some(msg) = outbound.recv().await {
        let json = match serde_json::to_string(&msg) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "failed to serialize client message");
                continue;
            }
        };
        if let Err(err) = sink.send(Message::text(json)).await {
            debug!(error = %err, "broker socket send failed");
            break;
        }
    }
    let _ = sink.close().await;
}

async fn reader_task(
    mut stream: SplitStream<Socket>,
    pending: Pending,
    notices: mpsc::Sender<PartyNotice>,
) {
    let mut dropped_notices: u64 = 0;

    while let Some(frame) = stream.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(err) => {
                debug!(error = %err, "broker socket read failed");
                break;
            }
        };

        let msg = match serde_json::from_str::<ServerMessage>(text.as_str()) {
            Ok(msg) => msg,
            Err(err) => {
                warn!(error = %err, "unparseable broker message");
                continue;
            }
        };

        if let Some(request_id) = msg.request_id() {
            match pending.lock().await.remove(&request_id) {
                Some(reply) => {
                    let _ = reply.send(msg);
                }
                None => debug!(request_id, "late reply dropped"),
            }
            continue;
        }

        let Some(notice) = msg.into_notice() else {
            continue;
        };
        if !notice.is_droppable() {
            // Control pushes wait for the session to catch up.
            if notices.send(notice).await.is_err() {
                debug!("notice receiver gone");
            }
            continue;
        }
        match notices.try_send(notice) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                dropped_notices += 1;
                if dropped_notices == 1 || dropped_notices % 100 == 0 {
                    warn!(dropped_notices, "notice queue full; dropping broker update");
                }
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }

    // Waiting requesters see the dropped senders as `Closed`.
    pending.lock().await.clear();
    let _ = notices.send(PartyNotice::Closed).await;
    info!("broker connection closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broker_urls_are_normalized_to_the_ws_endpoint() {
        assert_eq!(
            normalize_broker_url("127.0.0.1:3000").unwrap(),
            "ws://127.0.0.1:3000/ws"
        );
        assert_eq!(
            normalize_broker_url("http://localhost:3000").unwrap(),
            "ws://localhost:3000/ws"
        );
        assert_eq!(
            normalize_broker_url("https://party.example.com/").unwrap(),
            "wss://party.example.com/ws"
        );
        assert_eq!(
            normalize_broker_url("ws://host:9/custom").unwrap(),
            "ws://host:9/custom"
        );
        assert!(normalize_broker_url("ftp://host").is_err());
    }
}
