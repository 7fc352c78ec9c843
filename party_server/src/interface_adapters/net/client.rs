use crate::domain::{ConnId, PartyError};
use crate::interface_adapters::protocol::{ClientMessage, PartyDto, RemotePlayerDto, ServerMessage};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::ids::next_conn_id;
use crate::use_cases::{Outbox, OutboxReceiver, PartyBroker, PartyEvent};

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;
use tracing::{Instrument, debug, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    OutboxClosed,
}

enum LoopControl {
    Continue,
    Disconnect,
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let broker = state.broker.clone();
    let outbox_capacity = state.outbox_capacity;
    ws.on_upgrade(move |socket| {
        let conn_id = next_conn_id();
        handle_socket(socket, conn_id, broker, outbox_capacity)
            .instrument(info_span!("conn", conn_id))
    })
}

struct ConnCtx {
    conn_id: ConnId,
    broker: Arc<Mutex<PartyBroker>>,
    outbox: OutboxReceiver,

    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,

    invalid_json: u32,
    last_invalid_log: Instant,
    last_send_error_log: Instant,

    close_frame: Option<CloseFrame>,
}

async fn handle_socket(
    mut socket: WebSocket,
    conn_id: ConnId,
    broker: Arc<Mutex<PartyBroker>>,
    outbox_capacity: usize,
) {
    // Register the outbox before telling the client who it is so no party
    // event can race ahead of the registration.
    let (outbox_tx, outbox) = Outbox::channel(outbox_capacity);
    broker.lock().await.connect(conn_id, outbox_tx);

    let identity = ServerMessage::Identity {
        player_id: conn_id.to_string(),
    };
    if let Err(e) = send_message(&mut socket, &identity).await {
        warn!(error = ?e, "failed to send identity");
        broker.lock().await.disconnect(conn_id);
        return;
    }
    info!("client connected");

    let now = Instant::now() - LOG_THROTTLE;
    let mut ctx = ConnCtx {
        conn_id,
        broker,
        outbox,
        msgs_in: 0,
        msgs_out: 1,
        bytes_in: 0,
        bytes_out: 0,
        invalid_json: 0,
        last_invalid_log: now,
        last_send_error_log: now,
        close_frame: None,
    };

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }

    disconnect_cleanup(&ctx).await;
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let mut fatal: Option<NetError> = None;

    loop {
        let disconnect: bool = tokio::select! {
            // Incoming request or publish from the client
            incoming = socket.recv() => {
                match handle_incoming_ws(socket, incoming, ctx).await {
                    LoopControl::Continue => false,
                    LoopControl::Disconnect => true,
                }
            }

            // Party control events
            event = ctx.outbox.control.recv() => {
                handle_outgoing(socket, event, ctx, &mut fatal).await
            }

            // Streamed avatar and game-state updates
            event = ctx.outbox.stream.recv() => {
                handle_outgoing(socket, event, ctx, &mut fatal).await
            }
        };

        if disconnect {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

async fn handle_outgoing(
    socket: &mut WebSocket,
    event: Option<PartyEvent>,
    ctx: &mut ConnCtx,
    fatal: &mut Option<NetError>,
) -> bool {
    let Some(event) = event else {
        *fatal = Some(NetError::OutboxClosed);
        return true;
    };
    let msg = ServerMessage::from(event);
    match forward_message(socket, &msg, ctx).await {
        LoopControl::Continue => false,
        LoopControl::Disconnect => true,
    }
}

async fn handle_incoming_ws(
    socket: &mut WebSocket,
    incoming: Option<Result<Message, Error>>,
    ctx: &mut ConnCtx,
) -> LoopControl {
    let conn_id = ctx.conn_id;
    match incoming {
        Some(Ok(Message::Text(text))) => {
            ctx.msgs_in += 1;
            ctx.bytes_in += text.len() as u64;

            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => {
                    let reply = dispatch(ctx, msg).await;
                    match reply {
                        Some(reply) => forward_message(socket, &reply, ctx).await,
                        None => LoopControl::Continue,
                    }
                }
                Err(parse_err) => {
                    ctx.invalid_json += 1;
                    if should_log(&mut ctx.last_invalid_log) {
                        warn!(
                            conn_id,
                            bytes = text.len(),
                            error = %parse_err,
                            "failed to parse client message"
                        );
                    }
                    if ctx.invalid_json > MAX_INVALID_JSON {
                        ctx.close_frame = Some(CloseFrame {
                            code: close_code::POLICY,
                            reason: "too many invalid messages".into(),
                        });
                        return LoopControl::Disconnect;
                    }
                    LoopControl::Continue
                }
            }
        }
        Some(Ok(Message::Binary(_))) => {
            ctx.close_frame = Some(CloseFrame {
                code: close_code::UNSUPPORTED,
                reason: "binary messages not supported".into(),
            });
            LoopControl::Disconnect
        }
        Some(Ok(Message::Ping(_) | Message::Pong(_))) => LoopControl::Continue,
        Some(Ok(Message::Close(_))) => LoopControl::Disconnect,
        Some(Err(e)) => {
            warn!(conn_id, error = %e, "websocket recv error");
            LoopControl::Disconnect
        }
        None => {
            info!(conn_id, "websocket closed");
            LoopControl::Disconnect
        }
    }
}

fn failed(request_id: u64, error: PartyError) -> ServerMessage {
    ServerMessage::RequestFailed {
        request_id,
        error: error.to_string(),
    }
}

/// Applies one client message to the broker and returns the direct reply, if
/// the message expects one.
async fn dispatch(ctx: &ConnCtx, msg: ClientMessage) -> Option<ServerMessage> {
    let conn_id = ctx.conn_id;
    let mut broker = ctx.broker.lock().await;

    match msg {
        ClientMessage::CreateParty {
            request_id,
            player_name,
        } => Some(match broker.create_party(conn_id, &player_name) {
            Ok(created) => ServerMessage::PartyCreated {
                request_id,
                party_code: created.code,
                party: PartyDto::from(&created.party),
            },
            Err(e) => failed(request_id, e),
        }),
        ClientMessage::JoinParty {
            request_id,
            party_code,
            player_name,
        } => Some(
            match broker.join_party(conn_id, &party_code, &player_name) {
                Ok(party) => ServerMessage::PartyJoined {
                    request_id,
                    party: PartyDto::from(&party),
                },
                Err(e) => {
                    debug!(conn_id, error = %e, "join rejected");
                    failed(request_id, e)
                }
            },
        ),
        ClientMessage::LeaveParty => {
            broker.leave_party(conn_id);
            None
        }
        ClientMessage::StartGame { request_id } => Some(match broker.start_game(conn_id) {
            Ok(()) => ServerMessage::GameStartAccepted { request_id },
            Err(e) => failed(request_id, e),
        }),
        ClientMessage::PlayerUpdate(state) => {
            broker.player_update(conn_id, state.into());
            None
        }
        ClientMessage::RequestPlayerStates { request_id } => {
            Some(match broker.request_player_states(conn_id) {
                Ok(players) => ServerMessage::PlayerStates {
                    request_id,
                    players: players.into_iter().map(RemotePlayerDto::from).collect(),
                },
                Err(e) => failed(request_id, e),
            })
        }
        ClientMessage::HostGameState(state) => {
            broker.host_game_state(conn_id, state.into());
            None
        }
        ClientMessage::ShareXp { amount } => {
            broker.share_xp(conn_id, amount);
            None
        }
    }
}

async fn forward_message(
    socket: &mut WebSocket,
    msg: &ServerMessage,
    ctx: &mut ConnCtx,
) -> LoopControl {
    match send_message(socket, msg).await {
        Ok(bytes) => {
            ctx.msgs_out += 1;
            ctx.bytes_out += bytes as u64;
            LoopControl::Continue
        }
        Err(err) => {
            // Disconnect follows immediately.
            if should_log(&mut ctx.last_send_error_log) {
                warn!(error = ?err, "failed to send message");
            }
            LoopControl::Disconnect
        }
    }
}

async fn disconnect_cleanup(ctx: &ConnCtx) {
    ctx.broker.lock().await.disconnect(ctx.conn_id);

    debug!(
        conn_id = ctx.conn_id,
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        bytes_in = ctx.bytes_in,
        bytes_out = ctx.bytes_out,
        invalid_json = ctx.invalid_json,
        "connection stats"
    );
    info!(conn_id = ctx.conn_id, "client disconnected");
}
