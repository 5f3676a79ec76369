use crate::interface_adapters::protocol::{ClientMessage, ServerMessage};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::ids::next_conn_id;
use crate::use_cases::{Outbound, Recipients, RoomEvent};

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    InputClosed,
    EventsClosed,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;

/// Serializes each room event once and re-broadcasts the shared bytes
/// together with its routing scope. Every connection loop filters on
/// the scope instead of serializing per client.
pub async fn event_serializer(
    mut events_rx: broadcast::Receiver<Outbound>,
    event_bytes_tx: broadcast::Sender<(Recipients, Utf8Bytes)>,
) {
    loop {
        match events_rx.recv().await {
            Ok(outbound) => {
                let msg = ServerMessage::from(&outbound.event);
                let txt = match serde_json::to_string(&msg) {
                    Ok(txt) => txt,
                    Err(e) => {
                        error!(error = ?e, "failed to serialize room event");
                        continue;
                    }
                };
                let _ = event_bytes_tx.send((outbound.recipients, Utf8Bytes::from(txt)));
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "event serializer lagged; skipping ahead");
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!("room event channel closed; serializer exiting");
                break;
            }
        }
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let player_id = next_conn_id();
    let span = info_span!("conn", player_id);
    let _enter = span.enter();

    let mut ctx = match bootstrap_connection(&mut socket, &state, player_id).await {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(error = ?e, "failed to bootstrap connection");
            let _ = socket.close().await;
            return;
        }
    };

    info!("client connected");

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }
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

struct ConnCtx {
    pub player_id: u64,
    pub input_tx: mpsc::Sender<RoomEvent>,
    pub event_bytes_rx: broadcast::Receiver<(Recipients, Utf8Bytes)>,

    pub msgs_in: u64,
    pub msgs_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,

    pub invalid_json: u32,

    pub last_input_full_log: Instant,
    pub last_events_lag_log: Instant,
    pub last_invalid_input_log: Instant,

    pub close_frame: Option<CloseFrame>,
}

async fn bootstrap_connection(
    socket: &mut WebSocket,
    state: &AppState,
    player_id: u64,
) -> Result<ConnCtx, NetError> {
    // Subscribe *before* joining so the connection cannot miss its own
    // snapshot or any event ordered after it.
    let event_bytes_rx = state.event_bytes_tx.subscribe();

    // Tell the client "this is who you are". A raw WebSocket has no
    // implicit connection id the way socket.io did.
    let identity = ServerMessage::identity(player_id);
    let bytes_out = send_message(socket, &identity).await? as u64;

    // Announce the connection to the room; the room answers with the
    // registry snapshot and fans out the new record to peers.
    state
        .room
        .input_tx
        .send(RoomEvent::Join { player_id })
        .await
        .map_err(|_| NetError::InputClosed)?;

    let now = Instant::now() - LOG_THROTTLE;
    Ok(ConnCtx {
        player_id,
        input_tx: state.room.input_tx.clone(),
        event_bytes_rx,

        msgs_in: 0,
        msgs_out: 1,
        bytes_in: 0,
        bytes_out,

        invalid_json: 0,

        last_input_full_log: now,
        last_events_lag_log: now,
        last_invalid_input_log: now,

        close_frame: None,
    })
}

enum LoopControl {
    Continue,
    Disconnect,
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
    let player_id = ctx.player_id;

    // Split borrows so `tokio::select!` can hold them concurrently.
    let ConnCtx {
        input_tx,
        event_bytes_rx,
        msgs_in,
        msgs_out,
        bytes_in,
        bytes_out,
        invalid_json,
        last_input_full_log,
        last_events_lag_log,
        last_invalid_input_log,
        close_frame,
        ..
    } = ctx;

    let mut fatal: Option<NetError> = None;

    loop {
        // disconnect becomes true on error
        let disconnect: bool = tokio::select! {
            // Incoming message from the client.
            incoming = socket.recv() => {
                match handle_incoming_ws(
                    incoming,
                    player_id,
                    input_tx,
                    msgs_in,
                    bytes_in,
                    invalid_json,
                    last_input_full_log,
                    last_invalid_input_log,
                    close_frame,
                ) {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            // Outbound room event, pre-serialized and scoped.
            event = event_bytes_rx.recv() => {
                match event {
                    Ok((recipients, bytes)) => {
                        if recipients.includes(player_id) {
                            match forward_event_bytes(bytes, socket, msgs_out, bytes_out).await {
                                LoopControl::Continue => false,
                                LoopControl::Disconnect => true,
                            }
                        } else {
                            false
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Missed events are gone; the client converges
                        // through whatever it receives next.
                        if should_log(last_events_lag_log) {
                            warn!(player_id, missed = n, "event stream lagged");
                        }
                        false
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::EventsClosed);
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    if let Err(e) = disconnect_cleanup(
        player_id,
        input_tx,
        *msgs_in,
        *msgs_out,
        *bytes_in,
        *bytes_out,
        *invalid_json,
    )
    .await
    {
        warn!(error = ?e, "error during disconnect cleanup");
        if fatal.is_none() {
            fatal = Some(e);
        }
    }

    if let Some(err) = fatal {
        Err(err)
    } else {
        Ok(())
    }
}

/// Maps a parsed client message onto the room event it requests.
///
/// Returns `None` for messages that cannot reference anything live
/// (an unparseable target id); the protocol has no error channel, so
/// those are dropped in silence just like stale references.
fn room_event_for(player_id: u64, msg: ClientMessage) -> Option<RoomEvent> {
    match msg {
        ClientMessage::PlayerMovement(dto) => Some(RoomEvent::Movement {
            player_id,
            report: dto.into(),
        }),
        ClientMessage::PlayerAttack => Some(RoomEvent::Attack { player_id }),
        ClientMessage::PlayerHit(dto) => dto.parse_target_id().map(|target_id| RoomEvent::Hit {
            player_id,
            target_id,
        }),
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    player_id: u64,
    input_tx: &mpsc::Sender<RoomEvent>,
    msgs_in: &mut u64,
    bytes_in: &mut u64,
    invalid_json: &mut u32,
    last_input_full_log: &mut Instant,
    last_invalid_input_log: &mut Instant,
    close_frame: &mut Option<CloseFrame>,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                *msgs_in += 1;
                *bytes_in += text.len() as u64;

                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(parsed) => {
                        let Some(event) = room_event_for(player_id, parsed) else {
                            if should_log(last_invalid_input_log) {
                                warn!(player_id, "hit report with malformed target id dropped");
                            }
                            return Ok(LoopControl::Continue);
                        };

                        match input_tx.try_send(event) {
                            Ok(()) => Ok(LoopControl::Continue),
                            Err(mpsc::error::TrySendError::Full(_evt)) => {
                                if should_log(last_input_full_log) {
                                    warn!(player_id, "room channel full; dropping message");
                                }
                                Ok(LoopControl::Continue)
                            }
                            Err(mpsc::error::TrySendError::Closed(_evt)) => {
                                Err(NetError::InputClosed)
                            }
                        }
                    }
                    Err(parse_err) => {
                        *invalid_json += 1;
                        if should_log(last_invalid_input_log) {
                            warn!(
                                player_id,
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }

                        if *invalid_json > MAX_INVALID_JSON {
                            *close_frame = Some(CloseFrame {
                                code: close_code::POLICY,
                                reason: "too many invalid messages".into(),
                            });
                            return Ok(LoopControl::Disconnect);
                        }

                        Ok(LoopControl::Continue)
                    }
                }
            }
            Message::Binary(_) => {
                *close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                Ok(LoopControl::Disconnect)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(player_id, error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!(player_id, "websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn forward_event_bytes(
    bytes: Utf8Bytes,
    socket: &mut WebSocket,
    msgs_out: &mut u64,
    bytes_out: &mut u64,
) -> LoopControl {
    let bytes_len = bytes.len();
    match socket.send(Message::Text(bytes)).await.map_err(NetError::Ws) {
        Ok(()) => {
            *msgs_out += 1;
            *bytes_out += bytes_len as u64;
            LoopControl::Continue
        }
        Err(err) => {
            // Log unexpected send failures; disconnect will follow immediately.
            warn!(error = ?err, "failed to send room event");
            LoopControl::Disconnect
        }
    }
}

async fn disconnect_cleanup(
    player_id: u64,
    input_tx: &mpsc::Sender<RoomEvent>,
    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,
    invalid_json: u32,
) -> Result<(), NetError> {
    // Teardown is unconditional: anything still in flight for this
    // connection is ignored once the id leaves the registry.
    input_tx
        .send(RoomEvent::Leave { player_id })
        .await
        .map_err(|_| NetError::InputClosed)?;

    debug!(
        player_id,
        msgs_in, msgs_out, bytes_in, bytes_out, invalid_json, "connection stats"
    );
    info!(player_id, "client disconnected");
    Ok(())
}
