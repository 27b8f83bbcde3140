use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use bytes::Bytes;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;

use gridlock_core::player::PlayerId;
use gridlock_core::room::Room;
use gridlock_core::time;

use crate::commands::{Command, handle_command, lobby_update};
use crate::dispatcher::Outbound;
use crate::rate_limit::RateLimiter;
use crate::state::{AppState, ConnectionGuard};

/// Reply to the opening create/join frame.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JoinResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    room: Option<Room>,
    #[serde(skip_serializing_if = "Option::is_none")]
    player_id: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Result<axum::response::Response, StatusCode> {
    let max_ws = state.config.limits.max_ws_connections;
    let current = state.ws_connection_count.load(Ordering::Relaxed);
    if current >= max_ws {
        tracing::warn!(current, max = max_ws, "WS connection limit reached");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok(ws
        .on_upgrade(move |socket| handle_socket(socket, state))
        .into_response())
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let _guard = ConnectionGuard::new(Arc::clone(&state.ws_connection_count));
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // The first frame must create or join a room; anything else ends the
    // connection.
    let first = match ws_receiver.next().await {
        Some(Ok(Message::Text(text))) => text,
        _ => return,
    };
    let Ok(cmd) = serde_json::from_str::<Command>(&first) else {
        send_join_error(&mut ws_sender, "First message must be create-room or join-room").await;
        return;
    };

    let (room_id, player_id) = {
        let mut registry = state.registry.write().await;
        let result = match cmd {
            Command::CreateRoom { user, game_mode } => registry
                .create_room(&user, game_mode)
                .map(|(room_id, player_id)| (room_id, player_id)),
            Command::JoinRoom { room_id, user } => registry
                .join_room(&room_id, &user)
                .map(|(player_id, events)| {
                    for event in events {
                        state.dispatcher.broadcast_room(&room_id, &event);
                    }
                    (room_id, player_id)
                }),
            _ => {
                drop(registry);
                send_join_error(&mut ws_sender, "First message must be create-room or join-room")
                    .await;
                return;
            },
        };
        match result {
            Ok(ok) => ok,
            Err(e) => {
                drop(registry);
                send_join_error(&mut ws_sender, &e.to_string()).await;
                return;
            },
        }
    };

    // Confirm the join with a room snapshot before any broadcasts reach
    // this client.
    {
        let registry = state.registry.read().await;
        let Some(room) = registry.room(&room_id) else {
            return;
        };
        let response = JoinResponse {
            room: Some(room.clone()),
            player_id: Some(player_id),
            error: None,
        };
        if send_json(&mut ws_sender, &response).await.is_err() {
            return;
        }
    }

    // Writer task: everything the dispatcher routes here goes out as one
    // text frame.
    let buffer = state.config.limits.player_message_buffer;
    let (tx, mut rx) = mpsc::channel::<Bytes>(buffer);
    state.dispatcher.register(&room_id, player_id, tx);
    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let Ok(text) = Utf8Bytes::try_from(frame) else {
                continue;
            };
            if ws_sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // The lobby list changed for everyone else.
    {
        let registry = state.registry.read().await;
        if let Outbound::Global(event) = lobby_update(&registry) {
            state.dispatcher.broadcast_all(&event);
        }
    }

    let mut limiter = RateLimiter::new(
        state.config.limits.ws_rate_limit_burst,
        state.config.limits.ws_rate_limit_per_sec,
    );
    while let Some(Ok(msg)) = ws_receiver.next().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        if !limiter.check() {
            tracing::warn!(room = %room_id, player_id, "Rate limit exceeded, closing");
            break;
        }
        let cmd = match serde_json::from_str::<Command>(&text) {
            Ok(cmd) => cmd,
            Err(e) => {
                tracing::debug!(room = %room_id, player_id, error = %e, "Bad frame dropped");
                continue;
            },
        };
        let leaving = matches!(cmd, Command::LeaveRoom);
        let outbounds = handle_command(&state, &room_id, player_id, cmd).await;
        dispatch(&state, &room_id, player_id, outbounds);
        if leaving {
            return cleanup(&state, &room_id, player_id, writer, true).await;
        }
    }

    // Disconnect without an explicit leave still vacates the room.
    cleanup(&state, &room_id, player_id, writer, false).await
}

/// Tear down a connection: unregister, leave the room if the socket died
/// without a leave-room frame, and refresh the lobby list.
async fn cleanup(
    state: &AppState,
    room_id: &str,
    player_id: PlayerId,
    writer: tokio::task::JoinHandle<()>,
    already_left: bool,
) {
    state.dispatcher.unregister(room_id, player_id);
    if !already_left {
        let events = {
            let mut registry = state.registry.write().await;
            registry.leave_room(room_id, player_id, time::now_ms())
        };
        for event in &events {
            state.dispatcher.broadcast_room(room_id, event);
        }
        let registry = state.registry.read().await;
        if let Outbound::Global(event) = lobby_update(&registry) {
            state.dispatcher.broadcast_all(&event);
        }
    }
    writer.abort();
    tracing::debug!(room = %room_id, player_id, "Connection closed");
}

fn dispatch(state: &AppState, room_id: &str, player_id: PlayerId, outbounds: Vec<Outbound>) {
    for outbound in outbounds {
        match outbound {
            Outbound::Caller(event) => state.dispatcher.send_to(room_id, player_id, &event),
            Outbound::Room(target, event) => state.dispatcher.broadcast_room(&target, &event),
            Outbound::Global(event) => state.dispatcher.broadcast_all(&event),
        }
    }
}

async fn send_json<T: Serialize>(
    sender: &mut SplitSink<WebSocket, Message>,
    value: &T,
) -> Result<(), axum::Error> {
    match serde_json::to_string(value) {
        Ok(json) => sender.send(Message::Text(json.into())).await,
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode response");
            Ok(())
        },
    }
}

async fn send_join_error(sender: &mut SplitSink<WebSocket, Message>, error: &str) {
    let response = JoinResponse {
        room: None,
        player_id: None,
        error: Some(error.to_string()),
    };
    let _ = send_json(sender, &response).await;
}
